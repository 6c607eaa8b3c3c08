pub mod event_dispatcher;
pub mod frame_intake;
pub mod mode_selector;
pub mod pipeline_config;
pub mod pipeline_logger;
pub mod tracking_pipeline;
