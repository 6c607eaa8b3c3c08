pub mod logging_overlay_renderer;
