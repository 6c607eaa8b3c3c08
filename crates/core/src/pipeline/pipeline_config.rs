use crate::capture::domain::capture_settings::CaptureConfig;
use crate::shared::constants::{
    DEFAULT_FRAME_QUEUE_CAPACITY, DEFAULT_GRACE_FRAMES, DEFAULT_MATCH_MARGIN, DEFAULT_VIEW_HEIGHT,
    DEFAULT_VIEW_WIDTH,
};
use crate::shared::geometry::Size;

/// Configuration for a tracking pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Symmetric tolerance around tracked boxes, in view points.
    pub margin: f64,
    /// Space the normalized detector output is scaled into.
    pub view_size: Size,
    pub frame_queue_capacity: usize,
    pub grace_frames: usize,
    pub capture: CaptureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MATCH_MARGIN,
            view_size: Size::new(DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT),
            frame_queue_capacity: DEFAULT_FRAME_QUEUE_CAPACITY,
            grace_frames: DEFAULT_GRACE_FRAMES,
            capture: CaptureConfig::default(),
        }
    }
}
