use thiserror::Error;

/// Failures reported to the event consumer.
///
/// None of these stop the pipeline: `RequestFailure` affects one frame only,
/// the other two leave the pipeline idle until it is opened again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("capture configuration failed: {0}")]
    ConfigurationFailure(String),
    #[error("face request failed on frame {frame_index}: {message}")]
    RequestFailure { frame_index: usize, message: String },
}

impl TrackingError {
    /// Whether the pipeline must be reopened after this error.
    pub fn requires_reopen(&self) -> bool {
        !matches!(self, TrackingError::RequestFailure { .. })
    }
}
