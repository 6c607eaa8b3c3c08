use crate::capture::domain::capture_settings::{CaptureConfig, CaptureSettings};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;

/// A live frame source.
///
/// Implementations own device discovery and configuration; the pipeline
/// only sees `Frame`s and the negotiated `CaptureSettings`.
pub trait CaptureDevice: Send {
    /// Acquires and configures the device.
    ///
    /// Fails with `DeviceUnavailable` when no usable device exists and
    /// `ConfigurationFailure` when `config` cannot be applied.
    fn open(&mut self, config: &CaptureConfig) -> Result<CaptureSettings, TrackingError>;

    /// Blocks until the next frame at the device cadence. `None` once the
    /// device has stopped delivering.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Releases the device. Safe to call when not open.
    fn close(&mut self);
}
