use std::time::{Duration, Instant};

use crate::capture::domain::capture_device::CaptureDevice;
use crate::capture::domain::capture_settings::{CaptureConfig, CaptureSettings};
use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;

const DEVICE_NAME: &str = "synthetic";

/// Highest frame rate the synthetic device accepts.
pub const MAX_SYNTHETIC_FRAME_RATE: u32 = 240;

/// Emits blank BGRA frames at the negotiated cadence.
///
/// Pairs with a replaying detector: pixels are irrelevant, only frame
/// indices and timing matter.
pub struct SyntheticCaptureDevice {
    frame_limit: Option<usize>,
    paced: bool,
    available: bool,
    settings: Option<CaptureSettings>,
    next_index: usize,
    started: Option<Instant>,
}

impl SyntheticCaptureDevice {
    /// `frame_limit` of `None` delivers frames until closed.
    pub fn new(frame_limit: Option<usize>) -> Self {
        Self {
            frame_limit,
            paced: true,
            available: true,
            settings: None,
            next_index: 0,
            started: None,
        }
    }

    /// A device that fails to open, as when no camera is attached.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Some(0))
        }
    }

    /// Deliver frames as fast as they are requested instead of at the
    /// frame-rate cadence.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    pub fn frames_delivered(&self) -> usize {
        self.next_index
    }

    fn wait_for_slot(&self, settings: &CaptureSettings, started: Instant) -> Duration {
        let timestamp = frame_timestamp(settings.frame_interval(), self.next_index);
        if self.paced {
            let elapsed = started.elapsed();
            if timestamp > elapsed {
                std::thread::sleep(timestamp - elapsed);
            }
        }
        timestamp
    }
}

/// Offset of frame `index` from the start of capture, saturating rather
/// than wrapping for very long sessions.
fn frame_timestamp(interval: Duration, index: usize) -> Duration {
    let nanos = interval.as_nanos().saturating_mul(index as u128);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

impl CaptureDevice for SyntheticCaptureDevice {
    fn open(&mut self, config: &CaptureConfig) -> Result<CaptureSettings, TrackingError> {
        if !self.available {
            return Err(TrackingError::DeviceUnavailable(
                "no synthetic device attached".into(),
            ));
        }
        let frame_rate = config.resolved_frame_rate();
        if frame_rate == 0 || frame_rate > MAX_SYNTHETIC_FRAME_RATE {
            return Err(TrackingError::ConfigurationFailure(format!(
                "unsupported frame rate {frame_rate} (1-{MAX_SYNTHETIC_FRAME_RATE})"
            )));
        }
        if config.width == 0 || config.height == 0 {
            return Err(TrackingError::ConfigurationFailure(format!(
                "invalid resolution {}x{}",
                config.width, config.height
            )));
        }

        let settings = CaptureSettings {
            device_name: DEVICE_NAME.to_string(),
            width: config.width,
            height: config.height,
            frame_rate,
        };
        self.settings = Some(settings.clone());
        self.next_index = 0;
        self.started = Some(Instant::now());
        Ok(settings)
    }

    fn next_frame(&mut self) -> Option<Frame> {
        let settings = self.settings.clone()?;
        let started = self.started?;
        if self.frame_limit.is_some_and(|limit| self.next_index >= limit) {
            return None;
        }

        let timestamp = self.wait_for_slot(&settings, started);
        let frame = Frame::blank(settings.width, settings.height, self.next_index, timestamp);
        self.next_index += 1;
        Some(frame)
    }

    fn close(&mut self) {
        self.settings = None;
        self.started = None;
    }
}
