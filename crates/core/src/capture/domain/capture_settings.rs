use std::time::Duration;

use crate::shared::constants::{CONSTRAINED_FRAME_RATE, DEFAULT_FRAME_RATE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameRatePreference {
    /// 30 fps, or 15 fps on single-processor hosts.
    #[default]
    Auto,
    Fixed(u32),
}

/// What the pipeline asks of the capture device.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    pub frame_rate: FrameRatePreference,
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_rate: FrameRatePreference::Auto,
            width: 1280,
            height: 720,
        }
    }
}

impl CaptureConfig {
    /// Frame rate to request from the device on this host.
    pub fn resolved_frame_rate(&self) -> u32 {
        let processors = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        negotiate_frame_rate(self.frame_rate, processors)
    }
}

pub fn negotiate_frame_rate(preference: FrameRatePreference, processor_count: usize) -> u32 {
    match preference {
        FrameRatePreference::Fixed(fps) => fps,
        FrameRatePreference::Auto if processor_count <= 1 => CONSTRAINED_FRAME_RATE,
        FrameRatePreference::Auto => DEFAULT_FRAME_RATE,
    }
}

/// What the capture device actually applied.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    pub device_name: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl CaptureSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.frame_rate.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::single_core(FrameRatePreference::Auto, 1, 15)]
    #[case::no_cores_reported(FrameRatePreference::Auto, 0, 15)]
    #[case::multi_core(FrameRatePreference::Auto, 8, 30)]
    #[case::fixed_ignores_host(FrameRatePreference::Fixed(60), 1, 60)]
    fn test_negotiate_frame_rate(
        #[case] preference: FrameRatePreference,
        #[case] processors: usize,
        #[case] expected: u32,
    ) {
        assert_eq!(negotiate_frame_rate(preference, processors), expected);
    }

    #[test]
    fn test_resolved_frame_rate_is_a_supported_auto_rate() {
        let rate = CaptureConfig::default().resolved_frame_rate();
        assert!(rate == DEFAULT_FRAME_RATE || rate == CONSTRAINED_FRAME_RATE);
    }

    #[test]
    fn test_frame_interval() {
        let settings = CaptureSettings {
            device_name: "front".into(),
            width: 640,
            height: 480,
            frame_rate: 25,
        };
        assert_eq!(settings.frame_interval(), Duration::from_millis(40));
    }
}
