use std::collections::HashMap;
use std::time::Instant;

use crate::pipeline::mode_selector::TrackingMode;

/// Cross-cutting logger for tracking pipeline events.
///
/// Lets hosts observe per-frame behavior (mode, stage timings, face
/// counts) without the pipeline knowing where the output goes.
pub trait PipelineLogger: Send {
    /// A frame finished processing; `mode` is the mode it ran in.
    fn frame_processed(&mut self, frame_index: usize, mode: TrackingMode);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time metric (e.g. tracked faces, dropped frames).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used by tests and hosts with their own reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame_processed(&mut self, _frame_index: usize, _mode: TrackingMode) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs through the `log` facade and keeps per-stage timings, metrics and
/// per-mode frame counts for a summary at shutdown.
///
/// Frame lines are throttled to one every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    mode_frames: HashMap<TrackingMode, usize>,
    start_time: Instant,
    frames: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            mode_frames: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
            messages: Vec::new(),
        }
    }

    /// Formatted summary, or `None` if no frame was processed.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mode_count = |mode| self.mode_frames.get(&mode).copied().unwrap_or(0);
        let mut lines = vec![format!(
            "Tracking summary ({} frames, {:.1}s): detecting {}, tracking {}, idle {}",
            self.frames,
            elapsed_ms / 1000.0,
            mode_count(TrackingMode::Detecting),
            mode_count(TrackingMode::Tracking),
            mode_count(TrackingMode::Idle),
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.2}ms  max {max_ms:6.2}ms"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let avg = values.iter().sum::<f64>() / values.len().max(1) as f64;
            let last = values.last().copied().unwrap_or(0.0);
            lines.push(format!("  {name}: avg {avg:.1}  last {last:.0}"));
        }

        if elapsed_ms > 0.0 {
            let fps = self.frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn frames_in(&self, mode: TrackingMode) -> usize {
        self.mode_frames.get(&mode).copied().unwrap_or(0)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn frame_processed(&mut self, frame_index: usize, mode: TrackingMode) {
        self.frames += 1;
        *self.mode_frames.entry(mode).or_default() += 1;
        if self.frames % self.throttle_frames == 0 {
            log::info!("Frame {frame_index}: {mode:?} ({} processed)", self.frames);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.frame_processed(0, TrackingMode::Detecting);
        logger.timing("detect", 5.0);
        logger.metric("faces", 1.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 2.0);
        logger.timing("detect", 3.0);
        logger.timing("match", 0.1);

        assert_eq!(logger.timings_for("detect").unwrap(), &[2.0, 3.0]);
        assert_eq!(logger.timings_for("match").unwrap().len(), 1);
        assert!(logger.timings_for("render").is_none());
    }

    #[test]
    fn test_frames_counted_per_mode() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frame_processed(0, TrackingMode::Detecting);
        logger.frame_processed(1, TrackingMode::Tracking);
        logger.frame_processed(2, TrackingMode::Tracking);

        assert_eq!(logger.frames_in(TrackingMode::Detecting), 1);
        assert_eq!(logger.frames_in(TrackingMode::Tracking), 2);
        assert_eq!(logger.frames_in(TrackingMode::Idle), 0);
    }

    #[test]
    fn test_summary_includes_modes_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frame_processed(0, TrackingMode::Detecting);
        logger.frame_processed(1, TrackingMode::Tracking);
        logger.timing("detect", 4.0);
        logger.metric("faces", 1.0);
        logger.metric("faces", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Tracking summary (2 frames"));
        assert!(summary.contains("detecting 1, tracking 1, idle 0"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("faces: avg 1.5  last 2"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 1.0);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.info("capture opened");
        assert_eq!(logger.messages, vec!["capture opened".to_string()]);
    }

    #[test]
    fn test_throttle_is_at_least_one() {
        assert_eq!(StdoutPipelineLogger::new(0).throttle_frames, 1);
        assert_eq!(StdoutPipelineLogger::default().throttle_frames, 30);
    }
}
