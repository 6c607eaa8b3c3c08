mod report;
mod settings;
mod trace;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use face_overlay_core::capture::infrastructure::synthetic_capture_device::{
    SyntheticCaptureDevice, MAX_SYNTHETIC_FRAME_RATE,
};
use face_overlay_core::overlay::infrastructure::logging_overlay_renderer::LoggingOverlayRenderer;
use face_overlay_core::overlay::overlay_driver::OverlayDriver;
use face_overlay_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use face_overlay_core::pipeline::tracking_pipeline::TrackingPipeline;

use crate::report::{EventCounts, ReportingConsumer};
use crate::settings::Settings;
use crate::trace::Trace;

/// Replays a recorded face observation trace through the tracking pipeline.
#[derive(Parser)]
#[command(name = "face-overlay")]
struct Cli {
    /// Recorded trace (JSON).
    trace: PathBuf,

    /// Matching tolerance around tracked faces, in view points.
    #[arg(long)]
    margin: Option<f64>,

    /// Width of the view detections are scaled into.
    #[arg(long)]
    view_width: Option<f64>,

    /// Height of the view detections are scaled into.
    #[arg(long)]
    view_height: Option<f64>,

    /// Capture frame rate (default: 30, or 15 on single-core hosts).
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Empty frames tolerated before tracking is lost.
    #[arg(long)]
    grace_frames: Option<usize>,

    /// Frames buffered between capture and tracking.
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Deliver frames as fast as possible instead of at the frame rate.
    #[arg(long)]
    fast: bool,

    /// Settings file (default: the user config directory).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Store the effective settings for later runs.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if !cli.trace.exists() {
        return Err(format!("Trace file not found: {}", cli.trace.display()).into());
    }

    let stored = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = effective_settings(&cli, stored);
    validate(&settings)?;

    if cli.save_settings {
        match &cli.settings {
            Some(path) => settings.save_to(path)?,
            None => settings.save()?,
        }
    }

    let trace = Trace::load(&cli.trace)?;
    let frames = trace.frame_count();
    log::info!("Replaying {frames} frame(s) from {}", cli.trace.display());

    let mut device = SyntheticCaptureDevice::new(Some(frames));
    if cli.fast {
        device = device.unpaced();
    }
    let renderer = LoggingOverlayRenderer::new();
    let overlay_stats = renderer.stats();
    let counts = Arc::new(EventCounts::default());
    let consumer = ReportingConsumer::new(OverlayDriver::new(renderer), counts.clone());

    let mut pipeline = TrackingPipeline::new(
        Box::new(device),
        Box::new(trace.into_detector()),
        Box::new(consumer),
        settings.pipeline_config(),
    )
    .with_logger(Box::new(StdoutPipelineLogger::default()));

    pipeline.open()?;
    pipeline.wait()?;
    pipeline.finish();

    log::info!("Events: {}", counts.summary());
    log::info!(
        "Overlays: {} shown, {} moved, {} cleared",
        overlay_stats.shown(),
        overlay_stats.animated(),
        overlay_stats.cleared()
    );
    Ok(())
}

/// Stored settings with any explicit flags applied on top.
fn effective_settings(cli: &Cli, stored: Settings) -> Settings {
    Settings {
        margin: cli.margin.unwrap_or(stored.margin),
        view_width: cli.view_width.unwrap_or(stored.view_width),
        view_height: cli.view_height.unwrap_or(stored.view_height),
        frame_rate: cli.frame_rate.or(stored.frame_rate),
        grace_frames: cli.grace_frames.unwrap_or(stored.grace_frames),
        queue_capacity: cli.queue_capacity.unwrap_or(stored.queue_capacity),
    }
}

fn validate(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    settings.validate()?;
    if let Some(rate) = settings.frame_rate {
        if rate > MAX_SYNTHETIC_FRAME_RATE {
            return Err(format!(
                "Frame rate must be between 1 and {MAX_SYNTHETIC_FRAME_RATE}, got {rate}"
            )
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_stored_settings() {
        let cli = Cli::try_parse_from([
            "face-overlay",
            "trace.json",
            "--margin",
            "5",
            "--grace-frames",
            "2",
        ])
        .unwrap();
        let stored = Settings {
            margin: 30.0,
            frame_rate: Some(15),
            ..Settings::default()
        };

        let settings = effective_settings(&cli, stored);

        assert_eq!(settings.margin, 5.0);
        assert_eq!(settings.grace_frames, 2);
        assert_eq!(settings.frame_rate, Some(15));
    }

    #[test]
    fn test_validate_rejects_rates_the_device_cannot_run() {
        let settings = Settings {
            frame_rate: Some(MAX_SYNTHETIC_FRAME_RATE + 1),
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());
    }
}
