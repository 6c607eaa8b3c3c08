use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use face_overlay_core::capture::domain::capture_settings::{CaptureConfig, FrameRatePreference};
use face_overlay_core::pipeline::pipeline_config::PipelineConfig;
use face_overlay_core::shared::geometry::Size;

/// Persistent defaults for replay runs. Command-line flags override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub margin: f64,
    pub view_width: f64,
    pub view_height: f64,
    /// `None` negotiates automatically.
    pub frame_rate: Option<u32>,
    pub grace_frames: usize,
    pub queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            margin: config.margin,
            view_width: config.view_size.width,
            view_height: config.view_size.height,
            frame_rate: None,
            grace_frames: config.grace_frames,
            queue_capacity: config.frame_queue_capacity,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceOverlay").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or unreadable files yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid settings in {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save(&self) -> std::io::Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(format!("Margin must be a non-negative number, got {}", self.margin));
        }
        if !(self.view_width > 0.0 && self.view_height > 0.0) {
            return Err(format!(
                "View size must be positive, got {}x{}",
                self.view_width, self.view_height
            ));
        }
        if self.frame_rate == Some(0) {
            return Err("Frame rate must be at least 1".into());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be at least 1".into());
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            margin: self.margin,
            view_size: Size::new(self.view_width, self.view_height),
            frame_queue_capacity: self.queue_capacity,
            grace_frames: self.grace_frames,
            capture: CaptureConfig {
                frame_rate: self
                    .frame_rate
                    .map_or(FrameRatePreference::Auto, FrameRatePreference::Fixed),
                ..CaptureConfig::default()
            },
        }
    }
}
