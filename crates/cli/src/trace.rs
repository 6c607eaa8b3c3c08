use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use face_overlay_core::detection::domain::face_observation::{
    FaceLandmarks, FaceObservation, ObservationToken,
};
use face_overlay_core::detection::infrastructure::replay_face_detector::ReplayFaceDetector;
use face_overlay_core::shared::geometry::{Point, Rect};

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trace JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid trace: {0}")]
    Invalid(String),
}

/// A recorded detector session.
///
/// Boxes are normalized to the frame (`[x, y, width, height]`), landmark
/// points to their box (`[x, y]`), as the detector reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    /// Frames to replay. Defaults to one past the last recorded frame.
    #[serde(default)]
    pub frames: Option<usize>,
    /// Frames whose detector request failed.
    #[serde(default)]
    pub failing_frames: Vec<usize>,
    #[serde(default)]
    pub observations: Vec<FrameRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: usize,
    #[serde(default)]
    pub faces: Vec<FaceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRecord {
    pub token: u64,
    #[serde(rename = "box")]
    pub bounding_box: [f64; 4],
    #[serde(default)]
    pub landmarks: Option<LandmarkRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkRecord {
    #[serde(default)]
    pub outer_lips: Vec<[f64; 2]>,
    #[serde(default)]
    pub nose: Vec<[f64; 2]>,
    #[serde(default)]
    pub nose_crest: Vec<[f64; 2]>,
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let json = fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    pub fn parse(json: &str) -> Result<Self, TraceError> {
        let trace: Trace = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.unwrap_or_else(|| {
            self.observations
                .iter()
                .map(|r| r.frame + 1)
                .max()
                .unwrap_or(0)
        })
    }

    pub fn into_detector(self) -> ReplayFaceDetector {
        let script: HashMap<usize, Vec<FaceObservation>> = self
            .observations
            .into_iter()
            .map(|record| {
                let faces = record.faces.iter().map(FaceRecord::to_observation).collect();
                (record.frame, faces)
            })
            .collect();
        ReplayFaceDetector::new(Arc::new(script)).with_failing_frames(self.failing_frames)
    }

    fn validate(&self) -> Result<(), TraceError> {
        let mut seen = HashSet::new();
        for record in &self.observations {
            if !seen.insert(record.frame) {
                return Err(TraceError::Invalid(format!(
                    "frame {} recorded more than once",
                    record.frame
                )));
            }
            for face in &record.faces {
                let [_, _, w, h] = face.bounding_box;
                if face.bounding_box.iter().any(|v| !v.is_finite()) || w < 0.0 || h < 0.0 {
                    return Err(TraceError::Invalid(format!(
                        "face {} on frame {} has an invalid box {:?}",
                        face.token, record.frame, face.bounding_box
                    )));
                }
            }
        }
        if let Some(frames) = self.frames {
            if let Some(first_beyond) = seen.iter().copied().filter(|&f| f >= frames).min() {
                return Err(TraceError::Invalid(format!(
                    "frame {first_beyond} is beyond the {frames} frames to replay"
                )));
            }
        }
        Ok(())
    }
}

impl FaceRecord {
    fn to_observation(&self) -> FaceObservation {
        let [x, y, w, h] = self.bounding_box;
        FaceObservation::new(
            ObservationToken(self.token),
            Rect::new(x, y, w, h),
            self.landmarks.as_ref().map(LandmarkRecord::to_landmarks),
        )
    }
}

impl LandmarkRecord {
    fn to_landmarks(&self) -> FaceLandmarks {
        let points = |raw: &[[f64; 2]]| -> Vec<Point> {
            raw.iter().map(|&[x, y]| Point::new(x, y)).collect()
        };
        FaceLandmarks::new(
            points(&self.outer_lips),
            points(&self.nose),
            points(&self.nose_crest),
        )
    }
}
