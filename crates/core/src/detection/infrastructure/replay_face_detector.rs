use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::detection::domain::face_detector::{DetectorError, FaceDetector};
use crate::detection::domain::face_observation::FaceObservation;
use crate::shared::frame::Frame;

/// Replays recorded observations by frame index.
///
/// Used to drive the pipeline from a recorded session: detection and
/// track-forward both return what was recorded for the frame, so the
/// tracking core behaves exactly as it did live. Frames listed as failing
/// return a request error instead.
pub struct ReplayFaceDetector {
    script: Arc<HashMap<usize, Vec<FaceObservation>>>,
    failing_frames: HashSet<usize>,
    detect_calls: usize,
    track_calls: usize,
}

impl ReplayFaceDetector {
    pub fn new(script: Arc<HashMap<usize, Vec<FaceObservation>>>) -> Self {
        Self {
            script,
            failing_frames: HashSet::new(),
            detect_calls: 0,
            track_calls: 0,
        }
    }

    pub fn with_failing_frames(mut self, frames: impl IntoIterator<Item = usize>) -> Self {
        self.failing_frames.extend(frames);
        self
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls
    }

    pub fn track_calls(&self) -> usize {
        self.track_calls
    }

    fn replay(&self, frame: &Frame) -> Option<Vec<FaceObservation>> {
        if self.failing_frames.contains(&frame.index()) {
            return None;
        }
        Some(self.script.get(&frame.index()).cloned().unwrap_or_default())
    }
}

impl FaceDetector for ReplayFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceObservation>, DetectorError> {
        self.detect_calls += 1;
        self.replay(frame).ok_or_else(|| {
            DetectorError::Detection(format!("recorded failure on frame {}", frame.index()))
        })
    }

    fn track(
        &mut self,
        frame: &Frame,
        _prior: &[FaceObservation],
    ) -> Result<Vec<FaceObservation>, DetectorError> {
        self.track_calls += 1;
        self.replay(frame).ok_or_else(|| {
            DetectorError::Tracking(format!("recorded failure on frame {}", frame.index()))
        })
    }
}
