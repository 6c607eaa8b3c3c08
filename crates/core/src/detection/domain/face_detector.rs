use thiserror::Error;

use crate::detection::domain::face_observation::FaceObservation;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("face landmark detection failed: {0}")]
    Detection(String),
    #[error("face tracking failed: {0}")]
    Tracking(String),
}

/// Domain interface for the face/landmark detector.
///
/// Observations come back in detector space: boxes normalized to the
/// frame, landmark points normalized to their box.
pub trait FaceDetector: Send {
    /// Full, independent detection on `frame`.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceObservation>, DetectorError>;

    /// Lighter track-forward pass seeded with the previous frame's
    /// observations. Detectors without such a mode fall back to `detect`.
    fn track(
        &mut self,
        frame: &Frame,
        prior: &[FaceObservation],
    ) -> Result<Vec<FaceObservation>, DetectorError> {
        let _ = prior;
        self.detect(frame)
    }
}
