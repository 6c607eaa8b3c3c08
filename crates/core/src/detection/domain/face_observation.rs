use crate::shared::geometry::{Point, Rect, Size};

/// Detector-assigned identity. Only stable within one continuous tracking
/// run, so it is never used to match records across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObservationToken(pub u64);

/// Landmark contours used to anchor overlays.
///
/// A sequence is empty when the detector could not resolve that feature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    pub outer_lips: Vec<Point>,
    pub nose: Vec<Point>,
    pub nose_crest: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(outer_lips: Vec<Point>, nose: Vec<Point>, nose_crest: Vec<Point>) -> Self {
        Self {
            outer_lips,
            nose,
            nose_crest,
        }
    }

    /// All three contours resolved.
    pub fn is_complete(&self) -> bool {
        !self.outer_lips.is_empty() && !self.nose.is_empty() && !self.nose_crest.is_empty()
    }

    /// Maps box-relative unit points into the space `bbox` lives in.
    pub fn denormalized(&self, bbox: &Rect) -> FaceLandmarks {
        let map = |points: &[Point]| points.iter().map(|p| bbox.denormalize(*p)).collect();
        FaceLandmarks {
            outer_lips: map(&self.outer_lips),
            nose: map(&self.nose),
            nose_crest: map(&self.nose_crest),
        }
    }
}

/// One face as reported by the detector for a single frame.
///
/// Detectors report `bounding_box` normalized to the frame (0..1) and
/// landmark points normalized to the bounding box. `landmarks` is `None`
/// when the detector produced no landmark result at all.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub token: ObservationToken,
    pub bounding_box: Rect,
    pub landmarks: Option<FaceLandmarks>,
}

impl FaceObservation {
    pub fn new(token: ObservationToken, bounding_box: Rect, landmarks: Option<FaceLandmarks>) -> Self {
        Self {
            token,
            bounding_box,
            landmarks,
        }
    }

    /// Brings a detector observation into view coordinates.
    ///
    /// The box is scaled into `view`; landmark points become absolute view
    /// coordinates inside the scaled box.
    pub fn to_view_space(&self, view: Size) -> FaceObservation {
        let bounding_box = self.bounding_box.scale(view);
        let landmarks = self
            .landmarks
            .as_ref()
            .map(|lm| lm.denormalized(&bounding_box));
        FaceObservation {
            token: self.token,
            bounding_box,
            landmarks,
        }
    }
}
