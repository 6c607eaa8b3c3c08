use crate::detection::domain::face_observation::{FaceLandmarks, ObservationToken};
use crate::shared::geometry::Rect;

/// The pipeline's persistent record of one physical face.
///
/// `slot` is the face's position in the record store and the identity
/// handed to consumers. It stays valid until the store is cleared or a
/// record before it is removed.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedFace {
    pub slot: usize,
    /// Token of the observation that last wrote this record.
    pub token: ObservationToken,
    /// View-space box.
    pub bounding_box: Rect,
    /// View-space landmarks.
    pub landmarks: FaceLandmarks,
    /// Written during the current frame cycle.
    pub fresh: bool,
}
