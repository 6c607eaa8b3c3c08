use std::time::Duration;

use crate::detection::domain::face_observation::FaceLandmarks;
use crate::detection::domain::tracked_face::TrackedFace;
use crate::shared::constants::DEFAULT_FRAME_RATE;
use crate::shared::geometry::{Point, Rect};

/// Where and how fast to move the overlay for one tracked face.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPlacement {
    pub slot: usize,
    pub target: Rect,
    pub duration: Duration,
}

/// Region between the nose base and the upper lip.
///
/// Horizontal extent follows the lips. Vertically it runs from the top of
/// the lips to the lowest nose or nose-crest point. `None` unless all three
/// contours are present.
pub fn anchor_region(landmarks: &FaceLandmarks) -> Option<Rect> {
    if !landmarks.is_complete() {
        return None;
    }
    let lips = &landmarks.outer_lips;
    let left = fold(lips, |p| p.x, f64::min);
    let right = fold(lips, |p| p.x, f64::max);
    let top = fold(lips, |p| p.y, f64::min);
    let bottom = fold(&landmarks.nose, |p| p.y, f64::max)
        .max(fold(&landmarks.nose_crest, |p| p.y, f64::max));
    Some(Rect::from_edges(left, top, right, bottom))
}

fn fold(points: &[Point], axis: impl Fn(&Point) -> f64, pick: fn(f64, f64) -> f64) -> f64 {
    points
        .iter()
        .map(axis)
        .reduce(pick)
        .unwrap_or(0.0)
}

/// Turns tracked faces into overlay placements.
///
/// Each transition lasts exactly one frame interval so animations never
/// queue up behind each other.
#[derive(Debug, Default)]
pub struct OverlayPositioningAdapter {
    frame_rate: Option<u32>,
}

impl OverlayPositioningAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts the capture device's negotiated rate. Zero is ignored.
    pub fn set_frame_rate(&mut self, frame_rate: u32) {
        if frame_rate == 0 {
            log::warn!("Ignoring frame rate 0; keeping {}", self.frame_rate());
            return;
        }
        self.frame_rate = Some(frame_rate);
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate()
    }

    /// Placements for faces with a complete landmark set. Others are
    /// skipped so the renderer keeps their previous position.
    pub fn placements(&self, faces: &[TrackedFace]) -> Vec<OverlayPlacement> {
        let duration = self.animation_duration();
        faces
            .iter()
            .filter_map(|face| {
                anchor_region(&face.landmarks).map(|target| OverlayPlacement {
                    slot: face.slot,
                    target,
                    duration,
                })
            })
            .collect()
    }
}
