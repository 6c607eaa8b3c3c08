use std::collections::HashSet;

use crate::capture::domain::capture_settings::CaptureSettings;
use crate::detection::domain::tracked_face::TrackedFace;
use crate::overlay::domain::overlay_positioning::OverlayPositioningAdapter;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::pipeline::event_dispatcher::FaceEventConsumer;
use crate::shared::error::TrackingError;

/// Keeps a renderer's overlays in step with the tracked faces.
///
/// New slots get an overlay, known slots are animated to their new anchor,
/// and faces without a usable landmark set keep their last position.
pub struct OverlayDriver<R: OverlayRenderer> {
    renderer: R,
    adapter: OverlayPositioningAdapter,
    shown: HashSet<usize>,
    last_error: Option<TrackingError>,
}

impl<R: OverlayRenderer> OverlayDriver<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            adapter: OverlayPositioningAdapter::new(),
            shown: HashSet::new(),
            last_error: None,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn adapter(&self) -> &OverlayPositioningAdapter {
        &self.adapter
    }

    /// Slots that currently have an overlay.
    pub fn shown_slots(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = self.shown.iter().copied().collect();
        slots.sort_unstable();
        slots
    }

    pub fn last_error(&self) -> Option<&TrackingError> {
        self.last_error.as_ref()
    }

    fn place(&mut self, faces: &[TrackedFace]) {
        for placement in self.adapter.placements(faces) {
            if self.shown.insert(placement.slot) {
                self.renderer.show(placement.slot, placement.target);
            } else {
                self.renderer
                    .animate(placement.slot, placement.target, placement.duration);
            }
        }
    }
}

impl<R: OverlayRenderer> FaceEventConsumer for OverlayDriver<R> {
    fn capture_opened(&mut self, settings: &CaptureSettings) {
        self.adapter.set_frame_rate(settings.frame_rate);
        log::debug!(
            "Overlay animation set to {:?} per frame",
            self.adapter.animation_duration()
        );
    }

    fn faces_detected(&mut self, faces: &[TrackedFace]) {
        self.place(faces);
    }

    fn faces_updated(&mut self, faces: &[TrackedFace]) {
        self.place(faces);
    }

    fn tracking_lost(&mut self) {
        self.shown.clear();
        self.renderer.clear();
    }

    fn failed(&mut self, error: &TrackingError) {
        if error.requires_reopen() {
            log::error!("Overlay tracking stopped: {error}");
        } else {
            log::warn!("Overlay skipped a frame: {error}");
        }
        self.last_error = Some(error.clone());
    }
}
