use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use face_overlay_core::capture::domain::capture_settings::CaptureSettings;
use face_overlay_core::detection::domain::tracked_face::TrackedFace;
use face_overlay_core::overlay::domain::overlay_renderer::OverlayRenderer;
use face_overlay_core::overlay::overlay_driver::OverlayDriver;
use face_overlay_core::pipeline::event_dispatcher::FaceEventConsumer;
use face_overlay_core::shared::error::TrackingError;

#[derive(Debug, Default)]
pub struct EventCounts {
    detected: AtomicUsize,
    updated: AtomicUsize,
    lost: AtomicUsize,
    failed: AtomicUsize,
}

impl EventCounts {
    pub fn detected(&self) -> usize {
        self.detected.load(Ordering::Relaxed)
    }

    pub fn updated(&self) -> usize {
        self.updated.load(Ordering::Relaxed)
    }

    pub fn lost(&self) -> usize {
        self.lost.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} detected, {} updated, {} lost, {} failed",
            self.detected(),
            self.updated(),
            self.lost(),
            self.failed()
        )
    }
}

/// Counts events and forwards them to the overlay driver.
pub struct ReportingConsumer<R: OverlayRenderer> {
    driver: OverlayDriver<R>,
    counts: Arc<EventCounts>,
}

impl<R: OverlayRenderer> ReportingConsumer<R> {
    pub fn new(driver: OverlayDriver<R>, counts: Arc<EventCounts>) -> Self {
        Self { driver, counts }
    }
}

impl<R: OverlayRenderer> FaceEventConsumer for ReportingConsumer<R> {
    fn capture_opened(&mut self, settings: &CaptureSettings) {
        log::info!(
            "Replaying from {} at {} fps",
            settings.device_name,
            settings.frame_rate
        );
        self.driver.capture_opened(settings);
    }

    fn faces_detected(&mut self, faces: &[TrackedFace]) {
        self.counts.detected.fetch_add(1, Ordering::Relaxed);
        log::info!("Faces detected: {}", faces.len());
        self.driver.faces_detected(faces);
    }

    fn faces_updated(&mut self, faces: &[TrackedFace]) {
        self.counts.updated.fetch_add(1, Ordering::Relaxed);
        self.driver.faces_updated(faces);
    }

    fn tracking_lost(&mut self) {
        self.counts.lost.fetch_add(1, Ordering::Relaxed);
        log::info!("Tracking lost");
        self.driver.tracking_lost();
    }

    fn failed(&mut self, error: &TrackingError) {
        self.counts.failed.fetch_add(1, Ordering::Relaxed);
        self.driver.failed(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_overlay_core::overlay::infrastructure::logging_overlay_renderer::LoggingOverlayRenderer;

    #[test]
    fn test_counts_each_event_kind() {
        let counts = Arc::new(EventCounts::default());
        let mut consumer =
            ReportingConsumer::new(OverlayDriver::new(LoggingOverlayRenderer::new()), counts.clone());

        consumer.faces_detected(&[]);
        consumer.faces_updated(&[]);
        consumer.faces_updated(&[]);
        consumer.tracking_lost();
        consumer.failed(&TrackingError::RequestFailure {
            frame_index: 1,
            message: "timeout".into(),
        });

        assert_eq!(counts.summary(), "1 detected, 2 updated, 1 lost, 1 failed");
    }

    #[test]
    fn test_forwards_loss_to_renderer() {
        let renderer = LoggingOverlayRenderer::new();
        let stats = renderer.stats();
        let mut consumer =
            ReportingConsumer::new(OverlayDriver::new(renderer), Arc::new(EventCounts::default()));

        consumer.tracking_lost();

        assert_eq!(stats.cleared(), 1);
    }
}
