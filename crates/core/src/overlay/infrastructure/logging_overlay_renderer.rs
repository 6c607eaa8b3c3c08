use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::geometry::Rect;

/// Running totals of renderer calls, shareable with the host.
#[derive(Debug, Default)]
pub struct OverlayStats {
    shown: AtomicUsize,
    animated: AtomicUsize,
    cleared: AtomicUsize,
}

impl OverlayStats {
    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::Relaxed)
    }

    pub fn animated(&self) -> usize {
        self.animated.load(Ordering::Relaxed)
    }

    pub fn cleared(&self) -> usize {
        self.cleared.load(Ordering::Relaxed)
    }
}

/// Headless renderer that logs each placement instead of drawing it.
#[derive(Default)]
pub struct LoggingOverlayRenderer {
    stats: Arc<OverlayStats>,
}

impl LoggingOverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Arc<OverlayStats> {
        self.stats.clone()
    }
}

impl OverlayRenderer for LoggingOverlayRenderer {
    fn show(&mut self, slot: usize, target: Rect) {
        self.stats.shown.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "Overlay {slot}: show at ({:.1}, {:.1}) {:.1}x{:.1}",
            target.x,
            target.y,
            target.width,
            target.height
        );
    }

    fn animate(&mut self, slot: usize, target: Rect, duration: Duration) {
        self.stats.animated.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Overlay {slot}: move to ({:.1}, {:.1}) {:.1}x{:.1} over {:.1}ms",
            target.x,
            target.y,
            target.width,
            target.height,
            duration.as_secs_f64() * 1000.0
        );
    }

    fn clear(&mut self) {
        self.stats.cleared.fetch_add(1, Ordering::Relaxed);
        log::info!("Overlays cleared");
    }
}
