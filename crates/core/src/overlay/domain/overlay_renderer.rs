use std::time::Duration;

use crate::shared::geometry::Rect;

/// Draws one overlay per tracked face slot.
///
/// Implementations own the actual drawing. Calls arrive on the event
/// delivery thread, never on the capture or intake threads.
pub trait OverlayRenderer: Send {
    /// Creates the overlay for `slot` at `target`.
    fn show(&mut self, slot: usize, target: Rect);

    /// Moves an existing overlay, finishing within `duration`.
    fn animate(&mut self, slot: usize, target: Rect, duration: Duration);

    /// Removes every overlay.
    fn clear(&mut self);
}
