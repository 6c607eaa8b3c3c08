/// Per-frame detection strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingMode {
    /// No faces tracked.
    #[default]
    Idle,
    /// Full detection every frame; the matching engine re-synchronizes records.
    Detecting,
    /// Scene is stable; the detector tracks forward from the previous frame.
    Tracking,
}

/// Which detector call a frame issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorRequest {
    Detect,
    Track,
}

/// Chooses between full detection and track-forward.
///
/// Tracking starts once two consecutive frames report the same nonzero
/// face count. Any change in count returns to detection on the next frame;
/// a count of zero returns to idle.
#[derive(Debug, Default)]
pub struct ModeSelector {
    mode: TrackingMode,
    previous_count: usize,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    pub fn next_request(&self) -> DetectorRequest {
        match self.mode {
            TrackingMode::Tracking => DetectorRequest::Track,
            TrackingMode::Idle | TrackingMode::Detecting => DetectorRequest::Detect,
        }
    }

    /// Feeds the face count the detector reported for the frame just
    /// processed and returns the mode for the next frame.
    pub fn advance(&mut self, face_count: usize) -> TrackingMode {
        let next = match (self.mode, face_count) {
            (_, 0) => TrackingMode::Idle,
            (TrackingMode::Idle, _) => TrackingMode::Detecting,
            (_, n) if n == self.previous_count => TrackingMode::Tracking,
            _ => TrackingMode::Detecting,
        };
        if next != self.mode {
            log::debug!(
                "Mode {:?} -> {:?} ({} -> {} faces)",
                self.mode,
                next,
                self.previous_count,
                face_count
            );
        }
        self.mode = next;
        self.previous_count = face_count;
        next
    }

    /// Drops back to detection without changing the remembered count, used
    /// when a frame's result is not trusted (missed or failed request).
    pub fn force_detect(&mut self) {
        if self.mode == TrackingMode::Tracking {
            self.mode = TrackingMode::Detecting;
        }
    }

    pub fn reset(&mut self) {
        self.mode = TrackingMode::Idle;
        self.previous_count = 0;
    }
}
