/// Tolerance added on every side of a tracked face's box when matching
/// new observations, in view points.
pub const DEFAULT_MATCH_MARGIN: f64 = 20.0;

pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Frame rate negotiated on single-processor hosts.
pub const CONSTRAINED_FRAME_RATE: u32 = 15;

/// Frames buffered between capture and intake. When full, the oldest
/// pending frame is dropped in favor of the newest.
pub const DEFAULT_FRAME_QUEUE_CAPACITY: usize = 1;

/// Consecutive empty frames tolerated before tracking is declared lost.
/// 0 clears on the first empty frame.
pub const DEFAULT_GRACE_FRAMES: usize = 0;

pub const DEFAULT_VIEW_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEW_HEIGHT: f64 = 720.0;
