use std::time::Duration;

/// Channel count of the BGRA buffers capture devices deliver.
pub const BGRA_CHANNELS: u8 = 4;

/// A single captured video frame: contiguous pixel bytes in row-major order.
///
/// The tracking core never inspects pixels; they are handed to the
/// detector as-is.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    timestamp: Duration,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        index: usize,
        timestamp: Duration,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            timestamp,
        }
    }

    /// All-black BGRA frame.
    pub fn blank(width: u32, height: u32, index: usize, timestamp: Duration) -> Self {
        let len = (width as usize) * (height as usize) * BGRA_CHANNELS as usize;
        Self::new(vec![0u8; len], width, height, BGRA_CHANNELS, index, timestamp)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Sequence number assigned by the capture device.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Capture time relative to when the device was opened.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 16]; // 2x2x4
        let frame = Frame::new(data.clone(), 2, 2, 4, 5, Duration::from_millis(166));
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 4);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.timestamp(), Duration::from_millis(166));
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_blank_is_bgra_and_zeroed() {
        let frame = Frame::blank(4, 3, 0, Duration::ZERO);
        assert_eq!(frame.channels(), BGRA_CHANNELS);
        assert_eq!(frame.data().len(), 4 * 3 * 4);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 4, 0, Duration::ZERO);
    }
}
