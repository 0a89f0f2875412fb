//! RGBA frame buffer shared by the decode, resize and encode stages
//!
//! **Why**: Every stage of the pipeline works on the same representation:
//! a tightly packed RGBA8 grid. Decoders normalize into this, the resizer
//! produces an even-height copy of it, and the encoder only ever reads it.
//!
//! **Used by**: SequenceSource (decode output), resize (fit step),
//! encode (cell emission), still (single-image path)
//!
//! # Ownership
//!
//! A frame is produced once per decode step and moves through the pipeline
//! by value. Nothing mutates it after creation.

use std::path::PathBuf;

/// One RGBA pixel, 0-255 per channel.
pub type Pixel = [u8; 4];

/// Packed RGBA8 frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>, // width * height * 4
}

impl Frame {
    /// Create a frame from a packed RGBA buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height * 4`. Callers construct
    /// frames from buffers they sized themselves.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), width * height * 4, "RGBA buffer size mismatch");
        Self { width, height, data }
    }

    /// Create a frame filled with a single color. Mostly used by tests.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        let mut data = vec![0u8; width * height * 4];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&pixel);
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at (x, y). Row-major, y down.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        let i = (y * self.width + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// One row of pixels as a raw byte view.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.width * 4;
        &self.data[start..start + self.width * 4]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Frame source errors
#[derive(Debug)]
pub enum SourceError {
    /// Image file could not be decoded mid-stream. Fatal for the session.
    Decode(PathBuf, String),
    /// Path does not resolve to any playable frames.
    NoFrames(String),
    /// Seek target past the end of the source.
    SeekOutOfRange { requested: u64, count: u64 },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Decode(path, e) => {
                write!(f, "failed to decode {}: {}", path.display(), e)
            }
            SourceError::NoFrames(what) => write!(f, "no playable frames: {}", what),
            SourceError::SeekOutOfRange { requested, count } => {
                write!(f, "seek to frame {} out of range (count {})", requested, count)
            }
        }
    }
}

impl std::error::Error for SourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_access_row_major() {
        let mut data = vec![0u8; 2 * 2 * 4];
        data[4..8].copy_from_slice(&[1, 2, 3, 4]); // (1, 0)
        data[8..12].copy_from_slice(&[5, 6, 7, 8]); // (0, 1)
        let frame = Frame::from_rgba(2, 2, data);

        assert_eq!(frame.pixel(1, 0), [1, 2, 3, 4]);
        assert_eq!(frame.pixel(0, 1), [5, 6, 7, 8]);
        assert_eq!(frame.row(1)[0..4], [5, 6, 7, 8]);
    }

    #[test]
    fn filled_frame_uniform() {
        let frame = Frame::filled(3, 2, [10, 20, 30, 255]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.pixel(x, y), [10, 20, 30, 255]);
            }
        }
    }

    #[test]
    #[should_panic(expected = "size mismatch")]
    fn wrong_buffer_size_panics() {
        Frame::from_rgba(2, 2, vec![0u8; 3]);
    }
}
