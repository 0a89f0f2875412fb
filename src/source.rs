//! Frame sources
//!
//! **Why**: The playback pipeline only needs sequential frames, a frame
//! rate and forward seeking. Putting that behind a trait keeps container
//! decoding (mp4, mkv, hardware backends) outside this crate; the shipped
//! implementation plays numbered image sequences, which also covers the
//! single-image case.
//!
//! **Used by**: PlaybackController (streaming loop), main (open + dispatch)
//!
//! # Detection
//!
//! 1. Glob pattern (`render.*.png`) → all matching files, sorted
//! 2. Directory → every image file inside, sorted
//! 3. Numbered file (`shot.0042.png`) → all siblings sharing prefix/ext
//! 4. Anything else → single-frame source

use std::path::{Path, PathBuf};

use image::ImageReader;
use log::{debug, info};
use regex::Regex;

use crate::frame::{Frame, SourceError};

/// Supplies successive decoded frames plus position metadata.
///
/// Seeking is best-effort: `SequenceSource` is frame-exact, but a
/// container-backed implementation may land on the nearest decodable frame.
/// Callers must not assume frame-exact resynchronization after a seek.
pub trait FrameSource {
    /// Nominal playback rate in frames per second.
    fn frame_rate(&self) -> f64;

    /// Total number of frames.
    fn frame_count(&self) -> u64;

    /// Decode and return the next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;

    /// Index of the frame `next_frame` will return next.
    fn position(&self) -> u64;

    /// Jump forward (or back) to a frame index.
    fn seek_to_frame(&mut self, index: u64) -> Result<(), SourceError>;
}

/// Extensions accepted as playable images.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "tga"];

/// Whether a path looks like a supported image file.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode an image file into an RGBA frame.
pub fn decode_image(path: &Path) -> Result<Frame, SourceError> {
    let img = ImageReader::open(path)
        .map_err(|e| SourceError::Decode(path.to_path_buf(), e.to_string()))?
        .decode()
        .map_err(|e| SourceError::Decode(path.to_path_buf(), e.to_string()))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    Ok(Frame::from_rgba(w as usize, h as usize, rgba.into_raw()))
}

/// Image-sequence frame source backed by a sorted file list.
#[derive(Debug)]
pub struct SequenceSource {
    files: Vec<PathBuf>,
    fps: f64,
    pos: u64,
}

impl SequenceSource {
    /// Open a sequence from a path, directory or glob pattern.
    ///
    /// `fps` is the playback rate; image files carry no rate metadata.
    pub fn open(pattern: &str, fps: f64) -> Result<Self, SourceError> {
        let path = Path::new(pattern);

        let mut files = if pattern.contains('*') {
            Self::from_glob(pattern)?
        } else if path.is_dir() {
            Self::from_dir(path)?
        } else {
            Self::from_file(path)?
        };
        files.sort();
        files.dedup();

        if files.is_empty() {
            return Err(SourceError::NoFrames(pattern.to_string()));
        }

        info!("sequence: {} frame(s) at {} fps from {}", files.len(), fps, pattern);
        Ok(Self { files, fps, pos: 0 })
    }

    fn from_glob(pattern: &str) -> Result<Vec<PathBuf>, SourceError> {
        let paths = glob::glob(pattern)
            .map_err(|e| SourceError::NoFrames(format!("{}: {}", pattern, e)))?;
        Ok(paths
            .filter_map(|p| p.ok())
            .filter(|p| is_image_file(p))
            .collect())
    }

    fn from_dir(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| SourceError::NoFrames(format!("{}: {}", dir.display(), e)))?;
        Ok(entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_image_file(p))
            .collect())
    }

    /// Expand a single numbered file into its sibling sequence.
    ///
    /// `shot.0042.png` matches every `shot.<digits>.png` next to it. A file
    /// without a frame number is a single-frame source.
    fn from_file(path: &Path) -> Result<Vec<PathBuf>, SourceError> {
        if !path.is_file() {
            return Err(SourceError::NoFrames(format!("{} does not exist", path.display())));
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return Ok(vec![path.to_path_buf()]),
        };

        let re = Regex::new(r"^(.*?)(\d+)(\.[A-Za-z0-9]+)$").expect("static regex");
        let caps = match re.captures(name) {
            Some(c) => c,
            None => {
                debug!("{}: no frame number, single-frame source", path.display());
                return Ok(vec![path.to_path_buf()]);
            }
        };
        let (prefix, ext) = (caps[1].to_string(), caps[3].to_string());

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let sibling = Regex::new(&format!(
            r"^{}\d+{}$",
            regex::escape(&prefix),
            regex::escape(&ext)
        ))
        .expect("escaped regex");

        let entries = std::fs::read_dir(dir)
            .map_err(|e| SourceError::NoFrames(format!("{}: {}", dir.display(), e)))?;
        Ok(entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| sibling.is_match(n))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Paths backing this source, in playback order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl FrameSource for SequenceSource {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.files.len() as u64
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(path) = self.files.get(self.pos as usize) else {
            return Ok(None);
        };
        let frame = decode_image(path)?;
        self.pos += 1;
        Ok(Some(frame))
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn seek_to_frame(&mut self, index: u64) -> Result<(), SourceError> {
        if index > self.frame_count() {
            return Err(SourceError::SeekOutOfRange {
                requested: index,
                count: self.frame_count(),
            });
        }
        debug!("seek {} -> {}", self.pos, index);
        self.pos = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, shade: u8) -> PathBuf {
        let path = dir.join(name);
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([shade, 0, 0, 255]));
        img.save(&path).unwrap();
        path
    }

    fn fixture_sequence() -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let files = (1..=4)
            .map(|i| write_png(dir.path(), &format!("shot.{:04}.png", i), i as u8))
            .collect();
        (dir, files)
    }

    #[test]
    fn numbered_file_expands_to_sequence() {
        let (dir, files) = fixture_sequence();
        write_png(dir.path(), "unrelated.png", 9);

        let first = files[0].to_str().unwrap();
        let source = SequenceSource::open(first, 24.0).unwrap();
        assert_eq!(source.frame_count(), 4);
        assert_eq!(source.files(), files.as_slice());
    }

    #[test]
    fn frames_decode_in_order() {
        let (_dir, files) = fixture_sequence();
        let mut source = SequenceSource::open(files[0].to_str().unwrap(), 24.0).unwrap();

        for i in 1..=4u8 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.pixel(0, 0), [i, 0, 0, 255]);
            assert_eq!(source.position(), i as u64);
        }
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn seek_skips_decoding() {
        let (_dir, files) = fixture_sequence();
        let mut source = SequenceSource::open(files[0].to_str().unwrap(), 24.0).unwrap();

        source.seek_to_frame(3).unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.pixel(0, 0), [4, 0, 0, 255]);

        let err = source.seek_to_frame(99).unwrap_err();
        assert!(matches!(err, SourceError::SeekOutOfRange { requested: 99, .. }));
    }

    #[test]
    fn directory_source_sorted() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "b.png", 2);
        write_png(dir.path(), "a.png", 1);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let source = SequenceSource::open(dir.path().to_str().unwrap(), 12.0).unwrap();
        assert_eq!(source.frame_count(), 2);
        assert!(source.files()[0].ends_with("a.png"));
        assert_eq!(source.frame_rate(), 12.0);
    }

    #[test]
    fn plain_file_is_single_frame() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "logo.png", 5);
        let source = SequenceSource::open(path.to_str().unwrap(), 24.0).unwrap();
        assert_eq!(source.frame_count(), 1);
    }

    #[test]
    fn missing_path_is_no_frames() {
        let err = SequenceSource::open("/nonexistent/frames.png", 24.0).unwrap_err();
        assert!(matches!(err, SourceError::NoFrames(_)));
    }
}
