//! Fit-to-terminal resizing
//!
//! **Why**: A terminal cell holds two vertically stacked pixels, so an image
//! must fit `width_limit` columns by `height_limit * 2` pixel rows, and the
//! resized height must be even for the row-pair encoder.
//!
//! **Used by**: PlaybackController (per-frame fit), still (single image)

use clap::ValueEnum;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::frame::Frame;

/// Interpolation filter for the fit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Interpolation {
    Nearest,
    /// Bilinear. The default, cheap and good enough for terminal cells.
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl Interpolation {
    pub fn filter(self) -> FilterType {
        match self {
            Interpolation::Nearest => FilterType::Nearest,
            Interpolation::Triangle => FilterType::Triangle,
            Interpolation::CatmullRom => FilterType::CatmullRom,
            Interpolation::Gaussian => FilterType::Gaussian,
            Interpolation::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Target resolution for a source image under terminal limits.
///
/// Shrinks (never grows) to fit `height_limit` rows of blocks and
/// `width_limit` columns, preserving aspect ratio. The returned height is
/// always even and at least 2.
pub fn fit(width: usize, height: usize, width_limit: usize, height_limit: usize) -> (usize, usize) {
    let max_pixel_rows = height_limit * 2;

    let mut ratio = if height > max_pixel_rows {
        height as f64 / max_pixel_rows as f64
    } else {
        1.0
    };
    if (width as f64 / ratio) as usize > width_limit {
        ratio = width as f64 / width_limit as f64;
    }

    let out_w = ((width as f64 / ratio) as usize).max(1);
    let out_h = (((height as f64 / ratio) / 2.0) as usize * 2).max(2);
    (out_w, out_h)
}

/// Resize a frame to the target resolution. Identity when already sized
/// (and even-height), so the common pre-fitted case costs nothing.
pub fn resize_frame(frame: Frame, target: (usize, usize), interp: Interpolation) -> Frame {
    let (tw, th) = target;
    if frame.width() == tw && frame.height() == th && th % 2 == 0 {
        return frame;
    }

    let (w, h) = (frame.width() as u32, frame.height() as u32);
    let img = RgbaImage::from_raw(w, h, frame.into_raw())
        .expect("frame buffer matches its own dimensions");
    let resized = imageops::resize(&img, tw as u32, th as u32, interp.filter());
    Frame::from_rgba(tw, th, resized.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_height_bound() {
        // 400x300 into 40 rows (80 pixel rows) of 1000 cols: height-bound.
        let (w, h) = fit(400, 300, 1000, 40);
        assert_eq!(h, 80);
        assert!(h % 2 == 0);
        assert_eq!(w, (400.0 / (300.0 / 80.0)) as usize);
        assert!(w <= 1000);
    }

    #[test]
    fn fit_width_bound() {
        let (w, h) = fit(800, 100, 80, 200);
        assert_eq!(w, 80);
        assert!(h % 2 == 0);
        assert!(h <= 400);
    }

    #[test]
    fn fit_never_upscales() {
        let (w, h) = fit(10, 8, 100, 100);
        assert_eq!((w, h), (10, 8));
    }

    #[test]
    fn fit_height_always_even() {
        for height in [99, 100, 101, 7, 3] {
            let (_, h) = fit(50, height, 80, 24);
            assert_eq!(h % 2, 0, "height {} produced odd fit {}", height, h);
            assert!(h >= 2);
        }
    }

    #[test]
    fn resize_identity_is_free() {
        let frame = Frame::filled(4, 4, [1, 2, 3, 255]);
        let out = resize_frame(frame.clone(), (4, 4), Interpolation::Triangle);
        assert_eq!(out, frame);
    }

    #[test]
    fn resize_nearest_keeps_uniform_color() {
        let frame = Frame::filled(8, 8, [9, 8, 7, 255]);
        let out = resize_frame(frame, (4, 4), Interpolation::Nearest);
        assert_eq!(out.width(), 4);
        assert_eq!(out.height(), 4);
        assert_eq!(out.pixel(3, 3), [9, 8, 7, 255]);
    }
}
