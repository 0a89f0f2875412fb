//! Static single-image rendering
//!
//! **Why**: A lone image (or a one-frame source) has no timing concerns, so
//! it skips the whole streaming pipeline and prints top to bottom in normal
//! terminal flow. This is also the only path that honors per-pixel alpha.
//!
//! **Used by**: main (image dispatch), PlaybackController (one-frame bypass)

use std::io::{self, Write};

use crate::encode::push_cell_alpha;
use crate::frame::Frame;
use crate::term;

/// Blank-line / blank-column padding around the image.
#[derive(Debug, Clone, Copy)]
pub struct Paddings {
    /// Empty lines before the image.
    pub begin: usize,
    /// Empty lines after the image.
    pub end: usize,
    /// Spaces at the start of every image line.
    pub left: usize,
}

impl Default for Paddings {
    fn default() -> Self {
        Self { begin: 1, end: 0, left: 1 }
    }
}

/// Render an even-height frame as padded, alpha-aware half-block lines.
///
/// Each line ends with a color reset and newline, so the image scrolls like
/// ordinary output instead of addressing the screen.
pub fn render(frame: &Frame, pads: Paddings) -> String {
    let mut out = String::new();
    for _ in 0..pads.begin {
        out.push('\n');
    }
    for pair in 0..frame.height() / 2 {
        for _ in 0..pads.left {
            out.push(' ');
        }
        let y = pair * 2;
        for x in 0..frame.width() {
            push_cell_alpha(&mut out, frame.pixel(x, y), frame.pixel(x, y + 1));
        }
        out.push_str(term::RESET);
        out.push('\n');
    }
    for _ in 0..pads.end {
        out.push('\n');
    }
    out
}

/// Render and write in one go.
pub fn display(frame: &Frame, pads: Paddings, out: &mut dyn Write) -> io::Result<()> {
    out.write_all(render(frame, pads).as_bytes())?;
    out.flush()
}
