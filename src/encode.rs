//! Frame-to-escape-sequence encoding
//!
//! **Why**: Formatting thousands of truecolor escapes per frame dominates
//! CPU time at terminal resolutions, so row pairs are encoded in parallel.
//! Every cell carries its own absolute cursor position, which makes the
//! row-pair results order-independent until the final concatenation.
//!
//! **Used by**: PlaybackController (video frames), still (alpha-aware path)
//!
//! # Cell format
//!
//! Two vertically stacked pixels per cell. The video path assumes opaque
//! pixels: background = upper pixel, foreground = lower pixel, glyph `▄`.
//! The single-image path adds the transparency cases (see [`push_cell_alpha`]).

use rayon::prelude::*;

use crate::frame::{Frame, Pixel};
use crate::term;

/// One fully encoded frame, ready for a single terminal write.
pub type EncodedPayload = String;

/// Screen placement of the rendered frame, 1-based.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// First screen row of the frame.
    pub top: usize,
    /// First screen column of the frame.
    pub left: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self { top: 1, left: 1 }
    }
}

/// Append one opaque cell: upper pixel as background, lower as foreground.
#[inline]
fn push_cell(buf: &mut String, upper: Pixel, lower: Pixel) {
    term::push_bg(buf, upper[0], upper[1], upper[2]);
    term::push_fg(buf, lower[0], lower[1], lower[2]);
    buf.push(term::LOWER_HALF);
}

/// Append one alpha-aware cell (single-image path).
///
/// - both pixels transparent: a bare space, no escapes
/// - only upper transparent: foreground-only `▄` in the lower pixel's color
/// - only lower transparent: background upper color + `▀`
/// - both opaque: full two-color cell
pub fn push_cell_alpha(buf: &mut String, upper: Pixel, lower: Pixel) {
    match (upper[3] == 0, lower[3] == 0) {
        (true, true) => buf.push(' '),
        (true, false) => {
            term::push_fg(buf, lower[0], lower[1], lower[2]);
            buf.push(term::LOWER_HALF);
        }
        (false, true) => {
            term::push_bg(buf, upper[0], upper[1], upper[2]);
            buf.push(term::UPPER_HALF);
        }
        (false, false) => push_cell(buf, upper, lower),
    }
}

/// Encode one row pair into an absolutely positioned segment.
///
/// `pair` is the row-pair index; pixels come from frame rows `2*pair` and
/// `2*pair + 1`, rendered on screen row `layout.top + pair`.
pub fn encode_row_pair(frame: &Frame, pair: usize, layout: Layout) -> String {
    let screen_row = layout.top + pair;
    let upper_y = pair * 2;
    // cursor (~10B) + bg + fg (~19B each) + 3B glyph per cell
    let mut seg = String::with_capacity(frame.width() * 52);

    for x in 0..frame.width() {
        term::push_cursor(&mut seg, screen_row, layout.left + x);
        push_cell(&mut seg, frame.pixel(x, upper_y), frame.pixel(x, upper_y + 1));
    }
    seg
}

/// Encode a full frame into one payload.
///
/// Partitions the frame into `height/2` row pairs and encodes them with a
/// rayon indexed fan-out; collection is by index, so segments land in row
/// order without any reordering step.
///
/// # Panics
///
/// Panics if the frame height is odd. The fit step guarantees even height.
pub fn encode_frame(frame: &Frame, layout: Layout) -> EncodedPayload {
    assert_eq!(frame.height() % 2, 0, "frame height must be even");

    let segments: Vec<String> = (0..frame.height() / 2)
        .into_par_iter()
        .map(|pair| encode_row_pair(frame, pair, layout))
        .collect();
    segments.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(segment: &str) -> usize {
        segment.matches([term::LOWER_HALF, term::UPPER_HALF]).count()
            + segment.matches(' ').count()
    }

    #[test]
    fn frame_produces_half_height_segments_of_full_width() {
        let frame = Frame::filled(7, 6, [0, 0, 0, 255]);
        let layout = Layout::default();

        let mut total = 0;
        for pair in 0..3 {
            let seg = encode_row_pair(&frame, pair, layout);
            assert_eq!(cells(&seg), 7, "row pair {} cell count", pair);
            total += seg.len();
        }
        assert_eq!(encode_frame(&frame, layout).len(), total);
    }

    #[test]
    fn uniform_color_round_trip() {
        let frame = Frame::filled(3, 2, [12, 34, 56, 255]);
        let payload = encode_frame(&frame, Layout::default());

        assert_eq!(payload.matches("\x1b[48;2;12;34;56m").count(), 3);
        assert_eq!(payload.matches("\x1b[38;2;12;34;56m").count(), 3);
        assert_eq!(payload.matches(term::LOWER_HALF).count(), 3);
        assert_eq!(payload.matches(term::UPPER_HALF).count(), 0);
    }

    #[test]
    fn cells_carry_absolute_positions() {
        let frame = Frame::filled(2, 4, [1, 1, 1, 255]);
        let payload = encode_frame(&frame, Layout { top: 5, left: 10 });

        for (row, col) in [(5, 10), (5, 11), (6, 10), (6, 11)] {
            let esc = format!("\x1b[{};{}H", row, col);
            assert!(payload.contains(&esc), "missing cursor move {}", esc);
        }
    }

    #[test]
    fn parallel_segments_concatenate_in_row_order() {
        let mut data = Vec::new();
        for y in 0..4u8 {
            for _ in 0..2 {
                data.extend_from_slice(&[y, 0, 0, 255]);
            }
        }
        let frame = Frame::from_rgba(2, 4, data);
        let payload = encode_frame(&frame, Layout::default());

        // Upper pixel of pair 0 has r=0, of pair 1 has r=2.
        let first = payload.find("\x1b[48;2;0;0;0m").unwrap();
        let second = payload.find("\x1b[48;2;2;0;0m").unwrap();
        assert!(first < second);
    }

    #[test]
    fn alpha_policy_cases() {
        let opaque_a: Pixel = [10, 20, 30, 255];
        let opaque_b: Pixel = [40, 50, 60, 255];
        let clear: Pixel = [99, 99, 99, 0];

        let mut buf = String::new();
        push_cell_alpha(&mut buf, clear, clear);
        assert_eq!(buf, " ");

        buf.clear();
        push_cell_alpha(&mut buf, clear, opaque_b);
        assert_eq!(buf, format!("\x1b[38;2;40;50;60m{}", term::LOWER_HALF));

        buf.clear();
        push_cell_alpha(&mut buf, opaque_a, clear);
        assert_eq!(buf, format!("\x1b[48;2;10;20;30m{}", term::UPPER_HALF));

        buf.clear();
        push_cell_alpha(&mut buf, opaque_a, opaque_b);
        assert_eq!(
            buf,
            format!("\x1b[48;2;10;20;30m\x1b[38;2;40;50;60m{}", term::LOWER_HALF)
        );
    }
}
