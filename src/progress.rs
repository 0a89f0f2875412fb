//! In-place playback progress bar
//!
//! **Why**: Playback needs a position indicator that redraws a single fixed
//! screen line without disturbing the frame region above it. Fill resolution
//! is half a cell, drawn with half-block-family glyphs to match the frame
//! renderer's aesthetic.
//!
//! **Used by**: PlaybackController (set per frame, finish at drain)

use std::io::{self, Write};

use crate::term;

/// Full cell of fill.
const FILL: char = '█';
/// Fractional remainder below one half.
const HALF_LOW: char = '▖';
/// Fractional remainder at or above one half.
const HALF_HIGH: char = '▌';
/// Space between bar and label.
const SEPARATOR: &str = " ";

/// Fill for `current` out of `total` across `bar_width` cells:
/// full cells plus an optional half-fill glyph.
fn fill_cells(current: f64, total: f64, bar_width: usize) -> (usize, Option<char>) {
    if total <= 0.0 || bar_width == 0 {
        return (0, None);
    }
    let cells = (current / total).clamp(0.0, 1.0) * bar_width as f64;
    let full = cells.floor() as usize;
    if full >= bar_width {
        return (bar_width, None);
    }
    let rem = cells - full as f64;
    let half = if rem == 0.0 {
        None
    } else if rem < 0.5 {
        Some(HALF_LOW)
    } else {
        Some(HALF_HIGH)
    };
    (full, half)
}

fn format_clock(secs: f64, with_hours: bool) -> String {
    let t = secs.max(0.0) as u64;
    if with_hours {
        format!("{}:{:02}:{:02}", t / 3600, (t % 3600) / 60, t % 60)
    } else {
        format!("{}:{:02}", t / 60, t % 60)
    }
}

/// Single-line progress bar redrawn in place at a fixed screen position.
pub struct ProgressBar {
    row: usize,
    left: usize,
    total: f64,
    bar_width: usize,
    with_hours: bool,
    finished: bool,
}

impl ProgressBar {
    /// Lay out a bar on screen row `row` starting at column `left`, using at
    /// most `width` columns including the "elapsed / total" label. `total`
    /// is fixed for the bar's lifetime.
    pub fn new(row: usize, left: usize, width: usize, total: f64) -> Self {
        let with_hours = total >= 3600.0;
        // label is widest at the end: "total / total"
        let label_width = format_clock(total, with_hours).len() * 2 + 3;
        let bar_width = width.saturating_sub(label_width + SEPARATOR.len());

        Self { row, left, total, bar_width, with_hours, finished: false }
    }

    pub fn bar_width(&self) -> usize {
        self.bar_width
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The full escape line for a given position. Pure; `set` writes it.
    fn render(&self, current: f64) -> String {
        let (full, half) = fill_cells(current, self.total, self.bar_width);

        let mut line = String::new();
        term::push_cursor(&mut line, self.row, self.left);
        line.push_str(term::RESET);
        for _ in 0..full {
            line.push(FILL);
        }
        let mut drawn = full;
        if let Some(glyph) = half {
            line.push(glyph);
            drawn += 1;
        }
        for _ in drawn..self.bar_width {
            line.push(' ');
        }
        line.push_str(SEPARATOR);
        line.push_str(&format_clock(current.clamp(0.0, self.total), self.with_hours));
        line.push_str(" / ");
        line.push_str(&format_clock(self.total, self.with_hours));
        line
    }

    /// Draw the empty bar and label.
    pub fn init(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let line = self.render(0.0);
        out.write_all(line.as_bytes())?;
        out.flush()
    }

    /// Redraw the bar for an elapsed position (seconds). No-op once
    /// finished; a position at or past `total` finishes the bar.
    pub fn set(&mut self, current: f64, out: &mut dyn Write) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        let (full, _) = fill_cells(current, self.total, self.bar_width);
        if self.bar_width > 0 && full >= self.bar_width {
            return self.finish(out);
        }
        let line = self.render(current);
        out.write_all(line.as_bytes())?;
        out.flush()
    }

    /// Force the full-bar terminal state. Latches: later `set` calls no-op.
    pub fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let line = self.render(self.total);
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> ProgressBar {
        // width 31, total label "1:00 / 1:00" = 11 chars + separator -> 19 bar cells
        ProgressBar::new(5, 1, 31, 60.0)
    }

    #[test]
    fn bar_width_accounts_for_label() {
        let b = bar();
        assert_eq!(b.bar_width(), 19);
    }

    #[test]
    fn fill_never_exceeds_bar_width() {
        let b = bar();
        for tenth in 0..=70 {
            let line = b.render(tenth as f64 * 1.0);
            let fill = line.matches([FILL, HALF_LOW, HALF_HIGH]).count();
            assert!(fill <= b.bar_width(), "fill {} at {}s", fill, tenth);
        }
    }

    #[test]
    fn half_cell_glyph_selection() {
        // 19 cells over 60s: one cell is ~3.158s, so 1.0s is rem ~0.32 and
        // 2.0s is rem ~0.63 of the first cell.
        assert_eq!(fill_cells(1.0, 60.0, 19), (0, Some(HALF_LOW)));
        assert_eq!(fill_cells(2.0, 60.0, 19), (0, Some(HALF_HIGH)));
        assert_eq!(fill_cells(0.0, 60.0, 19), (0, None));
        assert_eq!(fill_cells(60.0, 60.0, 19), (19, None));
    }

    #[test]
    fn set_total_is_finish() {
        let mut b = bar();
        let mut out: Vec<u8> = Vec::new();
        b.set(60.0, &mut out).unwrap();
        assert!(b.is_finished());

        let full_line = String::from_utf8(out).unwrap();
        assert_eq!(full_line.matches(FILL).count(), b.bar_width());
    }

    #[test]
    fn finished_bar_ignores_further_sets() {
        let mut b = bar();
        let mut out: Vec<u8> = Vec::new();
        b.finish(&mut out).unwrap();
        let len = out.len();

        b.set(10.0, &mut out).unwrap();
        b.finish(&mut out).unwrap();
        assert_eq!(out.len(), len, "finished bar must not redraw");
    }

    #[test]
    fn label_tracks_position() {
        let b = bar();
        let line = b.render(32.0);
        assert!(line.ends_with("0:32 / 1:00"), "got {:?}", line);
        assert!(line.starts_with("\x1b[5;1H"));
    }

    #[test]
    fn hour_long_totals_use_hour_clock() {
        let b = ProgressBar::new(1, 1, 60, 4000.0);
        let line = b.render(65.0);
        assert!(line.ends_with("0:01:05 / 1:06:40"), "got {:?}", line);
    }
}
