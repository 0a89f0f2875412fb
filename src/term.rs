//! Terminal escape protocol and screen lifecycle
//!
//! **Why**: The renderer speaks raw ANSI: absolute cursor positioning plus
//! SGR truecolor, one half-block glyph per cell. Keeping the byte-level
//! protocol in one place lets the encoder and the progress bar share it.
//!
//! **Used by**: encode (cell escapes), progress (bar redraw),
//! player (screen setup/teardown), still (padding output)
//!
//! # Wire format
//!
//! - cursor: `ESC[{row};{col}H` (1-based)
//! - fg color: `ESC[38;2;{r};{g};{b}m`
//! - bg color: `ESC[48;2;{r};{g};{b}m`
//! - reset: `ESC[0m`, clear: `ESC[2J`, cursor hide/show: `ESC[?25l`/`ESC[?25h`

use std::fmt::Write as _;
use std::io::{self, Write};

use log::debug;

pub const RESET: &str = "\x1b[0m";
pub const CLEAR: &str = "\x1b[2J";
pub const CURSOR_HIDE: &str = "\x1b[?25l";
pub const CURSOR_SHOW: &str = "\x1b[?25h";

/// Lower half block: bg paints the upper pixel, fg the lower.
pub const LOWER_HALF: char = '▄';
/// Upper half block, used when only the lower pixel is transparent.
pub const UPPER_HALF: char = '▀';

/// Append an absolute cursor move (1-based row/col).
#[inline]
pub fn push_cursor(buf: &mut String, row: usize, col: usize) {
    let _ = write!(buf, "\x1b[{};{}H", row, col);
}

/// Append a truecolor foreground escape.
#[inline]
pub fn push_fg(buf: &mut String, r: u8, g: u8, b: u8) {
    let _ = write!(buf, "\x1b[38;2;{};{};{}m", r, g, b);
}

/// Append a truecolor background escape.
#[inline]
pub fn push_bg(buf: &mut String, r: u8, g: u8, b: u8) {
    let _ = write!(buf, "\x1b[48;2;{};{};{}m", r, g, b);
}

/// Terminal size in (columns, rows). Falls back to 80x24 when the terminal
/// cannot be queried (pipes, CI).
pub fn size() -> (usize, usize) {
    match crossterm::terminal::size() {
        Ok((cols, rows)) => (cols as usize, rows as usize),
        Err(e) => {
            debug!("terminal size query failed ({}), assuming 80x24", e);
            (80, 24)
        }
    }
}

/// Clear the screen and hide the cursor before playback.
pub fn prepare(out: &mut dyn Write) -> io::Result<()> {
    out.write_all(CLEAR.as_bytes())?;
    out.write_all(CURSOR_HIDE.as_bytes())?;
    out.flush()
}

/// Idempotent terminal restore.
///
/// Playback must always leave the terminal usable: colors reset, cursor
/// visible and parked below the rendered region. `restore()` runs at most
/// once no matter how often it is called, and the `Drop` impl is the
/// backstop for error and interrupt paths.
pub struct TermGuard {
    /// Row to park the cursor on when restoring (1-based).
    park_row: usize,
    restored: bool,
}

impl TermGuard {
    pub fn new(park_row: usize) -> Self {
        Self { park_row, restored: false }
    }

    /// Restore colors and cursor. Safe to call repeatedly.
    pub fn restore(&mut self, out: &mut dyn Write) {
        if self.restored {
            return;
        }
        self.restored = true;

        let mut seq = String::new();
        seq.push_str(RESET);
        push_cursor(&mut seq, self.park_row, 1);
        seq.push_str(CURSOR_SHOW);
        let _ = out.write_all(seq.as_bytes());
        let _ = out.flush();
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        if !self.restored {
            let mut stdout = io::stdout();
            self.restore(&mut stdout);
        }
    }
}
