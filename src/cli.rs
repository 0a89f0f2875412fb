use clap::Parser;

use crate::resize::Interpolation;
use crate::term;

/// Terminal video and image player (truecolor half blocks)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to an image file, a directory of images, or a glob pattern /
    /// numbered frame of an image sequence
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Maximum number of lines of blocks (default: terminal height minus
    /// paddings and the progress line)
    #[arg(short = 'H', long = "height-limit", value_name = "N")]
    pub height_limit: Option<usize>,

    /// Maximum number of blocks per line (default: terminal width minus
    /// left padding)
    #[arg(short = 'W', long = "width-limit", value_name = "N")]
    pub width_limit: Option<usize>,

    /// Empty lines before the image
    #[arg(short = 'b', long = "begin-padding", value_name = "N", default_value_t = 1)]
    pub begin_padding: usize,

    /// Empty lines after the image
    #[arg(short = 'e', long = "end-padding", value_name = "N", default_value_t = 0)]
    pub end_padding: usize,

    /// Empty columns at the start of each image line
    #[arg(short = 'l', long = "left-padding", value_name = "N", default_value_t = 1)]
    pub left_padding: usize,

    /// Interpolation filter for the fit step
    #[arg(long = "filter", value_enum, default_value = "triangle")]
    pub filter: Interpolation,

    /// Playback rate for image sequences (images carry no rate metadata)
    #[arg(long = "fps", value_name = "FPS", default_value_t = 24.0)]
    pub fps: f64,

    /// Play as fast as possible, ignoring frame-rate pacing
    #[arg(long = "fast")]
    pub fast: bool,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Args {
    /// Effective (width, height) limits; defaults derive from the terminal
    /// minus paddings, keeping one line free for the progress bar.
    pub fn limits(&self) -> (usize, usize) {
        let (cols, rows) = term::size();
        let width = self
            .width_limit
            .unwrap_or_else(|| cols.saturating_sub(self.left_padding).max(1));
        let height = self.height_limit.unwrap_or_else(|| {
            rows.saturating_sub(self.begin_padding + self.end_padding + 1)
                .max(1)
        });
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_tool() {
        let args = Args::parse_from(["termvid", "clip.0001.png"]);
        assert_eq!(args.begin_padding, 1);
        assert_eq!(args.end_padding, 0);
        assert_eq!(args.left_padding, 1);
        assert_eq!(args.fps, 24.0);
        assert_eq!(args.filter, Interpolation::Triangle);
        assert!(!args.fast);
    }

    #[test]
    fn explicit_limits_win_over_terminal() {
        let args = Args::parse_from(["termvid", "x.png", "-H", "20", "-W", "64"]);
        assert_eq!(args.limits(), (64, 20));
    }
}
