//! TERMVID - terminal video and image player
//!
//! Renders frames as truecolor half-block glyphs, two pixels per cell.
//! Sequences play through a two-thread pipeline (encode producer, terminal
//! renderer) joined by a capacity-1 handoff and paced against a virtual
//! playback clock; single images print through the alpha-aware still path.

pub mod cli;
pub mod clock;
pub mod encode;
pub mod frame;
pub mod handoff;
pub mod interrupt;
pub mod player;
pub mod progress;
pub mod renderer;
pub mod resize;
pub mod source;
pub mod still;
pub mod term;

pub use clock::{AudioClock, VirtualClock};
pub use frame::{Frame, Pixel, SourceError};
pub use interrupt::CancelToken;
pub use player::{Player, PlayerConfig};
pub use source::{FrameSource, SequenceSource};
