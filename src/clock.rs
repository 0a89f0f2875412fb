//! Playback clocks
//!
//! **Why**: The renderer is the authority on elapsed playback time (it knows
//! when a frame actually hit the terminal), but the producer needs to read
//! that time for its pacing and skip decisions. A single-writer atomic makes
//! the cross-thread handoff explicit; a stale read only makes one skip
//! decision slightly suboptimal.
//!
//! **Used by**: Renderer (store), PlaybackController (load, skip heuristic)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Virtual playback clock: wall-clock time elapsed since playback start,
/// published by the renderer after each terminal write.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    micros: Arc<AtomicU64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer side: publish elapsed time.
    pub fn store(&self, elapsed: Duration) {
        self.micros.store(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Producer side: elapsed seconds since playback start.
    pub fn seconds(&self) -> f64 {
        self.micros.load(Ordering::Relaxed) as f64 / 1e6
    }
}

/// Optional external audio clock.
///
/// Only timestamps are consumed; the controller waits for the first positive
/// position before starting the playback clock so audio and video begin
/// together. Audio decoding itself lives outside this crate.
pub trait AudioClock: Send {
    /// Current audio playback position, `None` until the backend has
    /// produced its first timestamped frame.
    fn position(&self) -> Option<Duration>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_round_trips_micros() {
        let clock = VirtualClock::new();
        assert_eq!(clock.seconds(), 0.0);
        clock.store(Duration::from_millis(2500));
        assert!((clock.seconds() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn clones_share_the_same_clock() {
        let clock = VirtualClock::new();
        let reader = clock.clone();
        clock.store(Duration::from_secs(3));
        assert_eq!(reader.seconds(), 3.0);
    }
}
