//! Renderer thread: drains the handoff slot into the terminal
//!
//! **Why**: Terminal writes are the slowest, most variable stage; running
//! them on their own thread lets encoding overlap with output, and writing
//! here is what defines "this frame is on screen", so this thread owns the
//! virtual clock.
//!
//! **Used by**: PlaybackController (spawn/join around STREAMING)
//!
//! The bounded take keeps the thread responsive to shutdown: slot disconnect
//! is observed within [`TAKE_TIMEOUT`] even when no frames arrive. Write
//! failures are logged, never propagated across the thread boundary.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::clock::VirtualClock;
use crate::encode::EncodedPayload;
use crate::handoff::{SlotConsumer, Take};

/// Output handle shared between the renderer (frames) and the controller
/// (progress bar, teardown).
pub type SharedOut = Arc<Mutex<Box<dyn Write + Send>>>;

/// Wrap a writer for cross-thread use.
pub fn shared_out(w: Box<dyn Write + Send>) -> SharedOut {
    Arc::new(Mutex::new(w))
}

/// Bounded wait per take; purely a responsiveness bound for shutdown, not a
/// frame-drop timeout.
pub const TAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// Consumer loop. Returns when the producer side disconnects.
pub fn run(consumer: SlotConsumer<EncodedPayload>, clock: VirtualClock, start: Instant, out: SharedOut) {
    let mut written = 0u64;
    loop {
        match consumer.take_timeout(TAKE_TIMEOUT) {
            Take::Item(payload) => {
                {
                    let mut w = out.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(e) = w.write_all(payload.as_bytes()).and_then(|_| w.flush()) {
                        warn!("frame write failed: {}", e);
                    }
                }
                clock.store(start.elapsed());
                written += 1;
            }
            Take::Timeout => continue,
            Take::Closed => break,
        }
    }
    debug!("renderer exiting after {} frame(s)", written);
}

/// Spawn the renderer on a named thread.
pub fn spawn(
    consumer: SlotConsumer<EncodedPayload>,
    clock: VirtualClock,
    start: Instant,
    out: SharedOut,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("termvid-render".into())
        .spawn(move || run(consumer, clock, start, out))
        .expect("failed to spawn renderer thread")
}
