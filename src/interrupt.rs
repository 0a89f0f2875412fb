//! Cancellation token wired to SIGINT/SIGTERM
//!
//! **Why**: Ctrl-C during playback must stop the streaming loop and still
//! run the terminal restore. The signal thread only sets an atomic flag; the
//! controller checks it once per frame, so teardown happens on the playback
//! thread where the guard lives.
//!
//! **Used by**: main (installation), PlaybackController (per-frame check)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Cheap to clone, checked per frame.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Install SIGINT/SIGTERM handling on a named signal thread.
///
/// The thread lives for the rest of the process; it parks inside
/// signal-hook's iterator and costs nothing while idle.
#[cfg(unix)]
pub fn install(token: CancelToken) {
    use log::{debug, warn};
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(s) => s,
        Err(e) => {
            warn!("signal handler install failed ({}), Ctrl-C will hard-exit", e);
            return;
        }
    };

    let spawned = std::thread::Builder::new()
        .name("termvid-signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                debug!("signal {} received, cancelling playback", signal);
                token.cancel();
            }
        });
    if let Err(e) = spawned {
        warn!("signal thread spawn failed: {}", e);
    }
}

#[cfg(not(unix))]
pub fn install(_token: CancelToken) {}
