//! Playback controller: timing, skipping, and pipeline orchestration
//!
//! **Why**: Keeping on-screen motion locked to elapsed time is the whole
//! point of the player. The controller runs INIT → STREAMING → DRAINING →
//! DONE: it decodes, fits and encodes frames on its own thread, hands
//! payloads to the renderer through the capacity-1 slot, and per frame
//! either sleeps (ahead of real time) or seeks the source forward (behind).
//!
//! **Used by**: main (video dispatch)
//!
//! # Timing model
//!
//! `source_time = frame_index / fps` against the renderer's virtual clock.
//! Ahead: sleep one frame interval (skipped entirely in `--fast` mode).
//! Behind: seek forward by `floor(virtual · fps) − index` frames, a lossy
//! catch-up that never decodes the skipped frames.
//!
//! # Teardown
//!
//! DRAINING is identical for exhaustion, decode failure and interrupt:
//! disconnect the slot, join the renderer, restore the terminal. The
//! restore guard is idempotent and runs before any error is re-raised.

use std::sync::PoisonError;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::{debug, info};

use crate::clock::{AudioClock, VirtualClock};
use crate::encode::{self, Layout};
use crate::handoff::{self, SlotProducer};
use crate::interrupt::CancelToken;
use crate::progress::ProgressBar;
use crate::renderer::{self, SharedOut};
use crate::resize::{self, Interpolation};
use crate::source::FrameSource;
use crate::still::{self, Paddings};
use crate::term::{self, TermGuard};

/// Poll interval while waiting for the audio backend's first timestamp.
const AUDIO_POLL: Duration = Duration::from_millis(10);
/// Give-up bound so a silent audio backend cannot stall INIT.
const AUDIO_WAIT_MAX: Duration = Duration::from_secs(2);

/// Frames to seek past when playback is behind real time.
///
/// `floor(virtual · fps − index)`, clamped at zero. With fps 30, a source at
/// index 60 (2.0 s) and a virtual clock at 2.5 s this is 15.
pub fn frames_to_skip(virtual_secs: f64, fps: f64, current_index: u64) -> u64 {
    let skip = (virtual_secs * fps - current_index as f64).floor();
    if skip > 0.0 { skip as u64 } else { 0 }
}

/// Playback parameters from the CLI surface.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Maximum frame width in terminal columns.
    pub width_limit: usize,
    /// Maximum frame height in lines of blocks (half the pixel rows).
    pub height_limit: usize,
    pub paddings: Paddings,
    pub interpolation: Interpolation,
    /// Ignore frame-rate pacing; never sleep between frames.
    pub fast: bool,
}

pub struct Player<S: FrameSource> {
    source: S,
    config: PlayerConfig,
    audio: Option<Box<dyn AudioClock>>,
    cancel: CancelToken,
    out: SharedOut,
}

impl<S: FrameSource> Player<S> {
    pub fn new(source: S, config: PlayerConfig, out: SharedOut) -> Self {
        Self {
            source,
            config,
            audio: None,
            cancel: CancelToken::new(),
            out,
        }
    }

    /// Inject an external audio clock; playback start waits for its first
    /// positive timestamp so audio and video begin together.
    pub fn with_audio(mut self, audio: Box<dyn AudioClock>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run playback to completion, interrupt or error.
    pub fn run(mut self) -> Result<()> {
        let fps = self.source.frame_rate();
        if !(fps > 0.0) {
            bail!("source reports invalid frame rate {}", fps);
        }
        let count = self.source.frame_count();
        let total_secs = count as f64 / fps;

        // A one-frame source is a still image; no pipeline, no timing.
        if count == 1 {
            return self.render_still();
        }

        self.check_dimensions()?;

        let pads = self.config.paddings;
        let layout = Layout { top: pads.begin + 1, left: pads.left + 1 };
        let progress_row = layout.top + self.config.height_limit;
        let park_row = progress_row + 1 + pads.end;

        {
            let mut w = self.out.lock().unwrap_or_else(PoisonError::into_inner);
            term::prepare(&mut **w).context("preparing terminal")?;
        }
        let mut guard = TermGuard::new(park_row);

        let mut progress =
            ProgressBar::new(progress_row, layout.left, self.config.width_limit, total_secs);
        {
            let mut w = self.out.lock().unwrap_or_else(PoisonError::into_inner);
            progress.init(&mut **w).context("drawing progress bar")?;
        }

        if let Some(audio) = self.audio.take() {
            wait_for_audio(&*audio);
        }

        let clock = VirtualClock::new();
        let (producer, consumer) = handoff::slot();
        let start = Instant::now();
        let render_handle = renderer::spawn(consumer, clock.clone(), start, self.out.clone());
        info!("playback start: {} frames at {} fps ({:.1}s)", count, fps, total_secs);

        let streamed = self.stream(fps, count, layout, &clock, &producer, &mut progress);

        // DRAINING: disconnect, join, restore. Runs on every path.
        drop(producer);
        render_handle.join().ok();
        if matches!(streamed, Ok(true)) {
            let mut w = self.out.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = progress.finish(&mut **w);
        }
        {
            let mut w = self.out.lock().unwrap_or_else(PoisonError::into_inner);
            guard.restore(&mut **w);
        }

        streamed.map(|_| ())
    }

    /// STREAMING state. Returns `Ok(true)` when the source was exhausted,
    /// `Ok(false)` on interrupt, `Err` on a mid-stream decode failure.
    fn stream(
        &mut self,
        fps: f64,
        count: u64,
        layout: Layout,
        clock: &VirtualClock,
        producer: &SlotProducer<String>,
        progress: &mut ProgressBar,
    ) -> Result<bool> {
        let frame_interval = Duration::from_secs_f64(1.0 / fps);

        loop {
            if self.cancel.is_cancelled() {
                info!("playback interrupted");
                return Ok(false);
            }

            let Some(frame) = self.source.next_frame().context("decoding frame")? else {
                debug!("source exhausted");
                return Ok(true);
            };

            let target = resize::fit(
                frame.width(),
                frame.height(),
                self.config.width_limit,
                self.config.height_limit,
            );
            let frame = resize::resize_frame(frame, target, self.config.interpolation);
            let payload = encode::encode_frame(&frame, layout);

            // Back-pressure: blocks while the previous frame is pending.
            if producer.put(payload).is_err() {
                debug!("renderer gone, stopping stream");
                return Ok(false);
            }

            let index = self.source.position();
            let source_time = index as f64 / fps;
            let virtual_time = clock.seconds();

            if virtual_time < source_time {
                if !self.config.fast {
                    thread::sleep(frame_interval);
                }
            } else {
                let skip = frames_to_skip(virtual_time, fps, index);
                if skip > 0 {
                    let to = (index + skip).min(count);
                    debug!(
                        "behind by {:.3}s, skipping {} frame(s) to {}",
                        virtual_time - source_time,
                        skip,
                        to
                    );
                    self.source.seek_to_frame(to).context("seeking to catch up")?;
                }
            }

            let mut w = self.out.lock().unwrap_or_else(PoisonError::into_inner);
            progress.set(source_time, &mut **w).ok();
        }
    }

    /// One-frame bypass: fit and print through the alpha-aware still path.
    fn render_still(&mut self) -> Result<()> {
        let frame = self
            .source
            .next_frame()
            .context("decoding frame")?
            .context("source reported one frame but produced none")?;
        let target = resize::fit(
            frame.width(),
            frame.height(),
            self.config.width_limit,
            self.config.height_limit,
        );
        let frame = resize::resize_frame(frame, target, self.config.interpolation);

        let mut w = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        still::display(&frame, self.config.paddings, &mut **w).context("writing image")?;
        Ok(())
    }

    /// InvalidDimensions pre-flight: fail before any terminal state changes.
    fn check_dimensions(&self) -> Result<()> {
        let cfg = &self.config;
        if cfg.width_limit == 0 || cfg.height_limit == 0 {
            bail!("height/width limits must be positive");
        }
        let (cols, rows) = term::size();
        let need_cols = cfg.width_limit + cfg.paddings.left;
        // frame rows + paddings + one progress line
        let need_rows = cfg.height_limit + cfg.paddings.begin + cfg.paddings.end + 1;
        if need_cols > cols || need_rows > rows {
            bail!(
                "requested {}x{} (plus padding) exceeds terminal {}x{}",
                cfg.width_limit,
                cfg.height_limit,
                cols,
                rows
            );
        }
        Ok(())
    }
}

/// Poll the audio clock until its first positive timestamp (bounded).
fn wait_for_audio(audio: &dyn AudioClock) {
    let deadline = Instant::now() + AUDIO_WAIT_MAX;
    loop {
        match audio.position() {
            Some(pos) if pos > Duration::ZERO => {
                debug!("audio clock live at {:?}", pos);
                return;
            }
            _ => {}
        }
        if Instant::now() >= deadline {
            debug!("audio clock silent for {:?}, starting without it", AUDIO_WAIT_MAX);
            return;
        }
        thread::sleep(AUDIO_POLL);
    }
}
