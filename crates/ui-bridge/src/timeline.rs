//! Key-frame playback on the UI thread.
//!
//! A [`Timeline`] re-arms itself with [`UiExecutor::post_delayed`] after each
//! batch of due frames, so it works with any executor that honours delays.
//! A [`StopHandle`] ends playback early.

use std::{
    collections::VecDeque,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use tracing::trace;

use crate::{
    error::Result,
    executor::{UiExecutor, UiTask},
};

/// Stops a playing [`Timeline`].
///
/// Frames not yet run and the finish action are dropped; a frame already
/// running completes.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(
    /// Set once stopped.
    Arc<AtomicBool>,
);

impl StopHandle {
    /// A handle that has not been stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop playback. Safe to call from any thread, any number of times.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Actions scheduled at offsets from the moment playback starts.
#[derive(Default)]
pub struct Timeline {
    /// Frames in insertion order; sorted by offset when played.
    frames: Vec<(Duration, UiTask)>,
    /// Minimum total duration; the finish action never runs earlier.
    duration: Duration,
    /// Runs once, after every frame.
    on_finished: Option<UiTask>,
    /// Checked before every frame.
    stop: StopHandle,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("frames", &self.frames.len())
            .field("duration", &self.duration())
            .finish()
    }
}

impl Timeline {
    /// An empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action at `at` from the start of playback.
    #[must_use]
    pub fn key_frame(mut self, at: Duration, action: impl FnOnce() + Send + 'static) -> Self {
        self.frames.push((at, Box::new(action)));
        self
    }

    /// Stretch the timeline to at least `duration`.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the action run after the last frame.
    #[must_use]
    pub fn on_finished(mut self, action: impl FnOnce() + Send + 'static) -> Self {
        self.on_finished = Some(Box::new(action));
        self
    }

    /// Let `handle` stop playback.
    #[must_use]
    pub fn stopped_by(mut self, handle: StopHandle) -> Self {
        self.stop = handle;
        self
    }

    /// Number of key frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if there are no key frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total play time: the later of the last frame and the explicit duration.
    pub fn duration(&self) -> Duration {
        self.frames
            .iter()
            .map(|(at, _)| *at)
            .max()
            .unwrap_or_default()
            .max(self.duration)
    }

    /// Start playback on the UI thread.
    ///
    /// Frames with equal offsets run in insertion order. If the executor
    /// stops accepting work mid-way the remaining frames and the finish
    /// action are dropped and the failure is reported as uncaught.
    pub fn play(self, executor: Arc<dyn UiExecutor>) -> Result<()> {
        let end = self.duration();
        let mut frames = self.frames;
        frames.sort_by_key(|(at, _)| *at);
        trace!(frames = frames.len(), end_ms = end.as_millis(), "timeline_play");
        let player = Player {
            frames: frames.into(),
            end,
            on_finished: self.on_finished,
            executor: executor.clone(),
            start: None,
            stop: self.stop,
        };
        executor.post(Box::new(move || player.step()))
    }
}

/// Playback state carried from step to step.
struct Player {
    /// Frames not yet run, earliest first.
    frames: VecDeque<(Duration, UiTask)>,
    /// When the finish action becomes due.
    end: Duration,
    /// Finish action, if not yet run.
    on_finished: Option<UiTask>,
    /// Where to schedule the next step.
    executor: Arc<dyn UiExecutor>,
    /// Set by the first step.
    start: Option<Instant>,
    /// Ends playback when set.
    stop: StopHandle,
}

impl Player {
    /// Run everything due, then re-arm for the next deadline.
    fn step(mut self) {
        let start = *self.start.get_or_insert_with(Instant::now);
        let elapsed = start.elapsed();
        while self.frames.front().is_some_and(|(at, _)| *at <= elapsed) {
            if self.stop.is_stopped() {
                break;
            }
            if let Some((_, action)) = self.frames.pop_front() {
                action();
            }
        }
        if self.stop.is_stopped() {
            trace!(dropped = self.frames.len(), "timeline_stopped");
            return;
        }

        let next = self.frames.front().map_or(self.end, |(at, _)| *at);
        if self.frames.is_empty() && next <= elapsed {
            if let Some(done) = self.on_finished.take() {
                done();
            }
            return;
        }

        let delay = next.saturating_sub(start.elapsed());
        let executor = self.executor.clone();
        if let Err(e) = executor.post_delayed(delay, Box::new(move || self.step())) {
            executor.report_uncaught(&e);
        }
    }
}
