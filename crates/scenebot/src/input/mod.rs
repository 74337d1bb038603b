//! Keyboard and pointer simulation.
//!
//! Key state lives on the UI thread. Every operation queues its UI work
//! through the bridge in call order and finishes with a drain, so when a
//! method returns all reactions to the input have run. Failures from queued
//! work are collected and returned after the drain.

mod held;
mod motion;

use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{self as chan, RecvTimeoutError};
use parking_lot::Mutex;
use scene_keycode::{Key, ModifierFlags};
use tracing::{debug, trace, warn};
use ui_bridge::{Error as BridgeError, StopHandle, ThreadBridge, Timeline, UiConfined};

pub use self::held::HeldKeys;
use self::motion::{glide_frames, glide_seconds};
use crate::{
    config::RobotConfig,
    error::{Error, Result},
    geom::Point,
    toolkit::{
        InjectError, InputInjector, KeyEvent, KeyTarget, Motion, MouseButton, SceneGraph,
        WindowId,
    },
};

/// First failure raised by the queued tasks of one operation.
#[derive(Clone, Default)]
struct Batch {
    /// Empty until something fails.
    failure: Arc<Mutex<Option<Error>>>,
}

impl Batch {
    /// Keep the first failure, log the rest.
    fn record(&self, error: Error) {
        let mut slot = self.failure.lock();
        if slot.is_some() {
            warn!(%error, "input_failure_suppressed");
        } else {
            *slot = Some(error);
        }
    }

    /// The first failure, if any.
    fn finish(self) -> Result<()> {
        match self.failure.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Low-level input state machine shared by the robot's capability traits.
#[derive(Clone)]
pub struct InputEngine {
    /// Route to the UI thread.
    bridge: ThreadBridge,
    /// Focus lookup and structured key dispatch.
    scene: Arc<dyn SceneGraph>,
    /// Physical input primitive.
    injector: Arc<dyn InputInjector>,
    /// Keys pressed through this engine.
    held: Arc<UiConfined<HeldKeys>>,
    /// Glide speed and bounds.
    config: Arc<RobotConfig>,
}

impl InputEngine {
    /// Build an engine with empty key state.
    pub fn new(
        bridge: ThreadBridge,
        scene: Arc<dyn SceneGraph>,
        injector: Arc<dyn InputInjector>,
        config: Arc<RobotConfig>,
    ) -> Self {
        let held = Arc::new(UiConfined::new(
            "held keys",
            bridge.executor().clone(),
            HeldKeys::default(),
        ));
        Self {
            bridge,
            scene,
            injector,
            held,
            config,
        }
    }

    /// Queue `op` behind earlier work, or run it now on the UI thread.
    fn submit(
        &self,
        batch: &Batch,
        op: impl FnOnce() -> Result<()> + Send + 'static,
    ) -> Result<()> {
        let batch = batch.clone();
        let task = move || {
            if let Err(e) = op() {
                batch.record(e);
            }
        };
        if self.bridge.is_ui_thread() {
            task();
            return Ok(());
        }
        self.bridge.run_async(task)?;
        Ok(())
    }

    /// Drain the UI thread, then surface the batch's first failure.
    fn settle(&self, batch: Batch) -> Result<()> {
        self.bridge.drain()?;
        batch.finish()
    }

    /// Inject a key press and mark the key held.
    fn key_down_task(&self, key: Key) -> impl FnOnce() -> Result<()> + Send + 'static {
        let injector = self.injector.clone();
        let held = self.held.clone();
        move || {
            injector.key_down(key)?;
            held.with(|h| h.insert(key))?;
            trace!(key = ?key, "key_pressed");
            Ok(())
        }
    }

    /// Inject a key release and mark the key free.
    fn key_up_task(&self, key: Key) -> impl FnOnce() -> Result<()> + Send + 'static {
        let injector = self.injector.clone();
        let held = self.held.clone();
        move || {
            injector.key_up(key)?;
            held.with(|h| h.remove(key))?;
            trace!(key = ?key, "key_released");
            Ok(())
        }
    }

    /// Press `keys` in order and keep them held.
    pub fn press(&self, keys: &[Key]) -> Result<()> {
        let batch = Batch::default();
        for &key in keys {
            self.submit(&batch, self.key_down_task(key))?;
        }
        self.settle(batch)
    }

    /// Release `keys` in order; with no keys, release everything held.
    ///
    /// The release-all set is read on the UI thread when the call is made,
    /// after every earlier queued press or release has run.
    pub fn release(&self, keys: &[Key]) -> Result<()> {
        let keys = if keys.is_empty() {
            let held = self.held.clone();
            self.bridge.run_blocking(move || held.with(|h| h.snapshot()))??
        } else {
            keys.to_vec()
        };
        debug!(keys = ?keys, "release");
        let batch = Batch::default();
        for key in keys {
            self.submit(&batch, self.key_up_task(key))?;
        }
        self.settle(batch)
    }

    /// Press `keys` in order, then release them in reverse.
    pub fn push(&self, keys: &[Key]) -> Result<()> {
        let batch = Batch::default();
        for &key in keys {
            self.submit(&batch, self.key_down_task(key))?;
        }
        for &key in keys.iter().rev() {
            self.submit(&batch, self.key_up_task(key))?;
        }
        self.settle(batch)
    }

    /// Type `text` into the focus owner of the focused window.
    ///
    /// Each character becomes a pressed/typed/released triple; only the typed
    /// event carries the character. The window is resolved once, the target
    /// node each time an event is dispatched. `delay` is slept on the calling
    /// thread after every character.
    pub fn type_text(&self, text: &str, delay: Duration) -> Result<()> {
        let scene = self.scene.clone();
        let window = self
            .bridge
            .run_blocking(move || scene.focused_window())?
            .ok_or(Error::NoFocusedWindow)?;
        debug!(%window, chars = text.chars().count(), "type_text");
        let batch = Batch::default();
        for ch in text.chars() {
            self.submit(&batch, self.type_char_task(window, ch))?;
            if !delay.is_zero() {
                if self.bridge.is_ui_thread() {
                    trace!("type_delay_skipped_on_ui_thread");
                } else {
                    pause(delay);
                }
            }
        }
        self.settle(batch)
    }

    /// Dispatch the pressed/typed/released triple for `ch`.
    fn type_char_task(
        &self,
        window: WindowId,
        ch: char,
    ) -> impl FnOnce() -> Result<()> + Send + 'static {
        let scene = self.scene.clone();
        let held = self.held.clone();
        move || {
            let modifiers = held.with(|h| h.modifiers())?;
            for event in [
                KeyEvent::pressed(Key::Undefined, modifiers),
                KeyEvent::typed(ch, modifiers),
                KeyEvent::released(Key::Undefined, modifiers),
            ] {
                let target = scene
                    .focus_owner(window)
                    .map_or(KeyTarget::Scene(window), KeyTarget::Node);
                scene.dispatch_key(target, &event);
            }
            Ok(())
        }
    }

    /// Move the pointer to `to`.
    ///
    /// [`Motion::StraightLine`] glides there off the UI thread and blocks
    /// until the glide completes; on the UI thread it jumps like
    /// [`Motion::Direct`]. Either way the pointer ends exactly on `to`,
    /// unless the glide fails with [`Error::Timeout`]: refused up front when
    /// it would outlast `motion_timeout`, or stopped where it was on overrun.
    pub fn move_to(&self, to: Point, motion: Motion) -> Result<()> {
        if motion == Motion::StraightLine && !self.bridge.is_ui_thread() {
            self.glide_to(to)?;
        } else {
            let injector = self.injector.clone();
            self.bridge.run_blocking(move || injector.mouse_move(to))??;
        }
        self.bridge.drain()?;
        Ok(())
    }

    /// Play a glide timeline on the UI thread and wait for it to finish.
    ///
    /// A glide that cannot finish within `motion_timeout` is refused before
    /// anything moves. One that overruns is stopped, so no frame lands after
    /// the caller has seen the timeout.
    fn glide_to(&self, to: Point) -> Result<()> {
        const WHAT: &str = "pointer glide";
        let timeout = self.config.motion_timeout();
        let from = self.mouse_position()?;
        let seconds = glide_seconds(from, to, self.config.motion_pixels_per_second);
        if !(0.0..=timeout.as_secs_f64()).contains(&seconds) {
            debug!(?from, ?to, seconds, "glide_refused");
            return Err(Error::Timeout {
                what: WHAT,
                after: Duration::ZERO,
            });
        }

        let (tx, rx) = chan::bounded::<Result<()>>(1);
        let stop = StopHandle::new();
        let injector = self.injector.clone();
        let executor = self.bridge.executor().clone();
        let player = executor.clone();
        let frames = glide_frames(from, to, seconds, self.config.motion_step());
        let stopper = stop.clone();
        executor.post(Box::new(move || {
            debug!(?from, ?to, frames = frames.len(), "glide_start");
            let failure: Arc<Mutex<Option<InjectError>>> = Arc::new(Mutex::new(None));
            let mut timeline = Timeline::new().stopped_by(stopper);
            for (at, point) in frames {
                let injector = injector.clone();
                let failure = failure.clone();
                timeline = timeline.key_frame(at, move || {
                    if let Err(e) = injector.mouse_move(point) {
                        failure.lock().get_or_insert(e);
                    }
                });
            }
            let finisher = injector.clone();
            let finished_tx = tx.clone();
            let timeline = timeline.on_finished(move || {
                // Always land exactly on the target.
                let last = finisher.mouse_move(to);
                let first = failure.lock().take();
                deliver(
                    &finished_tx,
                    match first {
                        Some(e) => Err(e.into()),
                        None => last.map_err(Error::from),
                    },
                );
            });
            if let Err(e) = timeline.play(player) {
                deliver(&tx, Err(e.into()));
            }
        }))?;

        match rx.recv_timeout(timeout) {
            Ok(r) => r,
            Err(RecvTimeoutError::Timeout) => {
                stop.stop();
                warn!(?to, timeout_ms = timeout.as_millis(), "glide_stopped");
                Err(Error::Timeout {
                    what: WHAT,
                    after: timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Closed.into()),
        }
    }

    /// Click `buttons` at the current pointer position; no buttons means
    /// [`MouseButton::Primary`].
    pub fn click(&self, buttons: &[MouseButton]) -> Result<()> {
        let buttons = if buttons.is_empty() {
            vec![MouseButton::Primary]
        } else {
            buttons.to_vec()
        };
        let injector = self.injector.clone();
        self.bridge.run_blocking(move || injector.mouse_click(&buttons))??;
        self.bridge.drain()?;
        Ok(())
    }

    /// Current pointer position.
    pub fn mouse_position(&self) -> Result<Point> {
        let injector = self.injector.clone();
        Ok(self.bridge.run_blocking(move || injector.mouse_position())??)
    }

    /// Keys currently held, in press order.
    pub fn held_keys(&self) -> Result<Vec<Key>> {
        let held = self.held.clone();
        Ok(self.bridge.run_blocking(move || held.with(|h| h.snapshot()))??)
    }

    /// Modifier flags stamped on the next synthesized key event.
    pub fn modifiers(&self) -> Result<ModifierFlags> {
        let held = self.held.clone();
        Ok(self.bridge.run_blocking(move || held.with(|h| h.modifiers()))??)
    }
}

/// Hand a glide result back to the waiting caller.
fn deliver(tx: &chan::Sender<Result<()>>, result: Result<()>) {
    if tx.send(result).is_err() {
        warn!("glide_caller_gone");
    }
}

/// Sleep on the calling thread for at least `d`.
pub fn pause(d: Duration) {
    thread::sleep(d);
}
