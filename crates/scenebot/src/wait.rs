//! Polling waits on UI state.
//!
//! Conditions run on the UI thread with the live scene, so a condition may
//! evaluate queries directly. [`showing`] and [`not_showing`] build the
//! common ones.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    error::{Error, Result},
    input::pause,
    query::NodeQuery,
    robot::Robot,
    toolkit::SceneGraph,
};

/// True while `query` matches at least one node.
pub fn showing(query: &NodeQuery) -> impl Fn(&dyn SceneGraph) -> bool + Send + Sync + 'static {
    let source = query.shared_source();
    move |scene: &dyn SceneGraph| !source.evaluate(scene).is_empty()
}

/// True while `query` matches nothing.
pub fn not_showing(
    query: &NodeQuery,
) -> impl Fn(&dyn SceneGraph) -> bool + Send + Sync + 'static {
    let shown = showing(query);
    move |scene: &dyn SceneGraph| !shown(scene)
}

/// Polling waits, off the UI thread.
pub trait Waits {
    /// Poll `check` until it holds.
    ///
    /// Off the UI thread: pause, then evaluate on the UI thread, for up to
    /// `wait_until_retries + 1` checks. On the UI thread the check runs once,
    /// inline. Fails with [`Error::Timeout`] if it never held.
    fn wait_until(
        &self,
        check: impl Fn(&dyn SceneGraph) -> bool + Send + Sync + 'static,
    ) -> Result<&Self>;

    /// Sleep on the calling thread for at least `d`.
    fn sleep(&self, d: Duration) -> &Self;
}

impl Waits for Robot {
    fn wait_until(
        &self,
        check: impl Fn(&dyn SceneGraph) -> bool + Send + Sync + 'static,
    ) -> Result<&Self> {
        const WHAT: &str = "wait_until condition";
        if self.bridge.is_ui_thread() {
            return if check(self.scene.as_ref()) {
                Ok(self)
            } else {
                Err(Error::Timeout {
                    what: WHAT,
                    after: Duration::ZERO,
                })
            };
        }

        let check = Arc::new(check);
        let interval = self.config.wait_until_interval();
        let checks = self.config.wait_until_retries.saturating_add(1);
        let start = Instant::now();
        for attempt in 1..=checks {
            pause(interval);
            let check = check.clone();
            let scene = self.scene.clone();
            if self.bridge.run_blocking(move || check(scene.as_ref()))? {
                debug!(attempt, elapsed_ms = start.elapsed().as_millis(), "wait_until_met");
                return Ok(self);
            }
        }
        Err(Error::Timeout {
            what: WHAT,
            after: start.elapsed(),
        })
    }

    fn sleep(&self, d: Duration) -> &Self {
        pause(d);
        self
    }
}
