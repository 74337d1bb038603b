//! Blocking, fire-and-forget and drain primitives over a [`UiExecutor`].

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    result::Result as StdResult,
    sync::Arc,
};

use crossbeam_channel as chan;
use tracing::trace;

use crate::{
    error::{Error, Result},
    executor::{UiExecutor, panic_message},
};

/// Result types accepted from fire-and-forget closures.
///
/// `()` never fails; `Result<(), E>` fails with the rendered error.
pub trait Outcome {
    /// The failure message, if the closure failed.
    fn failure(self) -> Option<String>;
}

impl Outcome for () {
    fn failure(self) -> Option<String> {
        None
    }
}

impl<E: fmt::Display> Outcome for StdResult<(), E> {
    fn failure(self) -> Option<String> {
        self.err().map(|e| e.to_string())
    }
}

/// Run `f`, turning a panic into [`Error::Panicked`].
fn catch<T>(f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| Error::Panicked {
        message: panic_message(payload.as_ref()),
    })
}

/// Marshals work onto the UI thread owned by an executor.
#[derive(Clone)]
pub struct ThreadBridge {
    /// The UI thread.
    executor: Arc<dyn UiExecutor>,
}

impl fmt::Debug for ThreadBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadBridge").finish_non_exhaustive()
    }
}

impl ThreadBridge {
    /// Create a bridge to the given executor.
    pub fn new(executor: Arc<dyn UiExecutor>) -> Self {
        Self { executor }
    }

    /// The executor this bridge submits to.
    pub fn executor(&self) -> &Arc<dyn UiExecutor> {
        &self.executor
    }

    /// Return true when called on the UI thread.
    pub fn is_ui_thread(&self) -> bool {
        self.executor.is_ui_thread()
    }

    /// Run `f` on the UI thread and wait for its value.
    ///
    /// On the UI thread `f` runs inline. A panic inside `f` is returned as
    /// [`Error::Panicked`]; if the loop drops the task unrun the result is
    /// [`Error::Closed`].
    pub fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_ui_thread() {
            return catch(f);
        }
        let (tx, rx) = chan::bounded::<Result<T>>(1);
        self.executor.post(Box::new(move || {
            if tx.send(catch(f)).is_err() {
                trace!("blocking_caller_gone");
            }
        }))?;
        rx.recv().map_err(|_| Error::Closed)?
    }

    /// Enqueue `f` on the UI thread without waiting.
    ///
    /// Closures submitted from one thread run in submission order. Panics and
    /// `Err` returns go to the executor's uncaught handler; they never reach
    /// the caller. The only synchronous failure is a closed loop.
    pub fn run_async<F, O>(&self, f: F) -> Result<()>
    where
        F: FnOnce() -> O + Send + 'static,
        O: Outcome,
    {
        let executor = self.executor.clone();
        self.executor.post(Box::new(move || {
            let failure = match catch(f) {
                Ok(outcome) => outcome.failure().map(Error::Task),
                Err(e) => Some(e),
            };
            if let Some(failure) = failure {
                executor.report_uncaught(&failure);
            }
        }))
    }

    /// Block until all work enqueued before this call has run.
    ///
    /// Enqueues a no-op and waits for it. On the UI thread there is nothing
    /// to wait for without deadlocking, so this returns immediately.
    pub fn drain(&self) -> Result<()> {
        if self.is_ui_thread() {
            trace!("drain_on_ui_thread");
            return Ok(());
        }
        self.run_blocking(|| ())
    }
}
