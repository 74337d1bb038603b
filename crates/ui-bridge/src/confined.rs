//! Values that live on the UI thread.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;

use crate::{
    error::{Error, Result},
    executor::UiExecutor,
};

/// A value owned by the UI thread.
///
/// Access is refused anywhere else, so the inner lock is never contended;
/// it exists only to make the cell `Sync`.
pub struct UiConfined<T> {
    /// Name used in errors.
    what: &'static str,
    /// Source of truth for "am I on the UI thread".
    executor: Arc<dyn UiExecutor>,
    /// The confined value.
    value: Mutex<T>,
}

impl<T> UiConfined<T> {
    /// Wrap `value`, confining it to `executor`'s UI thread.
    pub fn new(what: &'static str, executor: Arc<dyn UiExecutor>, value: T) -> Self {
        Self {
            what,
            executor,
            value: Mutex::new(value),
        }
    }

    /// Run `f` with exclusive access to the value.
    ///
    /// Fails with [`Error::WrongThread`] off the UI thread and with
    /// [`Error::Reentrant`] when called from inside another `with`.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        if !self.executor.is_ui_thread() {
            return Err(Error::WrongThread { what: self.what });
        }
        let mut guard = self
            .value
            .try_lock()
            .ok_or(Error::Reentrant { what: self.what })?;
        Ok(f(&mut guard))
    }
}

impl<T> fmt::Debug for UiConfined<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiConfined")
            .field("what", &self.what)
            .finish_non_exhaustive()
    }
}
