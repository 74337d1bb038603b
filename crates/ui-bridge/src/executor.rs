//! The seam between the bridge and whatever owns the UI thread.

use std::{any::Any, time::Duration};

use tracing::error;

use crate::error::{Error, Result};

/// A unit of work destined for the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run work on the toolkit's UI thread.
///
/// Implementations must execute tasks passed to [`post`](Self::post) in
/// submission order, on one designated thread.
pub trait UiExecutor: Send + Sync {
    /// Return true when called on the UI thread.
    fn is_ui_thread(&self) -> bool;

    /// Enqueue a task for execution on the UI thread.
    fn post(&self, task: UiTask) -> Result<()>;

    /// Enqueue a task to run on the UI thread no earlier than `delay` from now.
    fn post_delayed(&self, delay: Duration, task: UiTask) -> Result<()>;

    /// Report a failure from work nobody is waiting on.
    ///
    /// The default mirrors a toolkit's uncaught-exception handler and logs.
    fn report_uncaught(&self, failure: &Error) {
        error!(%failure, "uncaught_ui_task_failure");
    }
}

/// Render a panic payload as text.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
