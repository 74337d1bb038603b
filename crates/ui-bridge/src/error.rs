//! Error types and result alias for the ui-bridge crate.
use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Crate-local `Result` alias using the bridge error type.
pub type Result<T> = StdResult<T, Error>;

/// Failures surfaced when marshalling work to and from the UI thread.
#[derive(Error, Debug)]
pub enum Error {
    /// A task submitted through the blocking path panicked on the UI thread.
    #[error("UI task panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },
    /// A fire-and-forget task reported an error of its own.
    #[error("UI task failed: {0}")]
    Task(String),
    /// The UI loop is no longer accepting or completing work.
    #[error("UI loop closed")]
    Closed,
    /// UI-confined state was accessed from another thread.
    #[error("{what} may only be accessed on the UI thread")]
    WrongThread {
        /// Description of the confined value.
        what: &'static str,
    },
    /// UI-confined state was accessed again while already borrowed.
    #[error("{what} is already borrowed on the UI thread")]
    Reentrant {
        /// Description of the confined value.
        what: &'static str,
    },
    /// The UI thread could not be started.
    #[error("failed to spawn UI thread: {0}")]
    Spawn(#[from] io::Error),
}
