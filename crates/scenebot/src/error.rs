//! Error handling for the scenebot crate.

use std::{io, path::PathBuf, result, time::Duration};

use thiserror::Error;

use crate::toolkit::{InjectError, NodeId};

/// Convenient result type for robot operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors surfaced to the calling thread by robot operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Work on the UI thread failed or the UI loop is gone.
    #[error("UI thread call failed: {0}")]
    Bridge(#[from] ui_bridge::Error),
    /// The input primitive rejected an event.
    #[error("Input injection error: {0}")]
    Inject(#[from] InjectError),
    /// A bounded wait ran out of time.
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout {
        /// Description of what was awaited.
        what: &'static str,
        /// Bound that elapsed.
        after: Duration,
    },
    /// An operation needed a focused window and none was focused.
    #[error("No focused window")]
    NoFocusedWindow,
    /// A query that had to find something found nothing, even with retries.
    #[error("no node matches {query}")]
    NotFound {
        /// Description of the query.
        query: String,
    },
    /// A node went away between lookup and use.
    #[error("{0} is no longer in the scene")]
    NodeUnavailable(NodeId),
    /// The robot configuration could not be parsed.
    #[error("Configuration error{}: {message}", config_location(.path))]
    Config {
        /// File the configuration came from, if any.
        path: Option<PathBuf>,
        /// Parser message.
        message: String,
    },
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Render the optional source file of a configuration error.
fn config_location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}

impl Error {
    /// Helper for building a not-found error from a query description.
    pub fn not_found<M: Into<String>>(query: M) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }
}
