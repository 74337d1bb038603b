#![warn(missing_docs)]

//! Shared logging helpers and tracing setup for the scenebot workspace.
//!
//! - Filter specs scoped to our crates, with the usual precedence rules.
//! - One-shot subscriber initialisation for tools and test binaries.

use std::{env, sync::OnceLock};

use tracing_subscriber::{EnvFilter, prelude::*};

/// Global flag to track if logging has been initialized.
static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &["scenebot", "ui_bridge", "scene_keycode", "logging"]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info"))
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// Initialize logging considering `logs` and `quiet` flags.
/// - When `quiet` is true: force WARN+ regardless of RUST_LOG.
/// - Else when `logs` is true: use `RUST_LOG` or crate-scoped `info`.
/// - Else: do not initialize a subscriber (no tracing output).
///
/// Only the first call has any effect.
pub fn init_for(logs: bool, quiet: bool) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let spec = if quiet {
            "warn".to_string()
        } else if logs {
            compute_spec(false, false, None, None)
        } else {
            return;
        };
        // try_init fails if another subscriber won the race; theirs stays.
        let _ = tracing_subscriber::registry()
            .with(env_filter_from_spec(&spec))
            .with(tracing_subscriber::fmt::layer().without_time())
            .try_init();
    });
}

/// Initialize logging for test binaries.
///
/// Output goes through the test writer so it is captured per test, and is
/// only enabled when `RUST_LOG` is set.
pub fn init_for_tests() {
    LOGGING_INITIALIZED.get_or_init(|| {
        let Ok(spec) = env::var("RUST_LOG") else {
            return;
        };
        let _ = tracing_subscriber::registry()
            .with(env_filter_from_spec(&spec))
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_test_writer(),
            )
            .try_init();
    });
}
