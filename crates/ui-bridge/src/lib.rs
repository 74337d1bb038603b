//! ui-bridge: cross-thread access to a single-threaded UI event loop.
//!
//! All toolkit state is confined to one UI thread. Callers on other threads
//! go through a [`ThreadBridge`], which offers:
//! - [`ThreadBridge::run_blocking`]: run a closure on the UI thread and wait
//!   for its value (inline when already on the UI thread).
//! - [`ThreadBridge::run_async`]: enqueue a closure without waiting; closures
//!   from one caller run in submission order.
//! - [`ThreadBridge::drain`]: wait until everything enqueued earlier has run.
//!
//! The UI thread itself is abstracted by [`UiExecutor`]. [`EventLoop`] is a
//! self-contained implementation for hosts (and tests) that do not bring
//! their own loop.
#![warn(missing_docs)]

mod bridge;
mod confined;
mod error;
mod event_loop;
mod executor;
mod timeline;

pub use bridge::{Outcome, ThreadBridge};
pub use confined::UiConfined;
pub use error::{Error, Result};
pub use event_loop::{EventLoop, EventLoopBuilder, EventLoopHandle, UncaughtHandler};
pub use executor::{UiExecutor, UiTask, panic_message};
pub use timeline::{StopHandle, Timeline};
