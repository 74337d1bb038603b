//! scenebot: drive a retained-mode UI from test threads.
//!
//! The toolkit owns a single UI thread. Tests run elsewhere and talk to it
//! through a [`Robot`], which:
//! - simulates keys and the pointer through an [`InputInjector`], tracking
//!   held keys and modifier state on the UI thread;
//! - types text as structured key events aimed at the focus owner;
//! - finds nodes with lazy [`NodeQuery`]s that re-read the live
//!   [`SceneGraph`] on every evaluation;
//! - waits for UI conditions by polling.
//!
//! Every operation that touches the UI returns only after the UI thread has
//! drained the work it caused. The toolkit is reached through the
//! [`SceneGraph`] and [`InputInjector`] seams and a [`ui_bridge::UiExecutor`].
#![warn(missing_docs)]

mod config;
mod error;
mod geom;
mod input;
mod query;
mod robot;
mod toolkit;
mod wait;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use config::RobotConfig;
pub use error::{Error, Result};
pub use geom::{Point, Rect};
pub use input::{HeldKeys, InputEngine};
pub use query::{Matcher, NodePredicate, NodeQuery, Source};
pub use robot::{IntoQuery, Keyboard, Mouse, Robot, Windows};
pub use scene_keycode::{Chord, Key, Modifier, ModifierFlags};
pub use toolkit::{
    InjectError, InputInjector, KeyEvent, KeyEventKind, KeyTarget, Motion, MouseButton, NodeId,
    SceneGraph, WindowId,
};
pub use wait::{Waits, not_showing, showing};
