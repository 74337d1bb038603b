//! scene-keycode: Key codes, modifiers and chord specs for synthesized input.
//!
//! - `Key`: Enum of the toolkit key codes the robot can press, including the
//!   `Undefined` placeholder used for character-only typing.
//! - `Modifier`: The four modifier kinds with conversions to/from `Key`.
//! - `ModifierFlags`: Shift/Control/Alt/Meta state stamped onto key events.
//! - Spec helpers: `Key::from_spec`, `Key::to_spec`, and
//!   `Modifier::from_spec`, `Modifier::to_spec`.
//! - `Chord`: "ctrl+shift+a" style specs, expanded into a press order.

mod key;
pub use key::Key;

mod spec;

mod modifiers;
pub use modifiers::{Modifier, ModifierFlags};

mod chord;
pub use chord::Chord;
