//! Adapter seams to the host toolkit.
//!
//! The robot never owns toolkit objects. Windows and nodes are opaque ids
//! that may go stale at any moment; every method here must tolerate ids that
//! no longer refer to anything. All methods are called on the UI thread.

use std::fmt;

use scene_keycode::{Key, ModifierFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{Point, Rect};

/// Opaque handle to a scene-graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Opaque handle to a top-level window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Mouse buttons understood by the injector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Wheel button.
    Middle,
    /// Browser-style back button.
    Back,
    /// Browser-style forward button.
    Forward,
}

/// How the pointer travels to its destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Motion {
    /// Jump straight to the target.
    #[default]
    Direct,
    /// Glide along a straight line at a fixed speed. Off the UI thread only;
    /// on the UI thread this degrades to `Direct`.
    StraightLine,
}

/// Phase of a synthesized key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEventKind {
    /// Key went down.
    Pressed,
    /// A character was produced.
    Typed,
    /// Key came up.
    Released,
}

/// A structured key event dispatched directly at a scene target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Event phase.
    pub kind: KeyEventKind,
    /// Key code; `Key::Undefined` for character-only input.
    pub key: Key,
    /// Character payload. Only `Typed` events carry one.
    pub character: Option<char>,
    /// Key text: the key name for press/release, empty for typed.
    pub text: String,
    /// Modifier state at dispatch time.
    pub modifiers: ModifierFlags,
}

impl KeyEvent {
    /// A press of `key`.
    pub fn pressed(key: Key, modifiers: ModifierFlags) -> Self {
        Self {
            kind: KeyEventKind::Pressed,
            key,
            character: None,
            text: key.name().to_string(),
            modifiers,
        }
    }

    /// A typed character, carrying an undefined key code.
    pub fn typed(character: char, modifiers: ModifierFlags) -> Self {
        Self {
            kind: KeyEventKind::Typed,
            key: Key::Undefined,
            character: Some(character),
            text: String::new(),
            modifiers,
        }
    }

    /// A release of `key`.
    pub fn released(key: Key, modifiers: ModifierFlags) -> Self {
        Self {
            kind: KeyEventKind::Released,
            key,
            character: None,
            text: key.name().to_string(),
            modifiers,
        }
    }
}

/// Where a structured key event is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyTarget {
    /// The focus owner of a scene.
    Node(NodeId),
    /// The scene of a window, when nothing inside it has focus.
    Scene(WindowId),
}

/// Failures from the physical input primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// The platform refused to create or post the event.
    #[error("{op} failed: {message}")]
    Failed {
        /// Primitive that failed (`key_down`, `mouse_move`, ...).
        op: &'static str,
        /// Platform detail.
        message: String,
    },
    /// Input injection is not available in this environment.
    #[error("input injection unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the live scene, plus structured key dispatch.
pub trait SceneGraph: Send + Sync {
    /// All currently open top-level windows.
    fn windows(&self) -> Vec<WindowId>;
    /// Whether `window` has input focus.
    fn is_focused(&self, window: WindowId) -> bool;
    /// Root node of the window's scene.
    fn scene_root(&self, window: WindowId) -> Option<NodeId>;
    /// Node that currently owns focus within the window's scene.
    fn focus_owner(&self, window: WindowId) -> Option<NodeId>;
    /// Children in toolkit order; `None` if the node is no longer live.
    fn children(&self, node: NodeId) -> Option<Vec<NodeId>>;
    /// Node bounds in its own coordinate space.
    fn bounds_in_local(&self, node: NodeId) -> Option<Rect>;
    /// Convert a node-local point to screen coordinates.
    fn local_to_screen(&self, node: NodeId, point: Point) -> Option<Point>;
    /// Selector evaluation (id, style class, type...) for one node.
    fn matches(&self, node: NodeId, selector: &str) -> bool;
    /// Fire a key event at `target`.
    fn dispatch_key(&self, target: KeyTarget, event: &KeyEvent);

    /// The first focused window, if any.
    fn focused_window(&self) -> Option<WindowId> {
        self.windows().into_iter().find(|w| self.is_focused(*w))
    }

    /// Whether `node` is still attached and live.
    fn is_live(&self, node: NodeId) -> bool {
        self.children(node).is_some()
    }
}

/// The single physical input-injection primitive.
pub trait InputInjector: Send + Sync {
    /// Press a key.
    fn key_down(&self, key: Key) -> Result<(), InjectError>;
    /// Release a key.
    fn key_up(&self, key: Key) -> Result<(), InjectError>;
    /// Warp the pointer to a screen point.
    fn mouse_move(&self, to: Point) -> Result<(), InjectError>;
    /// Press and release the given buttons at the current position.
    fn mouse_click(&self, buttons: &[MouseButton]) -> Result<(), InjectError>;
    /// Current pointer position in screen coordinates.
    fn mouse_position(&self) -> Result<Point, InjectError>;
}
