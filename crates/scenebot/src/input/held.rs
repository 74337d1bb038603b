//! Key state tracked by the input engine.

use scene_keycode::{Key, ModifierFlags};

/// Keys the engine currently considers pressed, in press order.
///
/// A key appears at most once. Lives on the UI thread inside a
/// [`ui_bridge::UiConfined`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    /// Press order, without duplicates.
    keys: Vec<Key>,
}

impl HeldKeys {
    /// Record `key` as held. Returns false if it already was.
    pub fn insert(&mut self, key: Key) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Forget `key`. Returns false if it was not held.
    pub fn remove(&mut self, key: Key) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| *k != key);
        self.keys.len() != before
    }

    /// Number of held keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Copy of the held keys in press order.
    pub fn snapshot(&self) -> Vec<Key> {
        self.keys.clone()
    }

    /// Modifier flags implied by the held keys.
    pub fn modifiers(&self) -> ModifierFlags {
        ModifierFlags::from_held(&self.keys)
    }
}
