use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::Key;

/// Modifier keys tracked on synthesized key events.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Either Shift key.
    Shift,
    /// Ctrl.
    Control,
    /// Alt, or Option on macOS.
    Alt,
    /// Meta: Command on macOS, the Windows key elsewhere.
    Meta,
}

impl From<Modifier> for Key {
    fn from(m: Modifier) -> Self {
        match m {
            Modifier::Shift => Key::Shift,
            Modifier::Control => Key::Control,
            Modifier::Alt => Key::Alt,
            Modifier::Meta => Key::Meta,
        }
    }
}

impl TryFrom<Key> for Modifier {
    type Error = ();
    fn try_from(k: Key) -> Result<Self, Self::Error> {
        match k {
            Key::Shift => Ok(Modifier::Shift),
            Key::Control => Ok(Modifier::Control),
            Key::Alt => Ok(Modifier::Alt),
            Key::Meta => Ok(Modifier::Meta),
            _ => Err(()),
        }
    }
}

impl Modifier {
    /// Parses a modifier specification string via key specs, then converts.
    ///
    /// Accepts the same names and aliases as `Key::from_spec`; fails if the
    /// parsed key is not a modifier.
    pub fn from_spec(s: &str) -> Option<Self> {
        Key::from_spec(s).and_then(|k| Self::try_from(k).ok())
    }

    /// Returns the canonical spec string for this modifier, always lowercased.
    pub fn to_spec(self) -> String {
        match self {
            Modifier::Control => "ctrl".to_string(),
            _ => Key::from(self).name().to_ascii_lowercase(),
        }
    }
}

/// Modifier state carried by a synthesized key event.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ModifierFlags {
    /// SHIFT is held.
    pub shift: bool,
    /// CONTROL is held.
    pub control: bool,
    /// ALT is held.
    pub alt: bool,
    /// META is held.
    pub meta: bool,
}

impl ModifierFlags {
    /// Flags with every modifier released.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Compute the flags implied by a set of held keys.
    pub fn from_held<'a>(held: impl IntoIterator<Item = &'a Key>) -> Self {
        let mut flags = Self::NONE;
        for key in held {
            if let Ok(m) = Modifier::try_from(*key) {
                flags.set(m, true);
            }
        }
        flags
    }

    /// Set or clear a single modifier.
    pub fn set(&mut self, m: Modifier, down: bool) {
        match m {
            Modifier::Shift => self.shift = down,
            Modifier::Control => self.control = down,
            Modifier::Alt => self.alt = down,
            Modifier::Meta => self.meta = down,
        }
    }

    /// True if the modifier is set.
    pub fn contains(self, m: Modifier) -> bool {
        match m {
            Modifier::Shift => self.shift,
            Modifier::Control => self.control,
            Modifier::Alt => self.alt,
            Modifier::Meta => self.meta,
        }
    }

    /// True if no modifier is set.
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_modifiers() {
        let mods = [
            Modifier::Shift,
            Modifier::Control,
            Modifier::Alt,
            Modifier::Meta,
        ];
        for m in mods {
            let k: Key = m.into();
            assert_eq!(Modifier::try_from(k), Ok(m));
            assert_eq!(Modifier::from_spec(&m.to_spec()), Some(m));
        }
        assert!(Modifier::try_from(Key::A).is_err());
        assert_eq!(Modifier::from_spec("a"), None);
    }

    #[test]
    fn flags_from_held_keys() {
        let held = [Key::A, Key::Shift, Key::Meta];
        let flags = ModifierFlags::from_held(&held);
        assert!(flags.shift);
        assert!(flags.meta);
        assert!(!flags.control);
        assert!(!flags.alt);
        assert!(ModifierFlags::from_held(&[Key::A, Key::B]).is_empty());
    }

    #[test]
    fn set_and_clear() {
        let mut flags = ModifierFlags::default();
        flags.set(Modifier::Control, true);
        assert!(flags.contains(Modifier::Control));
        flags.set(Modifier::Control, false);
        assert!(flags.is_empty());
    }
}
