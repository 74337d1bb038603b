use serde::{Deserialize, Serialize};

// Single source for the key table: generates the enum, `ALL`, `name()` and
// case-insensitive `from_name()`.
macro_rules! keys {
    ( $( $(#[$doc:meta])* $k:ident ),* $(,)? ) => {
        /// A key code understood by the toolkit's input injection primitive.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Key {
            $( $(#[$doc])* $k, )*
        }

        impl Key {
            /// Every key, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$k, )* ];

            /// Returns the enum variant name.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$k => stringify!($k), )*
                }
            }

            /// Looks up a key by its variant name, ignoring ASCII case.
            pub fn from_name(s: &str) -> Option<Self> {
                $(
                    if s.eq_ignore_ascii_case(stringify!($k)) {
                        return Some(Self::$k);
                    }
                )*
                None
            }
        }
    };
}

keys! {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,
    Enter,
    Escape,
    Tab,
    Space,
    BackSpace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Minus,
    Equals,
    OpenBracket,
    CloseBracket,
    BackSlash,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,
    BackQuote,
    Shift,
    Control,
    Alt,
    Meta,
    CapsLock,
    ContextMenu,
    /// Placeholder code for events that carry only a character payload.
    Undefined,
}

impl Key {
    /// True for the keys that drive `ModifierFlags`.
    pub fn is_modifier(self) -> bool {
        matches!(self, Self::Shift | Self::Control | Self::Alt | Self::Meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_reversible() {
        for k in Key::ALL {
            assert_eq!(Key::from_name(k.name()), Some(*k));
            assert_eq!(Key::from_name(&k.name().to_ascii_uppercase()), Some(*k));
        }
    }

    #[test]
    fn modifier_classification() {
        let mods: Vec<Key> = Key::ALL.iter().copied().filter(|k| k.is_modifier()).collect();
        assert_eq!(mods, vec![Key::Shift, Key::Control, Key::Alt, Key::Meta]);
        assert!(!Key::CapsLock.is_modifier());
    }

    #[test]
    fn serde_uses_variant_names() {
        let text = ron::to_string(&Key::PageDown).expect("serialize");
        assert_eq!(text, "PageDown");
        let back: Key = ron::from_str("Shift").expect("deserialize");
        assert_eq!(back, Key::Shift);
    }
}
