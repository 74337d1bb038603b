//! Textual key specs: variant names, symbols and alias words.

use crate::Key;

/// Keys written as the character they produce.
const SYMBOLS: &[(Key, &str)] = &[
    (Key::Digit0, "0"),
    (Key::Digit1, "1"),
    (Key::Digit2, "2"),
    (Key::Digit3, "3"),
    (Key::Digit4, "4"),
    (Key::Digit5, "5"),
    (Key::Digit6, "6"),
    (Key::Digit7, "7"),
    (Key::Digit8, "8"),
    (Key::Digit9, "9"),
    (Key::Space, " "),
    (Key::Minus, "-"),
    (Key::Equals, "="),
    (Key::OpenBracket, "["),
    (Key::CloseBracket, "]"),
    (Key::BackSlash, "\\"),
    (Key::Semicolon, ";"),
    (Key::Quote, "'"),
    (Key::Comma, ","),
    (Key::Period, "."),
    (Key::Slash, "/"),
    (Key::BackQuote, "`"),
];

/// Lowercase words accepted when parsing but never produced by [`Key::to_spec`].
const ALIASES: &[(&str, Key)] = &[
    ("ctrl", Key::Control),
    ("cmd", Key::Meta),
    ("command", Key::Meta),
    ("super", Key::Meta),
    ("opt", Key::Alt),
    ("option", Key::Alt),
    ("caps", Key::CapsLock),
    ("return", Key::Enter),
    ("ret", Key::Enter),
    ("bksp", Key::BackSpace),
    ("del", Key::Delete),
    ("esc", Key::Escape),
    ("equal", Key::Equals),
    ("leftbracket", Key::OpenBracket),
    ("rightbracket", Key::CloseBracket),
    ("grave", Key::BackQuote),
    ("pgup", Key::PageUp),
    ("pgdn", Key::PageDown),
    ("menu", Key::ContextMenu),
];

impl Key {
    /// Parse a key spec.
    ///
    /// Tries the variant name (any case), then the symbol a key types
    /// (`"1"`, `","`, `" "`), then alias words such as `ctrl`, `cmd`, `esc`
    /// or `pgup`.
    pub fn from_spec(s: &str) -> Option<Self> {
        Self::from_name(s)
            .or_else(|| SYMBOLS.iter().find(|(_, sym)| *sym == s).map(|(k, _)| *k))
            .or_else(|| {
                let lowered = s.to_ascii_lowercase();
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == lowered)
                    .map(|(_, k)| *k)
            })
    }

    /// The canonical spec: the symbol for digits, punctuation and space,
    /// otherwise the lowercased name.
    pub fn to_spec(self) -> String {
        SYMBOLS
            .iter()
            .find(|(k, _)| *k == self)
            .map_or_else(|| self.name().to_ascii_lowercase(), |(_, sym)| (*sym).to_string())
    }
}
