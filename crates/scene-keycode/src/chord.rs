use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Key, Modifier};

/// A key combination such as `ctrl+shift+s`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// Modifiers in the order written, without repeats.
    pub modifiers: Vec<Modifier>,
    /// The key pressed last.
    pub key: Key,
}

impl Chord {
    /// Parse `mod+mod+key`, case-insensitively.
    ///
    /// The last `+`-separated part is the key; everything before it must be
    /// a modifier. A literal space is accepted as the key.
    pub fn parse(s: &str) -> Option<Self> {
        let (head, last) = match s.rsplit_once('+') {
            Some((head, last)) => (Some(head), last),
            None => (None, s),
        };
        let key = match last {
            " " => Key::Space,
            k => Key::from_spec(k.trim())?,
        };
        let mut modifiers = Vec::new();
        for part in head.into_iter().flat_map(|h| h.split('+')) {
            let m = Modifier::from_spec(part.trim())?;
            if !modifiers.contains(&m) {
                modifiers.push(m);
            }
        }
        Some(Self { modifiers, key })
    }

    /// Keys in press order: modifiers as written, then the key.
    ///
    /// Feeding this to a push operation releases in reverse, so the key comes
    /// up before its modifiers.
    pub fn keys(&self) -> Vec<Key> {
        self.modifiers
            .iter()
            .map(|&m| Key::from(m))
            .chain([self.key])
            .collect()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m.to_spec())?;
        }
        f.write_str(&self.key.to_spec())
    }
}
