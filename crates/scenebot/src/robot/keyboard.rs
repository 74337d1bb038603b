use std::time::Duration;

use scene_keycode::{Chord, Key};

use super::Robot;
use crate::error::Result;

/// Keyboard operations.
pub trait Keyboard {
    /// Press `keys` in order, then release them in reverse order.
    fn push(&self, keys: &[Key]) -> Result<&Self>;

    /// Press and hold `keys` in order.
    fn press(&self, keys: &[Key]) -> Result<&Self>;

    /// Release `keys`; with none, release every key currently held.
    fn release(&self, keys: &[Key]) -> Result<&Self>;

    /// Type `text` into the focused window, pausing `delay` per character.
    fn write_with_delay(&self, text: &str, delay: Duration) -> Result<&Self>;

    /// Type `text` with no pause between characters.
    fn write(&self, text: &str) -> Result<&Self> {
        self.write_with_delay(text, Duration::ZERO)
    }

    /// Type a single character.
    fn write_char(&self, ch: char) -> Result<&Self> {
        self.write(ch.encode_utf8(&mut [0; 4]))
    }

    /// Push a chord: modifiers as written, then the key.
    fn push_chord(&self, chord: &Chord) -> Result<&Self> {
        self.push(&chord.keys())
    }
}

impl Keyboard for Robot {
    fn push(&self, keys: &[Key]) -> Result<&Self> {
        self.engine.push(keys)?;
        Ok(self)
    }

    fn press(&self, keys: &[Key]) -> Result<&Self> {
        self.engine.press(keys)?;
        Ok(self)
    }

    fn release(&self, keys: &[Key]) -> Result<&Self> {
        self.engine.release(keys)?;
        Ok(self)
    }

    fn write_with_delay(&self, text: &str, delay: Duration) -> Result<&Self> {
        self.engine.type_text(text, delay)?;
        Ok(self)
    }
}
