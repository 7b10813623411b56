// Note identity and key layout
//
// A note is identified by its name ("C#4"). Its frequency is a fixed property of
// the key layout; nothing in the engine derives frequencies from names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name of a piano key, e.g. "C4" or "F#5"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteName(String);

impl NoteName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Black keys carry a sharp in their name
    pub fn is_sharp(&self) -> bool {
        self.0.contains('#')
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Resolves a note name to its frequency in Hz
pub trait FrequencyLookup {
    fn frequency_of(&self, note: &NoteName) -> Option<f32>;
}

/// One key of the layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub note: NoteName,
    pub frequency: f32,
    /// Computer keyboard shortcut (lowercase letter or digit)
    #[serde(default)]
    pub shortcut: Option<char>,
}

impl KeyBinding {
    pub fn new(note: &str, frequency: f32, shortcut: Option<char>) -> Self {
        Self {
            note: NoteName::new(note),
            frequency,
            shortcut,
        }
    }
}

/// Ordered set of keys, low to high
#[derive(Debug, Clone, Default)]
pub struct KeyLayout {
    keys: Vec<KeyBinding>,
    by_note: HashMap<NoteName, usize>,
}

impl KeyLayout {
    /// Build a layout; later duplicates of a note are ignored
    pub fn new(keys: Vec<KeyBinding>) -> Self {
        let mut layout = Self::default();
        for key in keys {
            if layout.by_note.contains_key(&key.note) {
                continue;
            }
            layout.by_note.insert(key.note.clone(), layout.keys.len());
            layout.keys.push(key);
        }
        layout
    }

    /// Two octaves C4–B5 with the default computer keyboard shortcuts
    pub fn two_octaves() -> Self {
        Self::new(default_keys())
    }

    pub fn keys(&self) -> &[KeyBinding] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, note: &NoteName) -> Option<&KeyBinding> {
        self.by_note.get(note).map(|&index| &self.keys[index])
    }

    /// Key bound to a computer keyboard shortcut (case-insensitive)
    pub fn by_shortcut(&self, shortcut: char) -> Option<&KeyBinding> {
        let shortcut = shortcut.to_ascii_lowercase();
        self.keys.iter().find(|key| key.shortcut == Some(shortcut))
    }
}

impl FrequencyLookup for KeyLayout {
    fn frequency_of(&self, note: &NoteName) -> Option<f32> {
        self.get(note)
            .map(|key| key.frequency)
            .filter(|frequency| frequency.is_finite() && *frequency > 0.0)
    }
}

/// Default key table: 12-TET frequencies (A4 = 440 Hz)
pub fn default_keys() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new("C4", 261.63, Some('a')),
        KeyBinding::new("C#4", 277.18, Some('w')),
        KeyBinding::new("D4", 293.66, Some('s')),
        KeyBinding::new("D#4", 311.13, Some('e')),
        KeyBinding::new("E4", 329.63, Some('d')),
        KeyBinding::new("F4", 349.23, Some('f')),
        KeyBinding::new("F#4", 369.99, Some('t')),
        KeyBinding::new("G4", 392.00, Some('g')),
        KeyBinding::new("G#4", 415.30, Some('y')),
        KeyBinding::new("A4", 440.00, Some('h')),
        KeyBinding::new("A#4", 466.16, Some('u')),
        KeyBinding::new("B4", 493.88, Some('j')),
        KeyBinding::new("C5", 523.25, Some('z')),
        KeyBinding::new("C#5", 554.37, Some('1')),
        KeyBinding::new("D5", 587.33, Some('x')),
        KeyBinding::new("D#5", 622.25, Some('2')),
        KeyBinding::new("E5", 659.25, Some('c')),
        KeyBinding::new("F5", 698.46, Some('v')),
        KeyBinding::new("F#5", 739.99, Some('3')),
        KeyBinding::new("G5", 783.99, Some('b')),
        KeyBinding::new("G#5", 830.61, Some('4')),
        KeyBinding::new("A5", 880.00, Some('n')),
        KeyBinding::new("A#5", 932.33, Some('5')),
        KeyBinding::new("B5", 987.77, Some('m')),
    ]
}
