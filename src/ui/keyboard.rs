// Keyboard input adapter - Turns key and mouse activity into session commands
//
// Holds the set of keys physically down so auto-repeat and double presses never
// produce a second note-on.

use crate::messaging::command::Command;
use crate::note::{FrequencyLookup, KeyLayout, NoteName};
use eframe::egui;
use std::collections::HashSet;

pub struct KeyboardInput {
    layout: KeyLayout,
    held: HashSet<NoteName>,
    shift_down: bool,
}

impl KeyboardInput {
    pub fn new(layout: KeyLayout) -> Self {
        Self {
            layout,
            held: HashSet::new(),
            shift_down: false,
        }
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Key went down; `None` for repeats and notes outside the layout
    pub fn press(&mut self, note: &NoteName) -> Option<Command> {
        let frequency = self.layout.frequency_of(note)?;
        if !self.held.insert(note.clone()) {
            return None;
        }
        Some(Command::NoteOn {
            note: note.clone(),
            frequency,
        })
    }

    /// Key went up; `None` if it was not down
    pub fn release(&mut self, note: &NoteName) -> Option<Command> {
        if !self.held.remove(note) {
            return None;
        }
        Some(Command::NoteOff(note.clone()))
    }

    pub fn press_shortcut(&mut self, shortcut: char) -> Option<Command> {
        let note = self.layout.by_shortcut(shortcut)?.note.clone();
        self.press(&note)
    }

    pub fn release_shortcut(&mut self, shortcut: char) -> Option<Command> {
        let note = self.layout.by_shortcut(shortcut)?.note.clone();
        self.release(&note)
    }

    /// Shift acts as the sustain pedal; only edges produce a command
    pub fn shift(&mut self, down: bool) -> Option<Command> {
        if self.shift_down == down {
            return None;
        }
        self.shift_down = down;
        Some(Command::SetSustain(down))
    }

    pub fn is_held(&self, note: &NoteName) -> bool {
        self.held.contains(note)
    }

    /// Release everything, e.g. when the window loses focus
    pub fn release_all(&mut self) -> Vec<Command> {
        let mut notes: Vec<NoteName> = self.held.drain().collect();
        notes.sort();
        notes.into_iter().map(Command::NoteOff).collect()
    }
}

/// egui key for a layout shortcut (letters and digits)
pub fn egui_key(shortcut: char) -> Option<egui::Key> {
    egui::Key::from_name(&shortcut.to_ascii_uppercase().to_string())
}
