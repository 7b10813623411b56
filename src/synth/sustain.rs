// Sustain Controller - Funnel for every note-off intent
//
// While the pedal is down, released notes are parked in the sustain set instead of
// being stopped. Lifting the pedal hands them all back for a real release.

use crate::note::NoteName;

/// What to do with a note-off request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteOffDecision {
    /// Forward to the voice engine now
    Release(NoteName),
    /// Held by the pedal; released when sustain is turned off
    Deferred,
}

#[derive(Debug, Default)]
pub struct SustainController {
    engaged: bool,
    // Insertion order is the release order
    held: Vec<NoteName>,
}

impl SustainController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Set the pedal state; returns the notes that must be released right now
    pub fn set_sustain(&mut self, on: bool) -> Vec<NoteName> {
        self.engaged = on;
        if on {
            Vec::new()
        } else {
            std::mem::take(&mut self.held)
        }
    }

    pub fn note_off_request(&mut self, note: &NoteName) -> NoteOffDecision {
        if !self.engaged {
            return NoteOffDecision::Release(note.clone());
        }
        if !self.held.contains(note) {
            self.held.push(note.clone());
        }
        NoteOffDecision::Deferred
    }

    pub fn is_held(&self, note: &NoteName) -> bool {
        self.held.contains(note)
    }

    pub fn held_notes(&self) -> &[NoteName] {
        &self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(name: &str) -> NoteName {
        NoteName::from(name)
    }

    #[test]
    fn test_release_passes_through_without_pedal() {
        let mut sustain = SustainController::new();
        assert_eq!(
            sustain.note_off_request(&note("C4")),
            NoteOffDecision::Release(note("C4"))
        );
        assert!(sustain.held_notes().is_empty());
    }

    #[test]
    fn test_pedal_defers_release() {
        let mut sustain = SustainController::new();
        assert!(sustain.set_sustain(true).is_empty());

        assert_eq!(sustain.note_off_request(&note("C4")), NoteOffDecision::Deferred);
        assert_eq!(sustain.note_off_request(&note("E4")), NoteOffDecision::Deferred);
        assert_eq!(sustain.note_off_request(&note("C4")), NoteOffDecision::Deferred);
        assert!(sustain.is_held(&note("C4")));
        assert_eq!(sustain.held_notes().len(), 2);
    }

    #[test]
    fn test_lifting_pedal_releases_in_order() {
        let mut sustain = SustainController::new();
        sustain.set_sustain(true);
        sustain.note_off_request(&note("G4"));
        sustain.note_off_request(&note("C4"));

        let released = sustain.set_sustain(false);
        assert_eq!(released, vec![note("G4"), note("C4")]);
        assert!(sustain.held_notes().is_empty());
        assert!(!sustain.is_engaged());
    }

    #[test]
    fn test_pedal_off_twice_is_harmless() {
        let mut sustain = SustainController::new();
        assert!(sustain.set_sustain(false).is_empty());
        assert!(sustain.set_sustain(false).is_empty());
    }
}
