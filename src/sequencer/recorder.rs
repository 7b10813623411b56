// Recorder - Captures note-on/note-off pairs into a timed event log
//
// Times are seconds on the session clock; events store offsets relative to the
// moment recording started.

use crate::error::{PianoError, PianoResult};
use crate::note::{FrequencyLookup, NoteName};
use std::collections::HashMap;

/// Shortest duration a recorded note can have, in seconds
pub const MIN_NOTE_DURATION: f64 = 0.05;

/// One recorded note
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub note: NoteName,
    pub frequency: f32,
    /// Seconds from recording start
    pub start: f64,
    /// Seconds, never below `MIN_NOTE_DURATION`
    pub duration: f64,
}

impl RecordedEvent {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Outcome of stopping a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSummary {
    pub note_count: usize,
}

impl RecordingSummary {
    pub fn is_empty(&self) -> bool {
        self.note_count == 0
    }

    pub fn status_text(&self) -> String {
        if self.is_empty() {
            "Stopped. No notes recorded.".to_string()
        } else {
            format!("Stopped. Recorded {} notes.", self.note_count)
        }
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    recording: bool,
    session_start: f64,
    pending: HashMap<NoteName, f64>, // note -> start offset
    log: Vec<RecordedEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Begin a new session; the previous log is discarded
    pub fn start(&mut self, now: f64) {
        self.recording = true;
        self.session_start = now;
        self.pending.clear();
        self.log.clear();
    }

    fn offset(&self, now: f64) -> f64 {
        (now - self.session_start).max(0.0)
    }

    pub fn note_on(&mut self, note: &NoteName, now: f64) {
        if !self.recording || self.pending.contains_key(note) {
            return;
        }
        let start = self.offset(now);
        self.pending.insert(note.clone(), start);
    }

    pub fn note_off(&mut self, note: &NoteName, now: f64, lookup: &dyn FrequencyLookup) {
        if !self.recording {
            return;
        }
        if let Some(start) = self.pending.remove(note) {
            let end = self.offset(now);
            self.push_event(note.clone(), start, end, lookup);
        }
    }

    fn push_event(&mut self, note: NoteName, start: f64, end: f64, lookup: &dyn FrequencyLookup) {
        // Never record a note whose pitch we cannot replay
        let Some(frequency) = lookup.frequency_of(&note) else {
            return;
        };
        let duration = (end - start).max(MIN_NOTE_DURATION);
        self.log.push(RecordedEvent {
            note,
            frequency,
            start,
            duration,
        });
    }

    /// Close every note still held and end the session
    pub fn stop(&mut self, now: f64, lookup: &dyn FrequencyLookup) -> PianoResult<RecordingSummary> {
        if !self.recording {
            return Err(PianoError::NotRecording);
        }

        let end = self.offset(now);
        let mut still_open: Vec<(NoteName, f64)> = self.pending.drain().collect();
        still_open.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        for (note, start) in still_open {
            self.push_event(note, start, end, lookup);
        }

        self.recording = false;
        Ok(RecordingSummary {
            note_count: self.log.len(),
        })
    }

    pub fn log(&self) -> &[RecordedEvent] {
        &self.log
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::KeyLayout;

    const EPSILON: f64 = 1e-9;

    fn note(name: &str) -> NoteName {
        NoteName::from(name)
    }

    #[test]
    fn test_basic_recording() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();
        recorder.start(10.0);

        recorder.note_on(&note("C4"), 10.0);
        recorder.note_off(&note("C4"), 10.5, &layout);

        let log = recorder.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].note, note("C4"));
        assert_eq!(log[0].frequency, 261.63);
        assert!(log[0].start.abs() < EPSILON);
        assert!((log[0].duration - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_duration_floor() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();
        recorder.start(0.0);

        recorder.note_on(&note("D4"), 1.0);
        recorder.note_off(&note("D4"), 1.001, &layout);

        assert_eq!(recorder.log()[0].duration, MIN_NOTE_DURATION);
    }

    #[test]
    fn test_key_repeat_keeps_first_start() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();
        recorder.start(0.0);

        recorder.note_on(&note("E4"), 0.2);
        recorder.note_on(&note("E4"), 0.3);
        recorder.note_on(&note("E4"), 0.4);
        recorder.note_off(&note("E4"), 1.0, &layout);

        assert_eq!(recorder.log().len(), 1);
        assert!((recorder.log()[0].start - 0.2).abs() < EPSILON);
        assert!((recorder.log()[0].duration - 0.8).abs() < EPSILON);
    }

    #[test]
    fn test_unknown_frequency_is_dropped() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();
        recorder.start(0.0);

        recorder.note_on(&note("Z9"), 0.0);
        recorder.note_off(&note("Z9"), 1.0, &layout);

        assert!(recorder.log().is_empty());
        assert_eq!(recorder.pending_count(), 0);
    }

    #[test]
    fn test_events_ignored_when_not_recording() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();

        recorder.note_on(&note("C4"), 0.0);
        recorder.note_off(&note("C4"), 1.0, &layout);
        assert!(recorder.log().is_empty());
        assert_eq!(recorder.pending_count(), 0);
    }

    #[test]
    fn test_stop_closes_open_notes() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();
        recorder.start(5.0);

        recorder.note_on(&note("G4"), 5.3);
        recorder.note_on(&note("C4"), 5.1);
        let summary = recorder.stop(6.2, &layout).unwrap();

        assert_eq!(summary.note_count, 2);
        assert!(!recorder.is_recording());
        assert_eq!(recorder.pending_count(), 0);

        // Finalized in order of start time
        let log = recorder.log();
        assert_eq!(log[0].note, note("C4"));
        assert!((log[0].start - 0.1).abs() < EPSILON);
        assert!((log[0].duration - 1.1).abs() < EPSILON);
        assert_eq!(log[1].note, note("G4"));
        assert!((log[1].duration - 0.9).abs() < EPSILON);
    }

    #[test]
    fn test_stop_without_recording_is_rejected() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();
        assert!(matches!(
            recorder.stop(1.0, &layout),
            Err(PianoError::NotRecording)
        ));
    }

    #[test]
    fn test_new_session_replaces_log() {
        let layout = KeyLayout::two_octaves();
        let mut recorder = Recorder::new();

        recorder.start(0.0);
        recorder.note_on(&note("C4"), 0.0);
        recorder.note_off(&note("C4"), 0.5, &layout);
        recorder.note_on(&note("D4"), 0.6);
        recorder.stop(0.7, &layout).unwrap();
        assert_eq!(recorder.log().len(), 2);

        recorder.start(1.0);
        assert!(recorder.log().is_empty());
        assert_eq!(recorder.pending_count(), 0);
    }

    #[test]
    fn test_summary_status_text() {
        assert_eq!(
            RecordingSummary { note_count: 0 }.status_text(),
            "Stopped. No notes recorded."
        );
        assert_eq!(
            RecordingSummary { note_count: 3 }.status_text(),
            "Stopped. Recorded 3 notes."
        );
    }
}
