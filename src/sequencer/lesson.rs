// Lesson - Fixed melody played once so the user can watch the keys

use super::timer::CycleId;
use crate::note::NoteName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonStep {
    pub note: NoteName,
    /// Seconds
    pub duration: f64,
}

impl LessonStep {
    pub fn new(note: &str, duration: f64) -> Self {
        Self {
            note: NoteName::new(note),
            duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lesson {
    pub title: String,
    pub steps: Vec<LessonStep>,
}

impl Lesson {
    /// First phrase of "Twinkle Twinkle Little Star"
    pub fn twinkle() -> Self {
        let steps = [
            ("C4", 0.5),
            ("C4", 0.5),
            ("G4", 0.5),
            ("G4", 0.5),
            ("A4", 0.5),
            ("A4", 0.5),
            ("G4", 1.0),
            ("F4", 0.5),
            ("F4", 0.5),
            ("E4", 0.5),
            ("E4", 0.5),
            ("D4", 0.5),
            ("D4", 0.5),
            ("C4", 1.0),
        ]
        .into_iter()
        .map(|(note, duration)| LessonStep::new(note, duration))
        .collect();

        Self {
            title: "Twinkle Twinkle Little Star".to_string(),
            steps,
        }
    }

    pub fn start_status(&self) -> String {
        format!("Lesson: {} (watch the keys!)", self.title)
    }
}

impl Default for Lesson {
    fn default() -> Self {
        Self::twinkle()
    }
}

pub const LESSON_FINISHED_STATUS: &str = "Lesson finished. Try playing it yourself!";
pub const LESSON_NOTHING_TO_PLAY_STATUS: &str =
    "Nothing to play. The lesson has no playable notes.";

/// Tracks the lesson run currently in flight
#[derive(Debug, Default)]
pub struct LessonPlayer {
    running: Option<CycleId>,
}

impl LessonPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn begin(&mut self, cycle: CycleId) {
        self.running = Some(cycle);
    }

    /// Returns true if `cycle` was the run in flight
    pub fn finish(&mut self, cycle: CycleId) -> bool {
        if self.running == Some(cycle) {
            self.running = None;
            true
        } else {
            false
        }
    }
}
