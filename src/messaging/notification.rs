// Notifications - Audio thread → UI updates

use crate::note::NoteName;
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// What part of the piano a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Recording,
    Playback,
    Lesson,
    Sound,
    Audio,
    Generic,
}

/// Status message with timestamp and metadata
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: NotificationCategory,
    pub message: String,
    pub timestamp: u64, // Unix timestamp in milliseconds
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl Notification {
    pub fn new(level: NotificationLevel, category: NotificationCategory, message: String) -> Self {
        Self {
            level,
            category,
            message,
            timestamp: now_millis(),
        }
    }

    pub fn info(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Info, category, message)
    }

    pub fn warning(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Warning, category, message)
    }

    pub fn error(category: NotificationCategory, message: String) -> Self {
        Self::new(NotificationLevel::Error, category, message)
    }
}

/// Transport state after a transition, used to enable/disable controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    pub recording: bool,
    pub playing_back: bool,
    pub lesson_running: bool,
    pub sustain: bool,
    pub loop_enabled: bool,
    pub speed: f64,
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            recording: false,
            playing_back: false,
            lesson_running: false,
            sustain: false,
            loop_enabled: false,
            speed: 1.0,
        }
    }
}

/// Everything the audio thread reports back to the UI
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Status(Notification),
    KeyPressed(NoteName),
    KeyReleased(NoteName),
    Transport(TransportSnapshot),
}
