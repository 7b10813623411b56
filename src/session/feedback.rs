// Feedback sinks - Where the session reports key highlights, status lines and
// transport changes

use crate::messaging::channels::{DropCounter, SharedUiUpdateProducer};
use crate::messaging::notification::{Notification, TransportSnapshot, UiUpdate};
use crate::note::NoteName;
use ringbuf::traits::Producer;

/// Outbound interface of the session
pub trait Feedback {
    /// Called when a voice really starts (`true`) or is really released (`false`)
    fn set_pressed(&mut self, note: &NoteName, pressed: bool);

    fn set_status(&mut self, notification: Notification);

    fn transport_changed(&mut self, _snapshot: TransportSnapshot) {}
}

/// Forwards everything to the UI thread through the lock-free update channel
///
/// The producer is shared with the stream error callback, so it sits behind a
/// mutex that is only ever `try_lock`ed.
pub struct ChannelFeedback {
    tx: SharedUiUpdateProducer,
    dropped: DropCounter,
}

impl ChannelFeedback {
    pub fn new(tx: SharedUiUpdateProducer, dropped: DropCounter) -> Self {
        Self { tx, dropped }
    }

    fn push(&mut self, update: UiUpdate) {
        // Never block the audio thread; a full or busy channel loses the update
        let pushed = match self.tx.try_lock() {
            Ok(mut tx) => tx.try_push(update).is_ok(),
            Err(_) => false,
        };
        if !pushed {
            self.dropped.record();
        }
    }
}

impl Feedback for ChannelFeedback {
    fn set_pressed(&mut self, note: &NoteName, pressed: bool) {
        let update = if pressed {
            UiUpdate::KeyPressed(note.clone())
        } else {
            UiUpdate::KeyReleased(note.clone())
        };
        self.push(update);
    }

    fn set_status(&mut self, notification: Notification) {
        self.push(UiUpdate::Status(notification));
    }

    fn transport_changed(&mut self, snapshot: TransportSnapshot) {
        self.push(UiUpdate::Transport(snapshot));
    }
}

/// One thing the session reported
#[derive(Debug, Clone)]
pub enum FeedbackEvent {
    Pressed(NoteName),
    Released(NoteName),
    Status(Notification),
    Transport(TransportSnapshot),
}

/// Keeps every report in memory, for headless runs and tests
#[derive(Debug, Default)]
pub struct FeedbackLog {
    events: Vec<FeedbackEvent>,
    pressed: Vec<NoteName>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[FeedbackEvent] {
        &self.events
    }

    /// Status texts in the order they were set
    pub fn statuses(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                FeedbackEvent::Status(notification) => Some(notification.message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses().last().copied()
    }

    pub fn last_transport(&self) -> Option<TransportSnapshot> {
        self.events.iter().rev().find_map(|event| match event {
            FeedbackEvent::Transport(snapshot) => Some(*snapshot),
            _ => None,
        })
    }

    /// Keys currently highlighted
    pub fn pressed_notes(&self) -> &[NoteName] {
        &self.pressed
    }

    pub fn is_pressed(&self, note: &NoteName) -> bool {
        self.pressed.contains(note)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Feedback for FeedbackLog {
    fn set_pressed(&mut self, note: &NoteName, pressed: bool) {
        if pressed {
            if !self.pressed.contains(note) {
                self.pressed.push(note.clone());
            }
            self.events.push(FeedbackEvent::Pressed(note.clone()));
        } else {
            self.pressed.retain(|held| held != note);
            self.events.push(FeedbackEvent::Released(note.clone()));
        }
    }

    fn set_status(&mut self, notification: Notification) {
        self.events.push(FeedbackEvent::Status(notification));
    }

    fn transport_changed(&mut self, snapshot: TransportSnapshot) {
        self.events.push(FeedbackEvent::Transport(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::{DropCounter, create_ui_channel};
    use crate::messaging::notification::NotificationCategory;
    use ringbuf::traits::Consumer;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_channel_feedback_forwards_updates() {
        let (tx, mut rx) = create_ui_channel(8);
        let mut feedback = ChannelFeedback::new(Arc::new(Mutex::new(tx)), DropCounter::new());

        feedback.set_pressed(&NoteName::from("C4"), true);
        feedback.set_status(Notification::info(
            NotificationCategory::Generic,
            "Hello".to_string(),
        ));

        assert!(matches!(rx.try_pop(), Some(UiUpdate::KeyPressed(n)) if n.as_str() == "C4"));
        assert!(matches!(rx.try_pop(), Some(UiUpdate::Status(n)) if n.message == "Hello"));
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_channel_feedback_counts_dropped_updates() {
        let (tx, _rx) = create_ui_channel(1);
        let dropped = DropCounter::new();
        let mut feedback = ChannelFeedback::new(Arc::new(Mutex::new(tx)), dropped.clone());

        feedback.transport_changed(TransportSnapshot::default());
        feedback.transport_changed(TransportSnapshot::default());
        assert_eq!(dropped.total(), 1);

        // A busy producer counts as a drop too
        let shared = Arc::new(Mutex::new(create_ui_channel(8).0));
        let mut feedback = ChannelFeedback::new(shared.clone(), dropped.clone());
        let _guard = shared.lock().unwrap();
        feedback.set_pressed(&NoteName::from("C4"), false);
        assert_eq!(dropped.total(), 2);
    }

    #[test]
    fn test_feedback_log_tracks_pressed_keys() {
        let mut log = FeedbackLog::new();
        let c4 = NoteName::from("C4");

        log.set_pressed(&c4, true);
        assert!(log.is_pressed(&c4));
        log.set_pressed(&c4, false);
        assert!(!log.is_pressed(&c4));
        assert_eq!(log.events().len(), 2);
    }

    #[test]
    fn test_feedback_log_statuses() {
        let mut log = FeedbackLog::new();
        assert_eq!(log.last_status(), None);

        log.set_status(Notification::info(NotificationCategory::Playback, "A".to_string()));
        log.set_status(Notification::info(NotificationCategory::Playback, "B".to_string()));
        assert_eq!(log.statuses(), vec!["A", "B"]);
        assert_eq!(log.last_status(), Some("B"));
    }
}
