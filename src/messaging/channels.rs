// Lock-free communication channels

use crate::messaging::command::Command;
use crate::messaging::notification::UiUpdate;
use ringbuf::{HeapRb, traits::Split};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub type CommandProducer = ringbuf::HeapProd<Command>;
pub type CommandConsumer = ringbuf::HeapCons<Command>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<Command>::new(capacity);
    rb.split()
}

pub type UiUpdateProducer = ringbuf::HeapProd<UiUpdate>;
pub type UiUpdateConsumer = ringbuf::HeapCons<UiUpdate>;

/// Producer shared by the session and the stream error callback
pub type SharedUiUpdateProducer = Arc<Mutex<UiUpdateProducer>>;

pub fn create_ui_channel(capacity: usize) -> (UiUpdateProducer, UiUpdateConsumer) {
    let rb = HeapRb::<UiUpdate>::new(capacity);
    rb.split()
}

/// UI updates the audio thread had to give up on, shared with the UI thread
#[derive(Debug, Clone, Default)]
pub struct DropCounter(Arc<AtomicUsize>);

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    /// Drops since the caller last looked; `seen` is the caller's watermark
    pub fn since(&self, seen: &mut usize) -> usize {
        let total = self.total();
        let new = total.saturating_sub(*seen);
        *seen = total;
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteName;
    use ringbuf::traits::{Consumer, Producer};

    #[test]
    fn test_command_round_trip() {
        let (mut tx, mut rx) = create_command_channel(4);
        tx.try_push(Command::NoteOff(NoteName::from("C4"))).unwrap();
        tx.try_push(Command::Play).unwrap();

        assert_eq!(rx.try_pop(), Some(Command::NoteOff(NoteName::from("C4"))));
        assert_eq!(rx.try_pop(), Some(Command::Play));
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_drop_counter_is_shared_between_clones() {
        let counter = DropCounter::new();
        let audio_side = counter.clone();
        let mut seen = 0;

        assert_eq!(counter.since(&mut seen), 0);
        audio_side.record();
        audio_side.record();
        assert_eq!(counter.total(), 2);
        assert_eq!(counter.since(&mut seen), 2);
        assert_eq!(counter.since(&mut seen), 0);
        audio_side.record();
        assert_eq!(counter.since(&mut seen), 1);
    }

    #[test]
    fn test_full_channel_rejects_push() {
        let (mut tx, _rx) = create_command_channel(1);
        assert!(tx.try_push(Command::Play).is_ok());
        assert!(tx.try_push(Command::Play).is_err());
    }
}
