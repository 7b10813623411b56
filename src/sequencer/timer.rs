// Timer queue - Deferred note-on/note-off tasks on the session clock
//
// Every task belongs to a cycle (one playback pass or one lesson run) so a whole
// cycle can be cancelled at once. Tasks with the same due time fire in the order
// they were scheduled.

use crate::note::NoteName;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::binary_heap::PeekMut;

/// Identifies one playback pass or lesson run
pub type CycleId = u64;

/// Which edge of a note a task triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    On,
    Off,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerAction {
    NoteOn { note: NoteName, frequency: f32 },
    NoteOff { note: NoteName },
    /// End of one playback pass
    CycleEnd,
    /// End of a lesson run
    LessonEnd,
}

impl TimerAction {
    pub fn note(&self) -> Option<&NoteName> {
        match self {
            TimerAction::NoteOn { note, .. } | TimerAction::NoteOff { note } => Some(note),
            TimerAction::CycleEnd | TimerAction::LessonEnd => None,
        }
    }

    pub fn edge(&self) -> Option<Edge> {
        match self {
            TimerAction::NoteOn { .. } => Some(Edge::On),
            TimerAction::NoteOff { .. } => Some(Edge::Off),
            TimerAction::CycleEnd | TimerAction::LessonEnd => None,
        }
    }
}

/// A task popped from the queue
#[derive(Debug, Clone, PartialEq)]
pub struct TimerTask {
    /// Absolute due time in seconds
    pub due: f64,
    pub cycle: CycleId,
    pub action: TimerAction,
}

#[derive(Debug)]
struct Entry {
    task: TimerTask,
    seq: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the BinaryHeap (a max-heap) yields the earliest task first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .task
            .due
            .total_cmp(&self.task.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    next_cycle: CycleId,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh cycle id
    pub fn next_cycle_id(&mut self) -> CycleId {
        self.next_cycle += 1;
        self.next_cycle
    }

    pub fn schedule(&mut self, due: f64, cycle: CycleId, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            task: TimerTask { due, cycle, action },
            seq,
        });
    }

    /// Pop the earliest task due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<TimerTask> {
        let entry = self.heap.peek_mut()?;
        if entry.task.due > now {
            return None;
        }
        Some(PeekMut::pop(entry).task)
    }

    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.task.due)
    }

    /// Remove every pending task of `cycle`, returned in firing order
    pub fn cancel_cycle(&mut self, cycle: CycleId) -> Vec<TimerTask> {
        let (mut removed, kept): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .partition(|entry| entry.task.cycle == cycle);
        self.heap = BinaryHeap::from(kept);
        // Entry ordering is reversed: descending sort gives earliest first
        removed.sort_by(|a, b| b.cmp(a));
        removed.into_iter().map(|entry| entry.task).collect()
    }

    pub fn pending_for(&self, cycle: CycleId) -> usize {
        self.heap.iter().filter(|e| e.task.cycle == cycle).count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
