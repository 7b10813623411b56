// Sequencer module - Recording, timed replay and lessons

pub mod lesson;
pub mod playback;
pub mod recorder;
pub mod schedule;
pub mod timer;

pub use lesson::{Lesson, LessonPlayer, LessonStep};
pub use playback::{CycleOutcome, PlaybackScheduler};
pub use recorder::{MIN_NOTE_DURATION, RecordedEvent, Recorder, RecordingSummary};
pub use schedule::{CYCLE_TAIL, CyclePlan, ScheduledNote, Speed};
pub use timer::{CycleId, Edge, TimerAction, TimerQueue, TimerTask};
