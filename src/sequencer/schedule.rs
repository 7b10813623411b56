// Schedule planning - Pure conversion of recorded offsets into playback delays
//
// Nothing here touches a clock or a timer: a plan is a list of delays (seconds
// from cycle start) that the caller turns into timer tasks.

use super::lesson::LessonStep;
use super::recorder::RecordedEvent;
use crate::error::{PianoError, PianoResult};
use crate::note::{FrequencyLookup, NoteName};
use std::fmt;

/// Guard added after the last note so its release tail can finish, in seconds
pub const CYCLE_TAIL: f64 = 0.2;

/// Playback speed multiplier, always finite and above zero
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Speed(f64);

impl Speed {
    pub const NORMAL: Speed = Speed(1.0);

    pub fn new(value: f64) -> PianoResult<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(PianoError::InvalidSpeed(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Convert a recorded offset into a playback delay
    #[inline]
    pub fn scale(self, offset: f64) -> f64 {
        offset / self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.0)
    }
}

/// One note of a plan
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNote {
    pub note: NoteName,
    pub frequency: f32,
    /// Seconds from cycle start
    pub start_delay: f64,
    /// Seconds from cycle start
    pub stop_delay: f64,
}

/// Everything needed to run one pass
#[derive(Debug, Clone, PartialEq)]
pub struct CyclePlan {
    pub notes: Vec<ScheduledNote>,
    /// Seconds from cycle start until the pass is over (tail included)
    pub total: f64,
}

/// Plan one playback pass of `log` at `speed`; `None` for an empty log
pub fn plan_cycle(log: &[RecordedEvent], speed: Speed) -> Option<CyclePlan> {
    if log.is_empty() {
        return None;
    }

    let notes = log
        .iter()
        .map(|event| {
            let start_delay = speed.scale(event.start);
            ScheduledNote {
                note: event.note.clone(),
                frequency: event.frequency,
                start_delay,
                stop_delay: start_delay + speed.scale(event.duration),
            }
        })
        .collect();

    let latest_end = log.iter().map(RecordedEvent::end).fold(0.0, f64::max);

    Some(CyclePlan {
        notes,
        total: speed.scale(latest_end) + CYCLE_TAIL,
    })
}

/// Plan a lesson run at normal speed, steps back to back
///
/// Steps whose note has no frequency are skipped without taking up time.
pub fn plan_lesson(steps: &[LessonStep], lookup: &dyn FrequencyLookup) -> Option<CyclePlan> {
    let mut cursor = 0.0;
    let mut notes = Vec::with_capacity(steps.len());

    for step in steps {
        let Some(frequency) = lookup.frequency_of(&step.note) else {
            continue;
        };
        notes.push(ScheduledNote {
            note: step.note.clone(),
            frequency,
            start_delay: cursor,
            stop_delay: cursor + step.duration,
        });
        cursor += step.duration;
    }

    if notes.is_empty() {
        return None;
    }

    Some(CyclePlan {
        notes,
        total: cursor + CYCLE_TAIL,
    })
}
