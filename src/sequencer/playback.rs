// Playback Scheduler - Replays the recording log through timer tasks
//
// Each pass (cycle) is planned up front: one note-on and one note-off task per
// recorded event plus a cycle-end task. The speed is captured when the pass is
// planned; the loop flag is read when the pass ends.

use super::recorder::RecordedEvent;
use super::schedule::{Speed, plan_cycle};
use super::timer::{CycleId, TimerAction, TimerQueue};
use crate::error::{PianoError, PianoResult};
use crate::note::NoteName;

pub const PLAYBACK_FINISHED_STATUS: &str = "Playback finished.";
pub const PLAYBACK_STOPPED_STATUS: &str = "Playback stopped.";
pub const NOTHING_TO_PLAY_STATUS: &str = "Nothing to play. Record something first.";

/// Status line shown when a pass starts
pub fn playing_status(speed: Speed, looping: bool) -> String {
    if looping {
        format!("Playing (looping) at {}...", speed)
    } else {
        format!("Playing at {}...", speed)
    }
}

/// The pass currently in flight
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveCycle {
    id: CycleId,
    speed: Speed,
}

/// What happened when a cycle-end task fired
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Looping: a new pass was scheduled
    Restarted { cycle: CycleId, speed: Speed },
    /// Playback is over
    Finished,
    /// The task belonged to a pass that is no longer current
    Stale,
}

#[derive(Debug)]
pub struct PlaybackScheduler {
    speed: Speed,
    loop_enabled: bool,
    current: Option<ActiveCycle>,
    cycles_started: u64,
}

impl PlaybackScheduler {
    pub fn new(speed: Speed, loop_enabled: bool) -> Self {
        Self {
            speed,
            loop_enabled,
            current: None,
            cycles_started: 0,
        }
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Takes effect at the next pass
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_cycle(&self) -> Option<CycleId> {
        self.current.map(|c| c.id)
    }

    /// Speed frozen for the pass in flight
    pub fn cycle_speed(&self) -> Option<Speed> {
        self.current.map(|c| c.speed)
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles_started
    }

    /// Start playback; rejected if a pass is already in flight or the log is empty
    pub fn play(
        &mut self,
        log: &[RecordedEvent],
        timers: &mut TimerQueue,
        now: f64,
    ) -> PianoResult<CycleId> {
        if self.is_playing() {
            return Err(PianoError::PlaybackActive);
        }
        self.start_cycle(log, timers, now)
    }

    fn start_cycle(
        &mut self,
        log: &[RecordedEvent],
        timers: &mut TimerQueue,
        now: f64,
    ) -> PianoResult<CycleId> {
        let speed = self.speed;
        let plan = plan_cycle(log, speed).ok_or(PianoError::NothingToPlay)?;
        let id = timers.next_cycle_id();

        for scheduled in plan.notes {
            timers.schedule(
                now + scheduled.start_delay,
                id,
                TimerAction::NoteOn {
                    note: scheduled.note.clone(),
                    frequency: scheduled.frequency,
                },
            );
            timers.schedule(
                now + scheduled.stop_delay,
                id,
                TimerAction::NoteOff {
                    note: scheduled.note,
                },
            );
        }
        timers.schedule(now + plan.total, id, TimerAction::CycleEnd);

        self.current = Some(ActiveCycle {
            id,
            speed,
        });
        self.cycles_started += 1;
        Ok(id)
    }

    /// Handle the cycle-end task of `cycle`
    pub fn on_cycle_end(
        &mut self,
        cycle: CycleId,
        log: &[RecordedEvent],
        timers: &mut TimerQueue,
        now: f64,
    ) -> CycleOutcome {
        if self.current_cycle() != Some(cycle) {
            return CycleOutcome::Stale;
        }

        self.current = None;
        if !self.loop_enabled {
            return CycleOutcome::Finished;
        }

        match self.start_cycle(log, timers, now) {
            Ok(cycle) => CycleOutcome::Restarted {
                cycle,
                speed: self.speed,
            },
            Err(_) => CycleOutcome::Finished,
        }
    }

    /// Cancel the pass in flight
    ///
    /// Returns the notes that pass had started and not yet stopped; the caller
    /// releases them.
    pub fn stop(&mut self, timers: &mut TimerQueue) -> PianoResult<Vec<NoteName>> {
        let active = self.current.take().ok_or(PianoError::NotPlaying)?;
        let cancelled = timers.cancel_cycle(active.id);

        // A note is still sounding when more of its note-offs than note-ons are pending
        let mut balance: Vec<(NoteName, i32)> = Vec::new();
        for task in &cancelled {
            let delta = match &task.action {
                TimerAction::NoteOff { .. } => 1,
                TimerAction::NoteOn { .. } => -1,
                _ => continue,
            };
            let Some(note) = task.action.note() else {
                continue;
            };
            match balance.iter_mut().find(|(n, _)| n == note) {
                Some((_, count)) => *count += delta,
                None => balance.push((note.clone(), delta)),
            }
        }

        Ok(balance
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(note, _)| note)
            .collect())
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new(Speed::NORMAL, false)
    }
}
