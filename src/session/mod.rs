// Piano Session - Note lifecycle, recording and replay on one logical clock
//
// The session is driven by `advance_to(now)`: due timer tasks fire in order, each
// one seeing the session clock set to its own due time. Live input goes through
// the sustain controller and the recorder; playback and lesson tasks drive the
// voice engine directly.

pub mod dispatch;
pub mod feedback;

pub use feedback::{ChannelFeedback, Feedback, FeedbackEvent, FeedbackLog};

use crate::config::PianoConfig;
use crate::error::{PianoError, PianoResult};
use crate::messaging::notification::{Notification, NotificationCategory, TransportSnapshot};
use crate::note::{KeyLayout, NoteName};
use crate::sequencer::lesson::{LESSON_FINISHED_STATUS, LESSON_NOTHING_TO_PLAY_STATUS};
use crate::sequencer::playback::{
    NOTHING_TO_PLAY_STATUS, PLAYBACK_FINISHED_STATUS, PLAYBACK_STOPPED_STATUS, playing_status,
};
use crate::sequencer::schedule::plan_lesson;
use crate::sequencer::{
    CycleId, CycleOutcome, Lesson, LessonPlayer, PlaybackScheduler, RecordedEvent, Recorder,
    RecordingSummary, Speed, TimerAction, TimerQueue, TimerTask,
};
use crate::synth::oscillator::WaveType;
use crate::synth::sustain::{NoteOffDecision, SustainController};
use crate::synth::voice_engine::VoiceEngine;

pub const READY_STATUS: &str = "Ready. Play notes or start recording.";
pub const RECORDING_STATUS: &str = "Recording... Play your melody.";

pub struct PianoSession<F: Feedback> {
    voices: VoiceEngine,
    sustain: SustainController,
    recorder: Recorder,
    playback: PlaybackScheduler,
    lesson_player: LessonPlayer,
    timers: TimerQueue,
    layout: KeyLayout,
    lesson: Lesson,
    feedback: F,
    now: f64,
}

impl<F: Feedback> PianoSession<F> {
    pub fn new(config: &PianoConfig, sample_rate: f32, feedback: F) -> Self {
        let speed = Speed::new(config.speed).unwrap_or_else(|e| {
            log::warn!("{}, falling back to 1.0x", e);
            Speed::NORMAL
        });

        let mut voices = VoiceEngine::with_params(sample_rate, config.envelope.sanitized());
        voices.set_wave_type(config.wave_type);

        let mut session = Self {
            voices,
            sustain: SustainController::new(),
            recorder: Recorder::new(),
            playback: PlaybackScheduler::new(speed, config.loop_enabled),
            lesson_player: LessonPlayer::new(),
            timers: TimerQueue::new(),
            layout: config.layout(),
            lesson: config.lesson.clone(),
            feedback,
            now: 0.0,
        };

        session.status(NotificationCategory::Generic, READY_STATUS.to_string());
        session.publish_transport();
        session
    }

    // ---- Clock ----

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward, firing every task due at or before `now`
    ///
    /// Times earlier than the current clock are ignored.
    pub fn advance_to(&mut self, now: f64) {
        if now < self.now {
            return;
        }

        while let Some(task) = self.timers.pop_due(now) {
            self.now = task.due.max(self.now);
            self.fire(task);
        }

        self.now = now;
        self.voices.collect_finished(now);
    }

    /// Mono sample at the current clock
    pub fn next_sample(&mut self) -> f32 {
        self.voices.next_sample(self.now)
    }

    /// Render consecutive samples starting at `start`, advancing the clock per sample
    pub fn render(&mut self, start: f64, sample_rate: f32, out: &mut [f32]) {
        let step = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            self.advance_to(start + i as f64 * step);
            *sample = self.next_sample();
        }
    }

    // ---- Live input ----

    /// Live key press
    pub fn note_on(&mut self, note: &NoteName, frequency: f32) {
        if self.voices.note_on(note, frequency, self.now) {
            self.feedback.set_pressed(note, true);
        }
        self.recorder.note_on(note, self.now);
    }

    /// Live key release, held back while the sustain pedal is down
    pub fn note_off_request(&mut self, note: &NoteName) {
        match self.sustain.note_off_request(note) {
            NoteOffDecision::Release(note) => self.release_live(&note),
            NoteOffDecision::Deferred => {}
        }
    }

    pub fn set_sustain(&mut self, on: bool) {
        for note in self.sustain.set_sustain(on) {
            self.release_live(&note);
        }
        self.publish_transport();
    }

    fn release_live(&mut self, note: &NoteName) {
        self.release_voice(note);
        self.recorder.note_off(note, self.now, &self.layout);
    }

    fn release_voice(&mut self, note: &NoteName) {
        if self.voices.note_off(note, self.now) {
            self.feedback.set_pressed(note, false);
        }
    }

    // ---- Recording ----

    /// Start a new take; the previous log is discarded
    pub fn start_recording(&mut self) -> PianoResult<()> {
        if self.playback.is_playing() {
            return self.reject(PianoError::PlaybackActive);
        }
        if self.recorder.is_recording() {
            return self.reject(PianoError::RecordingActive);
        }

        self.recorder.start(self.now);
        log::debug!("Recording started at {:.3}s", self.now);
        self.status(NotificationCategory::Recording, RECORDING_STATUS.to_string());
        self.publish_transport();
        Ok(())
    }

    pub fn stop_recording(&mut self) -> PianoResult<RecordingSummary> {
        let summary = match self.recorder.stop(self.now, &self.layout) {
            Ok(summary) => summary,
            Err(e) => return self.reject(e),
        };

        log::debug!("Recording stopped: {} notes", summary.note_count);
        self.status(NotificationCategory::Recording, summary.status_text());
        self.publish_transport();
        Ok(summary)
    }

    pub fn recording_log(&self) -> &[RecordedEvent] {
        self.recorder.log()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    // ---- Playback ----

    pub fn play(&mut self) -> PianoResult<CycleId> {
        if self.recorder.is_recording() {
            return self.reject(PianoError::RecordingActive);
        }

        match self
            .playback
            .play(self.recorder.log(), &mut self.timers, self.now)
        {
            Ok(cycle) => {
                let speed = self.playback.speed();
                let looping = self.playback.loop_enabled();
                log::debug!("Playback started at {} (loop: {})", speed, looping);
                self.status(NotificationCategory::Playback, playing_status(speed, looping));
                self.publish_transport();
                Ok(cycle)
            }
            Err(PianoError::NothingToPlay) => {
                self.feedback.set_status(Notification::warning(
                    NotificationCategory::Playback,
                    NOTHING_TO_PLAY_STATUS.to_string(),
                ));
                self.reject(PianoError::NothingToPlay)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Cancel the pass in flight and release what it was holding
    pub fn stop_playback(&mut self) -> PianoResult<()> {
        let sounding = match self.playback.stop(&mut self.timers) {
            Ok(notes) => notes,
            Err(e) => return self.reject(e),
        };

        for note in &sounding {
            self.release_voice(note);
        }

        log::debug!("Playback stopped, released {} notes", sounding.len());
        self.status(NotificationCategory::Playback, PLAYBACK_STOPPED_STATUS.to_string());
        self.publish_transport();
        Ok(())
    }

    pub fn is_playing_back(&self) -> bool {
        self.playback.is_playing()
    }

    /// Speed for the next pass; the pass in flight keeps its own
    pub fn set_speed(&mut self, value: f64) -> PianoResult<Speed> {
        let speed = match Speed::new(value) {
            Ok(speed) => speed,
            Err(e) => return self.reject(e),
        };
        self.playback.set_speed(speed);
        self.publish_transport();
        Ok(speed)
    }

    pub fn speed(&self) -> Speed {
        self.playback.speed()
    }

    /// Read when the current pass ends
    pub fn set_loop(&mut self, enabled: bool) {
        self.playback.set_loop(enabled);
        let text = if enabled {
            "Loop mode: ON"
        } else {
            "Loop mode: OFF"
        };
        self.status(NotificationCategory::Playback, text.to_string());
        self.publish_transport();
    }

    pub fn loop_enabled(&self) -> bool {
        self.playback.loop_enabled()
    }

    // ---- Lesson ----

    pub fn start_lesson(&mut self) -> PianoResult<CycleId> {
        if self.recorder.is_recording() {
            return self.reject(PianoError::RecordingActive);
        }
        if self.playback.is_playing() {
            return self.reject(PianoError::PlaybackActive);
        }
        if self.lesson_player.is_running() {
            return self.reject(PianoError::LessonActive);
        }

        let Some(plan) = plan_lesson(&self.lesson.steps, &self.layout) else {
            self.feedback.set_status(Notification::warning(
                NotificationCategory::Lesson,
                LESSON_NOTHING_TO_PLAY_STATUS.to_string(),
            ));
            return self.reject(PianoError::NothingToPlay);
        };

        let cycle = self.timers.next_cycle_id();
        for scheduled in plan.notes {
            self.timers.schedule(
                self.now + scheduled.start_delay,
                cycle,
                TimerAction::NoteOn {
                    note: scheduled.note.clone(),
                    frequency: scheduled.frequency,
                },
            );
            self.timers.schedule(
                self.now + scheduled.stop_delay,
                cycle,
                TimerAction::NoteOff {
                    note: scheduled.note,
                },
            );
        }
        self.timers
            .schedule(self.now + plan.total, cycle, TimerAction::LessonEnd);
        self.lesson_player.begin(cycle);

        log::debug!("Lesson '{}' started", self.lesson.title);
        let text = self.lesson.start_status();
        self.status(NotificationCategory::Lesson, text);
        self.publish_transport();
        Ok(cycle)
    }

    pub fn is_lesson_running(&self) -> bool {
        self.lesson_player.is_running()
    }

    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    // ---- Sound ----

    /// Affects voices started from now on
    pub fn set_wave_type(&mut self, wave_type: WaveType) {
        self.voices.set_wave_type(wave_type);
        self.status(NotificationCategory::Sound, format!("Sound type: {}", wave_type));
    }

    pub fn wave_type(&self) -> WaveType {
        self.voices.wave_type()
    }

    // ---- Inspection ----

    pub fn is_sustained(&self) -> bool {
        self.sustain.is_engaged()
    }

    pub fn sustained_notes(&self) -> &[NoteName] {
        self.sustain.held_notes()
    }

    pub fn voice_engine(&self) -> &VoiceEngine {
        &self.voices
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Timer tasks not yet fired
    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    pub fn next_due(&self) -> Option<f64> {
        self.timers.next_due()
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    pub fn transport(&self) -> TransportSnapshot {
        TransportSnapshot {
            recording: self.recorder.is_recording(),
            playing_back: self.playback.is_playing(),
            lesson_running: self.lesson_player.is_running(),
            sustain: self.sustain.is_engaged(),
            loop_enabled: self.playback.loop_enabled(),
            speed: self.playback.speed().get(),
        }
    }

    // ---- Internals ----

    fn fire(&mut self, task: TimerTask) {
        match task.action {
            TimerAction::NoteOn { note, frequency } => {
                if self.voices.note_on(&note, frequency, self.now) {
                    self.feedback.set_pressed(&note, true);
                }
            }
            TimerAction::NoteOff { note } => self.release_voice(&note),
            TimerAction::CycleEnd => self.end_cycle(task.cycle),
            TimerAction::LessonEnd => {
                if self.lesson_player.finish(task.cycle) {
                    log::debug!("Lesson finished");
                    self.status(NotificationCategory::Lesson, LESSON_FINISHED_STATUS.to_string());
                    self.publish_transport();
                }
            }
        }
    }

    fn end_cycle(&mut self, cycle: CycleId) {
        let outcome =
            self.playback
                .on_cycle_end(cycle, self.recorder.log(), &mut self.timers, self.now);

        match outcome {
            CycleOutcome::Restarted { speed, .. } => {
                log::debug!("Playback looped at {}", speed);
                self.status(NotificationCategory::Playback, playing_status(speed, true));
            }
            CycleOutcome::Finished => {
                log::debug!("Playback finished");
                self.status(NotificationCategory::Playback, PLAYBACK_FINISHED_STATUS.to_string());
                self.publish_transport();
            }
            CycleOutcome::Stale => {}
        }
    }

    fn status(&mut self, category: NotificationCategory, text: String) {
        self.feedback.set_status(Notification::info(category, text));
    }

    fn publish_transport(&mut self) {
        let snapshot = self.transport();
        self.feedback.transport_changed(snapshot);
    }

    fn reject<T>(&self, error: PianoError) -> PianoResult<T> {
        log::debug!("Rejected at {:.3}s: {}", self.now, error);
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;
    const EPSILON: f64 = 1e-9;

    fn session() -> PianoSession<FeedbackLog> {
        PianoSession::new(&PianoConfig::default(), SAMPLE_RATE, FeedbackLog::new())
    }

    fn note(name: &str) -> NoteName {
        NoteName::from(name)
    }

    #[test]
    fn test_new_session_is_ready() {
        let session = session();
        assert_eq!(session.feedback().last_status(), Some(READY_STATUS));
        assert!(!session.is_sustained());
        assert!(!session.is_recording());
        assert_eq!(session.feedback().last_transport(), Some(session.transport()));
    }

    #[test]
    fn test_note_on_marks_key_pressed_once() {
        let mut session = session();
        let c4 = note("C4");

        session.note_on(&c4, 261.63);
        session.note_on(&c4, 261.63);
        assert_eq!(session.voice_engine().active_voice_count(), 1);
        let presses = session
            .feedback()
            .events()
            .iter()
            .filter(|e| matches!(e, FeedbackEvent::Pressed(_)))
            .count();
        assert_eq!(presses, 1);
    }

    #[test]
    fn test_invalid_frequency_is_silent() {
        let mut session = session();
        session.note_on(&note("C4"), f32::NAN);
        session.note_on(&note("D4"), -1.0);
        assert_eq!(session.voice_engine().active_voice_count(), 0);
        assert!(session.feedback().pressed_notes().is_empty());
    }

    #[test]
    fn test_sustain_defers_release() {
        let mut session = session();
        let c4 = note("C4");

        session.set_sustain(true);
        session.note_on(&c4, 261.63);
        session.note_off_request(&c4);
        assert!(session.voice_engine().is_sounding(&c4));
        assert_eq!(session.sustained_notes(), &[c4.clone()]);

        session.set_sustain(false);
        assert!(!session.voice_engine().is_sounding(&c4));
        assert!(session.sustained_notes().is_empty());
        assert!(!session.feedback().is_pressed(&c4));
    }

    #[test]
    fn test_record_and_stop() {
        let mut session = session();
        let c4 = note("C4");

        session.start_recording().unwrap();
        assert_eq!(session.feedback().last_status(), Some(RECORDING_STATUS));
        session.note_on(&c4, 261.63);
        session.advance_to(0.5);
        session.note_off_request(&c4);
        let summary = session.stop_recording().unwrap();

        assert_eq!(summary.note_count, 1);
        assert_eq!(session.feedback().last_status(), Some("Stopped. Recorded 1 notes."));
        let event = &session.recording_log()[0];
        assert_eq!(event.note, c4);
        assert!((event.duration - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_stop_recording_when_idle_is_rejected() {
        let mut session = session();
        assert!(matches!(session.stop_recording(), Err(PianoError::NotRecording)));
    }

    #[test]
    fn test_play_empty_log_sets_status() {
        let mut session = session();
        assert!(matches!(session.play(), Err(PianoError::NothingToPlay)));
        assert_eq!(session.feedback().last_status(), Some(NOTHING_TO_PLAY_STATUS));
        assert!(!session.is_playing_back());
    }

    #[test]
    fn test_play_rejected_while_recording() {
        let mut session = session();
        session.start_recording().unwrap();
        assert!(matches!(session.play(), Err(PianoError::RecordingActive)));
    }

    #[test]
    fn test_record_rejected_while_playing() {
        let mut session = session();
        session.start_recording().unwrap();
        session.note_on(&note("C4"), 261.63);
        session.advance_to(0.3);
        session.note_off_request(&note("C4"));
        session.stop_recording().unwrap();

        session.play().unwrap();
        assert!(matches!(
            session.start_recording(),
            Err(PianoError::PlaybackActive)
        ));
        assert!(session.is_playing_back());
        assert!(!session.is_recording());
    }

    #[test]
    fn test_invalid_speed_keeps_previous() {
        let mut session = session();
        session.set_speed(1.5).unwrap();
        assert!(matches!(session.set_speed(0.0), Err(PianoError::InvalidSpeed(_))));
        assert!(matches!(session.set_speed(f64::NAN), Err(PianoError::InvalidSpeed(_))));
        assert_eq!(session.speed().get(), 1.5);
    }

    #[test]
    fn test_loop_and_wave_status() {
        let mut session = session();
        session.set_loop(true);
        assert_eq!(session.feedback().last_status(), Some("Loop mode: ON"));
        session.set_loop(false);
        assert_eq!(session.feedback().last_status(), Some("Loop mode: OFF"));
        session.set_wave_type(WaveType::Square);
        assert_eq!(session.feedback().last_status(), Some("Sound type: square"));
        assert_eq!(session.wave_type(), WaveType::Square);
    }

    #[test]
    fn test_clock_never_moves_back() {
        let mut session = session();
        session.advance_to(2.0);
        session.advance_to(1.0);
        assert_eq!(session.now(), 2.0);
    }

    #[test]
    fn test_render_fills_buffer() {
        let mut session = session();
        session.note_on(&note("A4"), 440.0);
        let mut out = vec![0.0; 256];
        session.render(0.0, SAMPLE_RATE, &mut out);
        assert!(out.iter().any(|s| *s != 0.0));
        assert!(out.iter().all(|s| s.is_finite()));
    }
}
