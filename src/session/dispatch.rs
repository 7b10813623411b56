// Command dispatch - Applies UI commands to the session

use super::{Feedback, PianoSession};
use crate::error::PianoResult;
use crate::messaging::command::Command;

impl<F: Feedback> PianoSession<F> {
    /// Apply one command; rejections come back as errors with no state change
    pub fn apply(&mut self, command: Command) -> PianoResult<()> {
        match command {
            Command::NoteOn { note, frequency } => self.note_on(&note, frequency),
            Command::NoteOff(note) => self.note_off_request(&note),
            Command::SetSustain(on) => self.set_sustain(on),
            Command::StartRecording => self.start_recording()?,
            Command::StopRecording => {
                self.stop_recording()?;
            }
            Command::Play => {
                self.play()?;
            }
            Command::StopPlayback => self.stop_playback()?,
            Command::StartLesson => {
                self.start_lesson()?;
            }
            Command::SetSpeed(value) => {
                self.set_speed(value)?;
            }
            Command::SetLoop(enabled) => self.set_loop(enabled),
            Command::SetWaveType(wave_type) => self.set_wave_type(wave_type),
        }
        Ok(())
    }
}
