// Command types - UI → audio thread

use crate::note::NoteName;
use crate::synth::oscillator::WaveType;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Live key press (already debounced by the input adapter)
    NoteOn { note: NoteName, frequency: f32 },
    /// Live key release, routed through the sustain pedal
    NoteOff(NoteName),
    SetSustain(bool),
    StartRecording,
    StopRecording,
    Play,
    StopPlayback,
    StartLesson,
    SetSpeed(f64),
    SetLoop(bool),
    SetWaveType(WaveType),
}
