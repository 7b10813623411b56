// Virtual Piano - Library exports for the app, tests and benchmarks

pub mod audio;
pub mod config;
pub mod error;
pub mod messaging;
pub mod note;
pub mod sequencer;
pub mod session;
pub mod synth;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::engine::AudioEngine;
pub use audio::timing::AudioTiming;
pub use config::PianoConfig;
pub use error::{PianoError, PianoResult};
pub use messaging::channels::{create_command_channel, create_ui_channel};
pub use messaging::command::Command;
pub use note::{FrequencyLookup, KeyBinding, KeyLayout, NoteName};
pub use sequencer::{Lesson, LessonStep, RecordedEvent, Speed};
pub use session::{Feedback, FeedbackEvent, FeedbackLog, PianoSession};
pub use synth::envelope::PluckParams;
pub use synth::oscillator::{Oscillator, SimpleOscillator, WaveType};
pub use synth::voice::Voice;
pub use synth::voice_engine::VoiceEngine;
