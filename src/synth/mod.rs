// Synthesis module - Oscillators, envelopes and voice lifecycle

pub mod envelope;
pub mod oscillator;
pub mod sustain;
pub mod voice;
pub mod voice_engine;
