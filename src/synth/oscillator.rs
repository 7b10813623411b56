// Oscillators - Waveform generators

use crate::error::PianoError;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

pub trait Oscillator {
    fn next_sample(&mut self) -> f32;
    fn set_frequency(&mut self, freq: f32);
    fn reset(&mut self);
}

/// Sound type selectable from the UI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveType {
    Sine,
    Square,
    Sawtooth,
    /// Plucky-ish default
    #[default]
    Triangle,
}

impl WaveType {
    pub const ALL: [WaveType; 4] = [
        WaveType::Sine,
        WaveType::Square,
        WaveType::Sawtooth,
        WaveType::Triangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WaveType::Sine => "sine",
            WaveType::Square => "square",
            WaveType::Sawtooth => "sawtooth",
            WaveType::Triangle => "triangle",
        }
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaveType {
    type Err = PianoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaveType::ALL
            .into_iter()
            .find(|wave| wave.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PianoError::UnknownWaveType(s.to_string()))
    }
}

pub struct SimpleOscillator {
    waveform: WaveType,
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
}

impl SimpleOscillator {
    pub fn new(waveform: WaveType, sample_rate: f32) -> Self {
        Self {
            waveform,
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
        }
    }

    pub fn waveform(&self) -> WaveType {
        self.waveform
    }
}

impl Oscillator for SimpleOscillator {
    fn next_sample(&mut self) -> f32 {
        let sample = match self.waveform {
            WaveType::Sine => (self.phase * 2.0 * PI).sin(),
            WaveType::Square => {
                if self.phase < 0.5 { 1.0 } else { -1.0 }
            }
            WaveType::Sawtooth => (self.phase * 2.0) - 1.0,
            WaveType::Triangle => {
                if self.phase < 0.5 {
                    (self.phase * 4.0) - 1.0
                } else {
                    3.0 - (self.phase * 4.0)
                }
            }
        };

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        sample
    }

    fn set_frequency(&mut self, freq: f32) {
        self.phase_increment = if freq.is_finite() && freq > 0.0 {
            freq / self.sample_rate
        } else {
            0.0
        };
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}
