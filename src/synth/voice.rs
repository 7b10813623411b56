// Voice - One sounding instance of a note

use super::envelope::{PluckEnvelope, PluckParams};
use super::oscillator::{Oscillator, SimpleOscillator, WaveType};
use crate::note::NoteName;

pub struct Voice {
    note: NoteName,
    frequency: f32,
    oscillator: SimpleOscillator,
    envelope: PluckEnvelope,
}

impl Voice {
    /// Start a voice at `now`; the waveform is fixed for the voice's lifetime
    pub fn start(
        note: NoteName,
        frequency: f32,
        waveform: WaveType,
        params: PluckParams,
        sample_rate: f32,
        now: f64,
    ) -> Self {
        let mut oscillator = SimpleOscillator::new(waveform, sample_rate);
        oscillator.set_frequency(frequency);
        oscillator.reset();

        Self {
            note,
            frequency,
            oscillator,
            envelope: PluckEnvelope::start(params, now),
        }
    }

    pub fn note(&self) -> &NoteName {
        &self.note
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn waveform(&self) -> WaveType {
        self.oscillator.waveform()
    }

    pub fn start_time(&self) -> f64 {
        self.envelope.started_at()
    }

    pub fn envelope(&self) -> &PluckEnvelope {
        &self.envelope
    }

    /// Begin the release tail
    pub fn release(&mut self, now: f64) {
        self.envelope.release(now);
    }

    pub fn is_releasing(&self) -> bool {
        self.envelope.is_released()
    }

    /// True once the generator has been stopped
    pub fn is_finished(&self, now: f64) -> bool {
        self.envelope.is_finished(now)
    }

    pub fn next_sample(&mut self, now: f64) -> f32 {
        if self.is_finished(now) {
            return 0.0;
        }
        self.oscillator.next_sample() * self.envelope.gain_at(now)
    }
}
