// Voice Engine - Note lifecycle handling
//
// At most one active voice per note. Note-off moves the voice to the release
// tail list so a fresh note-on for the same note can overlap the fading one.

use super::envelope::PluckParams;
use super::oscillator::WaveType;
use super::voice::Voice;
use crate::note::NoteName;
use std::collections::HashMap;

/// Mix gain applied to the sum of all voices
const MIX_GAIN: f32 = 0.5;

pub struct VoiceEngine {
    active: HashMap<NoteName, Voice>,
    releasing: Vec<Voice>,
    wave_type: WaveType,
    params: PluckParams,
    sample_rate: f32,
}

impl VoiceEngine {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_params(sample_rate, PluckParams::default())
    }

    pub fn with_params(sample_rate: f32, params: PluckParams) -> Self {
        Self {
            active: HashMap::new(),
            releasing: Vec::new(),
            wave_type: WaveType::default(),
            params,
            sample_rate,
        }
    }

    /// Start a voice for `note`
    ///
    /// Returns false (and does nothing) when the note is already sounding or the
    /// frequency is not a finite positive number.
    pub fn note_on(&mut self, note: &NoteName, frequency: f32, now: f64) -> bool {
        if self.active.contains_key(note) || !(frequency.is_finite() && frequency > 0.0) {
            return false;
        }

        let voice = Voice::start(
            note.clone(),
            frequency,
            self.wave_type,
            self.params,
            self.sample_rate,
            now,
        );
        self.active.insert(note.clone(), voice);
        true
    }

    /// Release the voice for `note`; returns false if it was not sounding
    pub fn note_off(&mut self, note: &NoteName, now: f64) -> bool {
        match self.active.remove(note) {
            Some(mut voice) => {
                voice.release(now);
                self.releasing.push(voice);
                true
            }
            None => false,
        }
    }

    /// Only affects voices started after the change
    pub fn set_wave_type(&mut self, wave_type: WaveType) {
        self.wave_type = wave_type;
    }

    pub fn wave_type(&self) -> WaveType {
        self.wave_type
    }

    pub fn is_sounding(&self, note: &NoteName) -> bool {
        self.active.contains_key(note)
    }

    pub fn voice(&self, note: &NoteName) -> Option<&Voice> {
        self.active.get(note)
    }

    pub fn active_voice_count(&self) -> usize {
        self.active.len()
    }

    pub fn releasing_voice_count(&self) -> usize {
        self.releasing.len()
    }

    /// Drop release tails whose generator has stopped
    pub fn collect_finished(&mut self, now: f64) {
        self.releasing.retain(|voice| !voice.is_finished(now));
    }

    pub fn next_sample(&mut self, now: f64) -> f32 {
        let active: f32 = self.active.values_mut().map(|v| v.next_sample(now)).sum();
        let tails: f32 = self.releasing.iter_mut().map(|v| v.next_sample(now)).sum();
        (active + tails) * MIX_GAIN
    }
}
