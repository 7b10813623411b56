// Pluck envelope implementation
//
// Gain automation for one voice: start near-silent, fast exponential attack to a
// peak, exponential decay to a lower holding level, exponential release back to
// near-silence. Exponential curves cannot reach zero, so every segment is bounded
// below by `floor`.
//
// The envelope is evaluated from absolute time (seconds on the session clock) rather
// than stepped per sample, so the same voice can be inspected from tests without
// rendering audio.

use serde::{Deserialize, Serialize};

/// Pluck envelope parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluckParams {
    /// Near-silent level the envelope starts from and releases to
    pub floor: f32,
    /// Level reached at the end of the attack
    pub peak: f32,
    /// Attack time in seconds
    pub attack: f64,
    /// Level reached at the end of the decay and held until release
    pub hold_level: f32,
    /// Decay time in seconds (starts when the attack ends)
    pub decay: f64,
    /// Release ramp time in seconds
    pub release: f64,
    /// Time after note-off at which the generator stops (slightly past the ramp)
    pub stop_after: f64,
}

impl PluckParams {
    /// Create parameters with validation
    pub fn new(
        floor: f32,
        peak: f32,
        attack: f64,
        hold_level: f32,
        decay: f64,
        release: f64,
        stop_after: f64,
    ) -> Self {
        let floor = floor.clamp(1e-6, 0.01);
        let release = release.clamp(0.001, 5.0);
        Self {
            floor,
            peak: peak.clamp(floor, 1.0),
            attack: attack.clamp(0.001, 5.0),
            hold_level: hold_level.clamp(floor, 1.0),
            decay: decay.clamp(0.001, 5.0),
            release,
            stop_after: stop_after.clamp(release, 5.0),
        }
    }

    /// Re-apply the validation rules (used after deserializing)
    pub fn sanitized(self) -> Self {
        Self::new(
            self.floor,
            self.peak,
            self.attack,
            self.hold_level,
            self.decay,
            self.release,
            self.stop_after,
        )
    }

    fn decay_end(&self) -> f64 {
        self.attack + self.decay
    }
}

impl Default for PluckParams {
    fn default() -> Self {
        Self {
            floor: 0.0001,
            peak: 0.6,        // reached 10ms after note-on
            attack: 0.01,
            hold_level: 0.15, // reached 250ms after note-on
            decay: 0.24,
            release: 0.1,
            stop_after: 0.11,
        }
    }
}

/// Where the envelope is at a given time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Hold,
    Release,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ReleasePoint {
    at: f64,
    from: f32,
}

/// Exponential ramp from `from` to `to` over `length` seconds, evaluated at `elapsed`
#[inline]
fn exp_ramp(from: f32, to: f32, elapsed: f64, length: f64) -> f32 {
    if elapsed <= 0.0 {
        return from;
    }
    if elapsed >= length {
        return to;
    }
    let progress = (elapsed / length) as f32;
    from * (to / from).powf(progress)
}

/// Gain envelope of a single voice
#[derive(Debug, Clone)]
pub struct PluckEnvelope {
    params: PluckParams,
    started_at: f64,
    release: Option<ReleasePoint>,
}

impl PluckEnvelope {
    /// Start the attack at `now`
    pub fn start(params: PluckParams, now: f64) -> Self {
        Self {
            params,
            started_at: now,
            release: None,
        }
    }

    pub fn params(&self) -> PluckParams {
        self.params
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    fn attack_decay_gain(&self, t: f64) -> f32 {
        let p = &self.params;
        let elapsed = t - self.started_at;
        if elapsed < p.attack {
            exp_ramp(p.floor, p.peak, elapsed, p.attack)
        } else if elapsed < p.decay_end() {
            exp_ramp(p.peak, p.hold_level, elapsed - p.attack, p.decay)
        } else {
            p.hold_level
        }
    }

    /// Gain at absolute time `t`
    pub fn gain_at(&self, t: f64) -> f32 {
        match self.release {
            Some(release) if t >= release.at => exp_ramp(
                release.from,
                self.params.floor,
                t - release.at,
                self.params.release,
            ),
            _ => self.attack_decay_gain(t),
        }
    }

    /// Begin the release ramp from the current gain; later calls are ignored
    pub fn release(&mut self, now: f64) {
        if self.release.is_none() {
            let from = self.attack_decay_gain(now);
            self.release = Some(ReleasePoint { at: now, from });
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_some()
    }

    /// Time at which the generator stops, once released
    pub fn stop_time(&self) -> Option<f64> {
        self.release.map(|r| r.at + self.params.stop_after)
    }

    pub fn is_finished(&self, t: f64) -> bool {
        self.stop_time().is_some_and(|stop| t >= stop)
    }

    pub fn stage_at(&self, t: f64) -> EnvelopeStage {
        if self.is_finished(t) {
            return EnvelopeStage::Finished;
        }
        if let Some(release) = self.release
            && t >= release.at
        {
            return EnvelopeStage::Release;
        }
        let elapsed = t - self.started_at;
        if elapsed < self.params.attack {
            EnvelopeStage::Attack
        } else if elapsed < self.params.decay_end() {
            EnvelopeStage::Decay
        } else {
            EnvelopeStage::Hold
        }
    }
}
