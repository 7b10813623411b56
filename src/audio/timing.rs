// Audio timing - Output clock shared between the callback and the UI

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Frames written to the device so far; the session clock is derived from it
#[derive(Clone)]
pub struct AudioTiming {
    sample_position: Arc<AtomicU64>,
    sample_rate: f64,
}

impl AudioTiming {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Relaxed)
    }

    /// Called by the audio callback once a buffer is written
    pub fn advance(&self, frames: usize) {
        self.sample_position
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Clock time at the start of the next buffer
    pub fn seconds(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }

    /// Clock time of frame `offset` within the next buffer
    pub fn seconds_at(&self, offset: usize) -> f64 {
        (self.current_sample() + offset as u64) as f64 / self.sample_rate
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}
