// Atomic parameters - Lock-free values written by the UI, read by the callback

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// f32 stored as its bit pattern in an `AtomicU32`
///
/// Writes outside `[min, max]` are clamped and non-finite writes are ignored, so the
/// audio thread always reads a usable value.
#[derive(Clone)]
pub struct AtomicF32 {
    inner: Arc<AtomicU32>,
    min: f32,
    max: f32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self::with_range(value, f32::MIN, f32::MAX)
    }

    pub fn with_range(value: f32, min: f32, max: f32) -> Self {
        let value = if value.is_finite() { value.clamp(min, max) } else { min };
        Self {
            inner: Arc::new(AtomicU32::new(value.to_bits())),
            min,
            max,
        }
    }

    /// Master volume, 0.0 - 1.0
    pub fn volume(value: f32) -> Self {
        Self::with_range(value, 0.0, 1.0)
    }

    pub fn set(&self, value: f32) {
        if !value.is_finite() {
            return;
        }
        let value = value.clamp(self.min, self.max);
        self.inner.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_is_clamped() {
        let volume = AtomicF32::volume(0.5);
        assert_eq!(volume.get(), 0.5);

        volume.set(1.7);
        assert_eq!(volume.get(), 1.0);
        volume.set(-0.2);
        assert_eq!(volume.get(), 0.0);
    }

    #[test]
    fn test_non_finite_writes_are_ignored() {
        let volume = AtomicF32::volume(0.3);
        volume.set(f32::NAN);
        volume.set(f32::INFINITY);
        assert_eq!(volume.get(), 0.3);
    }

    #[test]
    fn test_clones_share_value() {
        let ui_side = AtomicF32::volume(0.5);
        let audio_side = ui_side.clone();
        ui_side.set(0.25);
        assert_eq!(audio_side.get(), 0.25);
    }
}
