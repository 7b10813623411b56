// DSP utilities - Output hygiene for the real-time callback

/// Flush tiny values to zero
///
/// Denormal floats slow some CPUs down badly; anything under 1e-15 is far below
/// 32-bit float noise anyway.
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft saturation into [-1, 1] (tanh curve, near-linear around zero)
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Master stage applied to every mixed sample before it reaches the device
#[inline]
pub fn master_sample(raw: f32, volume: f32) -> f32 {
    soft_clip(flush_denormals_to_zero(raw) * volume)
}

/// One-pole low-pass used to glide parameter changes
///
/// y[n] = y[n-1] + a * (x[n] - y[n-1])
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    /// `time_constant_ms` is the time to cover ~63% of a step
    ///
    /// ```
    /// use virtual_piano::audio::dsp_utils::OnePoleSmoother;
    /// let smoother = OnePoleSmoother::new(0.5, 10.0, 44100.0);
    /// assert_eq!(smoother.get(), 0.5);
    /// ```
    pub fn new(initial_value: f32, time_constant_ms: f32, sample_rate: f32) -> Self {
        let time_constant_samples = (time_constant_ms * 0.001 * sample_rate).max(1.0);

        Self {
            current: initial_value,
            coefficient: 1.0 / time_constant_samples,
        }
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);
        self.current = flush_denormals_to_zero(self.current);
        self.current
    }

    /// Jump to `value` without gliding
    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.current = value;
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }
}
