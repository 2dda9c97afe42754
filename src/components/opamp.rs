//! Operational amplifier model.
//!
//! Differential input times the open-loop gain, rolled off by a
//! single-pole low-pass at the gain-bandwidth pole, limited by the slew
//! rate, then hard-saturated to the ±15 V rails.

/// Supply rail magnitude in volts.
const RAIL_VOLTAGE: f64 = 15.0;

/// An op-amp with gain-bandwidth and slew-rate limits.
#[derive(Debug, Clone)]
pub struct OpAmp {
    /// Open-loop gain (typically 100,000+)
    gain: f64,
    /// Slew rate in V/µs
    slew_rate: f64,
    /// Unity-gain bandwidth in Hz
    bandwidth: f64,

    sample_rate: f64,
    /// Time step, 1/sample_rate
    dt: f64,

    /// Previous output for the low-pass stage and slew limiting
    last_output: f64,
    /// Internal nodes
    v_plus: f64,
    v_minus: f64,
    v_out: f64,
}

impl Default for OpAmp {
    fn default() -> Self {
        // 741-style: 100 dB gain, 0.5 V/µs, 1 MHz GBW
        Self::new(100_000.0, 0.5, 1e6)
    }
}

impl OpAmp {
    /// Create an op-amp.
    ///
    /// # Arguments
    /// * `gain` - open-loop gain, clamped to [1, 1e7]
    /// * `slew_rate` - in V/µs, clamped to [0.01, 1000]
    /// * `bandwidth` - unity-gain bandwidth in Hz, clamped to [1 kHz, 1 GHz]
    pub fn new(gain: f64, slew_rate: f64, bandwidth: f64) -> Self {
        Self {
            gain: gain.clamp(1.0, 1e7),
            slew_rate: slew_rate.clamp(0.01, 1000.0),
            bandwidth: bandwidth.clamp(1e3, 1e9),
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
            dt: 1.0 / crate::DEFAULT_SAMPLE_RATE,
            last_output: 0.0,
            v_plus: 0.0,
            v_minus: 0.0,
            v_out: 0.0,
        }
    }

    /// Set the open-loop gain, clamped to [1, 1e7].
    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain.clamp(1.0, 1e7);
    }

    /// Get the open-loop gain.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Set the slew rate in V/µs, clamped to [0.01, 1000].
    pub fn set_slew_rate(&mut self, slew_rate: f64) {
        self.slew_rate = slew_rate.clamp(0.01, 1000.0);
    }

    /// Get the slew rate in V/µs.
    pub fn slew_rate(&self) -> f64 {
        self.slew_rate
    }

    /// Set the unity-gain bandwidth in Hz, clamped to [1 kHz, 1 GHz].
    pub fn set_bandwidth(&mut self, bandwidth: f64) {
        self.bandwidth = bandwidth.clamp(1e3, 1e9);
    }

    /// Get the unity-gain bandwidth in Hz.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Establish the sample rate and derived time step. Must precede the
    /// first process call; resets internal state.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.dt = 1.0 / sample_rate;
        self.reset();
    }

    /// Process a single sample: output for the two input voltages.
    pub fn process(&mut self, in_plus: f64, in_minus: f64) -> f64 {
        self.v_plus = in_plus;
        self.v_minus = in_minus;

        let amplified = (in_plus - in_minus) * self.gain;
        let filtered = self.apply_frequency_response(amplified);
        let slewed = self.limit_slew_rate(filtered);
        self.v_out = slewed.clamp(-RAIL_VOLTAGE, RAIL_VOLTAGE);

        self.last_output = self.v_out;
        self.v_out
    }

    /// Single-pole low-pass with the pole at 2π * bandwidth / gain.
    fn apply_frequency_response(&self, input: f64) -> f64 {
        let pole = 2.0 * std::f64::consts::PI * self.bandwidth / self.gain;
        let alpha = pole * self.dt;
        (input + alpha * self.last_output) / (1.0 + alpha)
    }

    /// Limit the per-sample output change to slew_rate V/µs.
    fn limit_slew_rate(&self, target: f64) -> f64 {
        let max_change = self.slew_rate * self.dt * 1e6;
        let change = target - self.last_output;
        if change.abs() > max_change {
            self.last_output + max_change.copysign(change)
        } else {
            target
        }
    }

    /// Output voltage after the last process call.
    pub fn output(&self) -> f64 {
        self.v_out
    }

    /// Differential input offset at the last process call.
    pub fn input_offset(&self) -> f64 {
        self.v_plus - self.v_minus
    }

    /// Zero all internal nodes. Configuration untouched.
    pub fn reset(&mut self) {
        self.last_output = 0.0;
        self.v_plus = 0.0;
        self.v_minus = 0.0;
        self.v_out = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_saturates_at_rails() {
        let mut amp = OpAmp::new(100_000.0, 1000.0, 1e6);
        amp.set_sample_rate(48000.0);
        // Any appreciable differential input slams a 100 dB amp into the
        // rail once the slew allows it
        let mut out = 0.0;
        for _ in 0..100 {
            out = amp.process(1.0, 0.0);
        }
        assert!(out <= 15.0);
        assert!(out >= 14.0);
    }

    #[test]
    fn test_slew_rate_limits_step() {
        let mut amp = OpAmp::new(100_000.0, 0.5, 1e6);
        amp.set_sample_rate(48000.0);
        let out = amp.process(1.0, 0.0);
        // 0.5 V/µs at 48 kHz allows at most ~10.4 V in one sample
        let max_step = 0.5 * 1e6 / 48000.0;
        assert!(out.abs() <= max_step + 1e-9);
    }

    #[test]
    fn test_zero_differential_input() {
        let mut amp = OpAmp::default();
        amp.set_sample_rate(48000.0);
        assert_eq!(amp.process(0.7, 0.7), 0.0);
    }

    #[test]
    fn test_inverting_polarity() {
        let mut amp = OpAmp::default();
        amp.set_sample_rate(48000.0);
        let out = amp.process(0.0, 0.001);
        assert!(out < 0.0);
    }

    #[test]
    fn test_reset_zeroes_nodes() {
        let mut amp = OpAmp::default();
        amp.set_sample_rate(48000.0);
        amp.process(1.0, 0.0);
        amp.reset();
        assert_eq!(amp.output(), 0.0);
        assert_eq!(amp.input_offset(), 0.0);
    }

    #[test]
    fn test_parameter_clamping() {
        let amp = OpAmp::new(1e12, 1e6, 1.0);
        assert_eq!(amp.gain(), 1e7);
        assert_eq!(amp.slew_rate(), 1000.0);
        assert_eq!(amp.bandwidth(), 1e3);
    }
}
