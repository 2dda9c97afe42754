//! Transistor clipper circuit.
//!
//! A Darlington-style transistor fuzz/clipper stage: input capacitor
//! into a reverse-biased clipping diode, a bias network feeding one or
//! two NPN transistors, an output capacitor, and a logarithmic drive
//! potentiometer against ground. All persistent state (capacitor
//! internals, last input/output samples) is owned here and lifetime-bound
//! to the instance.
//!
//! The processing path never allocates and never returns errors; a
//! NaN/Inf reaching the output stage is replaced with silence for that
//! sample and counted as a fault.

use crate::components::{
    Capacitor, CapacitorType, Diode, DiodeType, Potentiometer, Resistor, Taper, Transistor,
    TransistorType,
};
use crate::error::{AnalogError, Result};

/// Supply voltage in volts.
const VCC: f64 = 9.0;
/// Bias resistor value in ohms.
const BIAS_RESISTANCE: f64 = 10_000.0;
/// Input coupling capacitor in farads (0.056 µF film).
const INPUT_CAP: f64 = 0.056e-6;
/// Output coupling capacitor in farads (0.047 µF film).
const OUTPUT_CAP: f64 = 0.047e-6;
/// Drive potentiometer track in ohms (100 kΩ audio taper).
const DRIVE_POT: f64 = 100_000.0;
/// Fixed input gain ahead of the clipping stage.
const INPUT_GAIN: f64 = 10.0;
/// Floor for the instantaneous-frequency estimate in Hz.
const MIN_FREQUENCY: f64 = 20.0;

/// Processing statistics handed to the attached observer, aggregated
/// over every block since the previous notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockStats {
    /// Samples covered by this report
    pub samples: usize,
    /// Peak absolute input level across the window
    pub peak_input: f32,
    /// Peak absolute output level across the window
    pub peak_output: f32,
    /// RMS input level across the window
    pub rms_input: f32,
    /// RMS output level across the window
    pub rms_output: f32,
    /// Samples in the window that hit the numeric-fault path
    pub faults: usize,
}

/// Observer the host may attach for throttled diagnostics.
///
/// Invoked from `process_block` at the cadence the host chose when
/// attaching, never from the per-sample path. Each notification carries
/// statistics for the whole cadence window, so nothing between
/// notifications is dropped.
pub trait ClipperObserver: Send {
    fn on_block(&mut self, stats: &BlockStats);
}

impl<F: FnMut(&BlockStats) + Send> ClipperObserver for F {
    fn on_block(&mut self, stats: &BlockStats) {
        self(stats)
    }
}

/// A transistor clipper distortion circuit.
pub struct TransistorClipper {
    transistor1: Transistor,
    transistor2: Transistor,
    diode: Diode,
    bias_resistor: Resistor,
    drive_pot: Potentiometer,
    input_cap: Capacitor,
    output_cap: Capacitor,

    /// Use the cascaded (Darlington) two-transistor stage
    darlington: bool,

    sample_rate: f64,
    /// Amplified input from the previous sample, for the frequency estimate
    last_input_sample: f64,
    last_output_sample: f64,
    /// Faults contained since the last reset
    fault_count: usize,

    observer: Option<Box<dyn ClipperObserver>>,
    /// Invoke the observer every N blocks
    observer_cadence: usize,
    blocks_since_notify: usize,
    // Running totals for the blocks of the current cadence window
    window_samples: usize,
    window_peak_input: f32,
    window_peak_output: f32,
    window_sum_sq_input: f64,
    window_sum_sq_output: f64,
    window_faults: usize,
}

impl Default for TransistorClipper {
    fn default() -> Self {
        Self::new()
    }
}

impl TransistorClipper {
    /// Create a clipper with 2N5088-style transistors and a 1N914-style
    /// silicon diode.
    pub fn new() -> Self {
        Self {
            transistor1: Transistor::with_parameters(
                TransistorType::Npn,
                400.0,
                1e-12,
                100.0,
                0.15,
            ),
            transistor2: Transistor::with_parameters(
                TransistorType::Npn,
                400.0,
                1e-12,
                100.0,
                0.15,
            ),
            diode: Diode::new(DiodeType::Silicon),
            bias_resistor: Resistor::with_parameters(
                BIAS_RESISTANCE,
                0.0039,
                0.25,
                0.5e-12,
                0.1e-9,
            ),
            drive_pot: Potentiometer::new(DRIVE_POT, 0.5, Taper::Logarithmic),
            input_cap: Capacitor::new(CapacitorType::Film, INPUT_CAP),
            output_cap: Capacitor::new(CapacitorType::Film, OUTPUT_CAP),
            darlington: true,
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
            last_input_sample: 0.0,
            last_output_sample: 0.0,
            fault_count: 0,
            observer: None,
            observer_cadence: 1,
            blocks_since_notify: 0,
            window_samples: 0,
            window_peak_input: 0.0,
            window_peak_output: 0.0,
            window_sum_sq_input: 0.0,
            window_sum_sq_output: 0.0,
            window_faults: 0,
        }
    }

    /// Establish the sample rate, propagate it to both capacitors, and
    /// reset all state. Must be called before processing and again
    /// whenever the host's sample rate changes.
    pub fn prepare(&mut self, sample_rate: f64) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnalogError::invalid_sample_rate(sample_rate));
        }
        self.sample_rate = sample_rate;
        self.input_cap.set_sample_rate(sample_rate);
        self.output_cap.set_sample_rate(sample_rate);
        self.reset();
        Ok(())
    }

    /// Zero the circuit's persistent state. The diode and transistors
    /// carry bookkeeping only; the capacitors hold the real memory.
    pub fn reset(&mut self) {
        self.last_input_sample = 0.0;
        self.last_output_sample = 0.0;
        self.fault_count = 0;
        self.blocks_since_notify = 0;
        self.clear_window();
        self.input_cap.reset();
        self.output_cap.reset();
        self.diode.reset();
        self.transistor1.reset();
        self.transistor2.reset();
        self.bias_resistor.reset();
    }

    /// Set the drive control, clamped to [0, 1].
    pub fn set_drive(&mut self, drive: f64) {
        self.drive_pot.set_position(drive);
    }

    /// Get the drive control position.
    pub fn drive(&self) -> f64 {
        self.drive_pot.position()
    }

    /// Enable or disable the cascaded second transistor.
    pub fn set_darlington(&mut self, darlington: bool) {
        self.darlington = darlington;
    }

    /// Supply voltage of the circuit in volts.
    pub fn supply_voltage(&self) -> f64 {
        VCC
    }

    /// Faults contained since the last reset.
    pub fn fault_count(&self) -> usize {
        self.fault_count
    }

    /// Attach an observer, invoked every `every_blocks` processed blocks
    /// with statistics aggregated over that window.
    pub fn set_observer(&mut self, observer: Box<dyn ClipperObserver>, every_blocks: usize) {
        self.observer = Some(observer);
        self.observer_cadence = every_blocks.max(1);
        self.blocks_since_notify = 0;
        self.clear_window();
    }

    fn clear_window(&mut self) {
        self.window_samples = 0;
        self.window_peak_input = 0.0;
        self.window_peak_output = 0.0;
        self.window_sum_sq_input = 0.0;
        self.window_sum_sq_output = 0.0;
        self.window_faults = 0;
    }

    /// Detach the observer.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Instantaneous-frequency heuristic from the sample-to-sample
    /// derivative of the amplified signal: f = |Δv| * rate / 2π, floored
    /// at 20 Hz. A stand-in for spectral analysis, used only to drive the
    /// capacitors' frequency-dependent impedance.
    fn estimate_frequency(&self, amplified: f64) -> f64 {
        let derivative = (amplified - self.last_input_sample).abs();
        (derivative * self.sample_rate / (2.0 * std::f64::consts::PI)).max(MIN_FREQUENCY)
    }

    /// Process one audio sample through the clipper chain.
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let amplified = input as f64 * INPUT_GAIN;
        let frequency = self.estimate_frequency(amplified);
        self.last_input_sample = amplified;

        // Input coupling capacitor
        let cap_voltage = self.input_cap.process(amplified, frequency);

        // The diode sits reverse-biased across the signal; negate in and
        // back out
        let diode_current = self.diode.process(-cap_voltage);
        let diode_voltage = -self.diode.solve_voltage(diode_current).voltage;

        // Bias network
        let bias_current = self.bias_resistor.process(VCC + diode_voltage);
        let vce = VCC - bias_current * BIAS_RESISTANCE;

        // Transistor stage(s): the collector currents shape the operating
        // point bookkeeping; the audio path continues from the diode node
        let vbe2 = diode_voltage + cap_voltage;
        if self.darlington {
            let emitter_current = self.transistor2.emitter_current(vbe2, vce);
            // Chain into the first transistor through the Shockley inverse
            let vbe1 = self.transistor1.vt()
                * (1.0 + emitter_current / self.transistor1.is_current())
                    .max(1e-12)
                    .ln();
            self.transistor1.collector_current(vbe1, vce);
        } else {
            self.transistor1.collector_current(vbe2, vce);
        }

        // Output coupling capacitor with the bias-scaled supply term
        let output_voltage = self
            .output_cap
            .process(diode_voltage + VCC / BIAS_RESISTANCE, frequency);

        // Drive pot as a divider against ground, then the rail clamp
        let pot_output = self.drive_pot.process(0.0, output_voltage);

        if !pot_output.is_finite() {
            // Contain the fault: silence for this sample, and flush the
            // capacitor state so the NaN cannot leak into later samples
            self.fault_count += 1;
            self.input_cap.reset();
            self.output_cap.reset();
            self.last_input_sample = 0.0;
            self.last_output_sample = 0.0;
            return 0.0;
        }

        let clamped = pot_output.clamp(-VCC, VCC);
        self.last_output_sample = clamped;
        clamped as f32
    }

    /// Process a buffer in place and report statistics to the attached
    /// observer at its cadence, aggregated over the blocks of the window.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        let faults_before = self.fault_count;
        let mut peak_input = 0.0f32;
        let mut peak_output = 0.0f32;
        let mut sum_sq_input = 0.0f64;
        let mut sum_sq_output = 0.0f64;

        for sample in buffer.iter_mut() {
            let input = *sample;
            let output = self.process_sample(input);
            *sample = output;

            peak_input = peak_input.max(input.abs());
            peak_output = peak_output.max(output.abs());
            sum_sq_input += (input as f64) * (input as f64);
            sum_sq_output += (output as f64) * (output as f64);
        }

        if self.observer.is_none() {
            return;
        }

        // Fold this block into the cadence window
        self.window_samples += buffer.len();
        self.window_peak_input = self.window_peak_input.max(peak_input);
        self.window_peak_output = self.window_peak_output.max(peak_output);
        self.window_sum_sq_input += sum_sq_input;
        self.window_sum_sq_output += sum_sq_output;
        self.window_faults += self.fault_count - faults_before;

        self.blocks_since_notify += 1;
        if self.blocks_since_notify < self.observer_cadence {
            return;
        }
        self.blocks_since_notify = 0;

        let n = self.window_samples.max(1) as f64;
        let stats = BlockStats {
            samples: self.window_samples,
            peak_input: self.window_peak_input,
            peak_output: self.window_peak_output,
            rms_input: (self.window_sum_sq_input / n).sqrt() as f32,
            rms_output: (self.window_sum_sq_output / n).sqrt() as f32,
            faults: self.window_faults,
        };
        self.clear_window();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_block(&stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn prepared() -> TransistorClipper {
        let mut clipper = TransistorClipper::new();
        clipper.prepare(48000.0).unwrap();
        clipper
    }

    #[test]
    fn test_prepare_rejects_bad_sample_rates() {
        let mut clipper = TransistorClipper::new();
        assert!(clipper.prepare(0.0).is_err());
        assert!(clipper.prepare(-44100.0).is_err());
        assert!(clipper.prepare(f64::NAN).is_err());
        assert!(clipper.prepare(f64::INFINITY).is_err());
        assert!(clipper.prepare(44100.0).is_ok());
    }

    #[test]
    fn test_output_bounded_by_supply() {
        for drive in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let mut clipper = prepared();
            clipper.set_drive(drive);
            for step in 0..2000 {
                let phase = step as f32 * 0.05;
                let input = phase.sin();
                let out = clipper.process_sample(input);
                assert!(out.abs() <= VCC as f32, "drive {drive}: |{out}| > Vcc");
                assert!(out.is_finite());
            }
        }
    }

    #[test]
    fn test_nan_input_contained_as_silence() {
        let mut clipper = prepared();
        assert_eq!(clipper.process_sample(f32::NAN), 0.0);
        assert_eq!(clipper.fault_count(), 1);
        // The next clean sample still produces finite output
        assert!(clipper.process_sample(0.1).is_finite());
    }

    #[test]
    fn test_drive_zero_silences_output() {
        // Log taper at position 0 maps the divider ratio to exactly 0
        let mut clipper = prepared();
        clipper.set_drive(0.0);
        for step in 0..500 {
            let out = clipper.process_sample((step as f32 * 0.1).sin());
            assert_eq!(out, 0.0);
        }
    }

    #[test]
    fn test_clipping_produces_output() {
        let mut clipper = prepared();
        clipper.set_drive(1.0);
        let mut peak = 0.0f32;
        for step in 0..4800 {
            let input = (step as f32 * 220.0 * 2.0 * std::f32::consts::PI / 48000.0).sin() * 0.5;
            peak = peak.max(clipper.process_sample(input).abs());
        }
        assert!(peak > 0.0);
    }

    #[test]
    fn test_reset_restores_determinism() {
        let mut a = prepared();
        let mut b = prepared();
        // Push some signal through `a` first, then reset
        for step in 0..100 {
            a.process_sample((step as f32 * 0.2).sin());
        }
        a.reset();
        b.reset();
        for step in 0..200 {
            let input = (step as f32 * 0.07).sin();
            assert_eq!(a.process_sample(input), b.process_sample(input));
        }
    }

    #[test]
    fn test_drive_is_clamped() {
        let mut clipper = prepared();
        clipper.set_drive(1.7);
        assert_eq!(clipper.drive(), 1.0);
        clipper.set_drive(-0.5);
        assert_eq!(clipper.drive(), 0.0);
    }

    #[test]
    fn test_single_transistor_mode_still_bounded() {
        let mut clipper = prepared();
        clipper.set_darlington(false);
        for step in 0..1000 {
            let out = clipper.process_sample((step as f32 * 0.11).sin());
            assert!(out.abs() <= VCC as f32);
        }
    }

    #[test]
    fn test_observer_cadence() {
        struct Counter(Arc<AtomicUsize>);
        impl ClipperObserver for Counter {
            fn on_block(&mut self, stats: &BlockStats) {
                // Four 64-sample blocks per cadence window
                assert_eq!(stats.samples, 256);
                assert!(stats.rms_output <= stats.peak_output + f32::EPSILON);
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let mut clipper = prepared();
        clipper.set_observer(Box::new(Counter(calls.clone())), 4);

        let mut buffer = [0.1f32; 64];
        for _ in 0..8 {
            clipper.process_block(&mut buffer);
            buffer.fill(0.1);
        }
        // Every 4th block notifies: 8 blocks -> 2 calls
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_observer_aggregates_across_cadence_window() {
        use std::sync::Mutex;

        let reports: Arc<Mutex<Vec<BlockStats>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        let mut clipper = prepared();
        clipper.set_observer(
            Box::new(move |stats: &BlockStats| sink.lock().unwrap().push(*stats)),
            2,
        );

        // First block of the window carries a fault; the notification is
        // triggered by the clean second block and must still report it
        let mut faulty = [0.2f32; 32];
        faulty[7] = f32::NAN;
        clipper.process_block(&mut faulty);
        let mut clean = [0.5f32; 32];
        clipper.process_block(&mut clean);

        let reports = reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].samples, 64);
        assert_eq!(reports[0].faults, 1);
        // Peak input comes from the second block of the window
        assert!(reports[0].peak_input >= 0.5);
    }

    #[test]
    fn test_block_matches_per_sample_processing() {
        let mut block = prepared();
        let mut per_sample = prepared();

        let mut buffer: Vec<f32> = (0..256).map(|i| (i as f32 * 0.13).sin() * 0.8).collect();
        let expected: Vec<f32> = buffer.iter().map(|&s| per_sample.process_sample(s)).collect();
        block.process_block(&mut buffer);
        assert_eq!(buffer, expected);
    }
}
