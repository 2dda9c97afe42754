//! Capacitor model.
//!
//! Charge storage discretized per sample (backward Euler) with the
//! parasitic effects that matter for audio circuits:
//! - Equivalent series resistance (ESR) and inductance (ESL)
//! - Frequency-dependent impedance Z = sqrt(Xc² + ESR² + Xl²)
//! - Dielectric absorption modeled as a bank of eight exponential-decay
//!   memory accumulators with relaxation times from 1 ms to 10,000 s
//! - Temperature-adjusted capacitance and ESR
//!
//! Construction-type presets (film, ceramic, electrolytic, mica, paper)
//! select a characteristics record; `Custom` permits direct overrides.

use crate::{DEFAULT_SAMPLE_RATE, ROOM_TEMPERATURE};

/// Minimum capacitance in farads (1 pF).
pub const MIN_CAPACITANCE: f64 = 1e-12;
/// Maximum capacitance in farads (1 mF).
pub const MAX_CAPACITANCE: f64 = 1e-3;

/// Number of dielectric-absorption memory accumulators.
pub const DA_BANK_SIZE: usize = 8;

/// Relaxation time constants of the dielectric-absorption bank, in
/// seconds. Log-spaced over seven decades, 1 ms to 10,000 s.
pub const DA_TIME_CONSTANTS: [f64; DA_BANK_SIZE] =
    [1e-3, 1e-2, 1e-1, 1.0, 1e1, 1e2, 1e3, 1e4];

/// Capacitor construction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacitorType {
    Film,
    Ceramic,
    Electrolytic,
    Mica,
    Paper,
    /// Characteristics set directly through the override setters.
    Custom,
}

/// Physical characteristics of a capacitor construction type.
#[derive(Debug, Clone, Copy)]
pub struct CapacitorCharacteristics {
    /// Equivalent series resistance in ohms
    pub esr: f64,
    /// Equivalent series inductance in henries
    pub esl: f64,
    /// Dielectric absorption as a fraction of the applied voltage step
    pub dielectric_absorption: f64,
    /// Temperature coefficient of capacitance in 1/K
    pub temp_coefficient: f64,
    /// Minimum operating temperature in Kelvin
    pub min_temperature: f64,
    /// Maximum operating temperature in Kelvin
    pub max_temperature: f64,
    /// Maximum voltage rating in volts
    pub max_voltage: f64,
    /// Maximum ripple current in amperes
    pub max_current: f64,
    /// Maximum usable frequency in Hz
    pub max_frequency: f64,
    /// Whether the capacitor is polarized
    pub polarized: bool,
}

impl CapacitorType {
    /// Characteristics record for this construction type.
    pub fn characteristics(self) -> CapacitorCharacteristics {
        match self {
            // Polyester/polypropylene film: low ESR, very low DA
            CapacitorType::Film => CapacitorCharacteristics {
                esr: 0.01,
                esl: 5e-9,
                dielectric_absorption: 0.0002,
                temp_coefficient: -0.0002,
                min_temperature: 218.15, // -55°C
                max_temperature: 378.15, // 105°C
                max_voltage: 630.0,
                max_current: 5.0,
                max_frequency: 1e6,
                polarized: false,
            },
            // Class-2 ceramic: noticeable DA and temperature drift
            CapacitorType::Ceramic => CapacitorCharacteristics {
                esr: 0.05,
                esl: 1e-9,
                dielectric_absorption: 0.025,
                temp_coefficient: 0.0015,
                min_temperature: 218.15,
                max_temperature: 398.15, // 125°C
                max_voltage: 100.0,
                max_current: 1.0,
                max_frequency: 1e7,
                polarized: false,
            },
            // Aluminum electrolytic: high ESR, strong memory effect
            CapacitorType::Electrolytic => CapacitorCharacteristics {
                esr: 0.5,
                esl: 2e-8,
                dielectric_absorption: 0.1,
                temp_coefficient: 0.005,
                min_temperature: 233.15, // -40°C
                max_temperature: 358.15, // 85°C
                max_voltage: 450.0,
                max_current: 2.0,
                max_frequency: 1e5,
                polarized: true,
            },
            // Silver mica: near-ideal at audio
            CapacitorType::Mica => CapacitorCharacteristics {
                esr: 0.005,
                esl: 1e-9,
                dielectric_absorption: 0.0003,
                temp_coefficient: 5e-5,
                min_temperature: 218.15,
                max_temperature: 398.15,
                max_voltage: 500.0,
                max_current: 1.0,
                max_frequency: 1e8,
                polarized: false,
            },
            // Vintage paper-in-oil: lossy and leaky
            CapacitorType::Paper => CapacitorCharacteristics {
                esr: 1.0,
                esl: 1e-8,
                dielectric_absorption: 0.02,
                temp_coefficient: 0.002,
                min_temperature: 233.15,
                max_temperature: 358.15,
                max_voltage: 400.0,
                max_current: 0.5,
                max_frequency: 1e5,
                polarized: false,
            },
            // Neutral starting point for direct overrides
            CapacitorType::Custom => CapacitorCharacteristics {
                esr: 0.0,
                esl: 0.0,
                dielectric_absorption: 0.0,
                temp_coefficient: 0.0,
                min_temperature: 218.15,
                max_temperature: 398.15,
                max_voltage: 1000.0,
                max_current: 10.0,
                max_frequency: 1e8,
                polarized: false,
            },
        }
    }
}

/// A capacitor with parasitics and dielectric-absorption memory.
#[derive(Debug, Clone)]
pub struct Capacitor {
    cap_type: CapacitorType,
    characteristics: CapacitorCharacteristics,
    /// Nominal capacitance in farads
    capacitance: f64,
    /// Operating temperature in Kelvin
    temperature: f64,

    sample_rate: f64,
    /// Time step, 1/sample_rate
    dt: f64,
    /// Per-accumulator decay factors exp(-dt/tau), precomputed so the
    /// processing path stays free of transcendental calls
    da_decay: [f64; DA_BANK_SIZE],

    /// Voltage across the capacitor after the last process call
    voltage: f64,
    /// Current through the capacitor during the last process call
    current: f64,
    /// Dielectric-absorption memory bank
    da_accumulators: [f64; DA_BANK_SIZE],
}

impl Default for Capacitor {
    fn default() -> Self {
        Self::new(CapacitorType::Film, 1e-6)
    }
}

impl Capacitor {
    /// Create a capacitor of the given construction type and value.
    ///
    /// Capacitance is clamped to [1 pF, 1 mF].
    pub fn new(cap_type: CapacitorType, capacitance: f64) -> Self {
        let mut cap = Self {
            cap_type,
            characteristics: cap_type.characteristics(),
            capacitance: capacitance.clamp(MIN_CAPACITANCE, MAX_CAPACITANCE),
            temperature: ROOM_TEMPERATURE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            dt: 1.0 / DEFAULT_SAMPLE_RATE,
            da_decay: [0.0; DA_BANK_SIZE],
            voltage: 0.0,
            current: 0.0,
            da_accumulators: [0.0; DA_BANK_SIZE],
        };
        cap.update_da_decay();
        cap
    }

    /// Set the nominal capacitance, clamped to [1 pF, 1 mF].
    pub fn set_capacitance(&mut self, capacitance: f64) {
        self.capacitance = capacitance.clamp(MIN_CAPACITANCE, MAX_CAPACITANCE);
    }

    /// Get the nominal capacitance in farads.
    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }

    /// Switch the construction type, reloading its characteristics.
    pub fn set_type(&mut self, cap_type: CapacitorType) {
        self.cap_type = cap_type;
        self.characteristics = cap_type.characteristics();
    }

    /// Get the construction type.
    pub fn cap_type(&self) -> CapacitorType {
        self.cap_type
    }

    /// Get the active characteristics record.
    pub fn characteristics(&self) -> &CapacitorCharacteristics {
        &self.characteristics
    }

    /// Set the operating temperature in Kelvin, clamped to the type's
    /// rated range.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.clamp(
            self.characteristics.min_temperature,
            self.characteristics.max_temperature,
        );
    }

    /// Get the operating temperature in Kelvin.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Override the ESR in ohms (intended for `Custom` capacitors).
    pub fn set_esr(&mut self, esr: f64) {
        self.characteristics.esr = esr.max(0.0);
    }

    /// Override the ESL in henries (intended for `Custom` capacitors).
    pub fn set_esl(&mut self, esl: f64) {
        self.characteristics.esl = esl.max(0.0);
    }

    /// Override the dielectric-absorption fraction, clamped to [0, 1].
    pub fn set_dielectric_absorption(&mut self, fraction: f64) {
        self.characteristics.dielectric_absorption = fraction.clamp(0.0, 1.0);
    }

    /// Establish the sample rate and derived time step.
    ///
    /// Must be called before the first `process` call and whenever the
    /// host's sample rate changes. Resets all mutable state.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.dt = 1.0 / sample_rate;
        self.update_da_decay();
        self.reset();
    }

    /// Get the configured sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn update_da_decay(&mut self) {
        for (decay, tau) in self.da_decay.iter_mut().zip(DA_TIME_CONSTANTS) {
            *decay = (-self.dt / tau).exp();
        }
    }

    /// Capacitance adjusted for the operating temperature.
    fn adjusted_capacitance(&self) -> f64 {
        self.capacitance
            * (1.0 + self.characteristics.temp_coefficient * (self.temperature - ROOM_TEMPERATURE))
    }

    /// ESR adjusted for the operating temperature.
    fn adjusted_esr(&self) -> f64 {
        self.characteristics.esr
            * (1.0 + self.characteristics.temp_coefficient * (self.temperature - ROOM_TEMPERATURE))
    }

    /// Total impedance magnitude at the given frequency.
    ///
    /// Z = sqrt(Xc² + ESR² + Xl²) with Xc = 1/(2πfC) and Xl = 2πf*ESL.
    ///
    /// Frequency must be positive; the hot path does not validate it.
    pub fn impedance(&self, frequency: f64) -> f64 {
        let omega = 2.0 * std::f64::consts::PI * frequency;
        let xc = 1.0 / (omega * self.adjusted_capacitance());
        let xl = omega * self.characteristics.esl;
        let esr = self.adjusted_esr();
        (xc * xc + esr * esr + xl * xl).sqrt()
    }

    /// Process a single sample and return the new capacitor voltage.
    ///
    /// The charging current is (V_in - V_last) / Z, clamped to the type's
    /// ripple-current rating with its sign preserved. The voltage update
    /// sums the capacitive-reactance drop, the ESR drop, the ESL drop
    /// ESL*(I - I_last)/dt, and the dielectric-absorption recovery term.
    pub fn process(&mut self, input_voltage: f64, frequency: f64) -> f64 {
        let omega = 2.0 * std::f64::consts::PI * frequency;
        let xc = 1.0 / (omega * self.adjusted_capacitance());
        let xl = omega * self.characteristics.esl;
        let esr = self.adjusted_esr();
        let z_total = (xc * xc + esr * esr + xl * xl).sqrt();

        let mut current = (input_voltage - self.voltage) / z_total;
        let i_max = self.characteristics.max_current;
        current = current.clamp(-i_max, i_max);

        // Recovery voltage from the memory bank, scaled by the type's
        // dielectric-absorption fraction
        let da_sum: f64 = self.da_accumulators.iter().sum();
        let da_voltage =
            self.characteristics.dielectric_absorption * da_sum / DA_BANK_SIZE as f64;

        let esl_drop = self.characteristics.esl * (current - self.current) / self.dt;
        let new_voltage = self.voltage + current * xc + current * esr + esl_drop + da_voltage;

        // Each accumulator tracks the voltage step through its own
        // relaxation window
        let delta = new_voltage - self.voltage;
        for (acc, decay) in self.da_accumulators.iter_mut().zip(self.da_decay) {
            *acc = delta * (1.0 - decay) + *acc * decay;
        }

        self.current = current;
        self.voltage = new_voltage;
        new_voltage
    }

    /// Voltage across the capacitor after the last process call.
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Current through the capacitor during the last process call.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Reset voltage, current, and the dielectric-absorption bank.
    /// Configuration is untouched.
    pub fn reset(&mut self) {
        self.voltage = 0.0;
        self.current = 0.0;
        self.da_accumulators = [0.0; DA_BANK_SIZE];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Capacitor with no parasitics and no dielectric absorption.
    fn ideal(capacitance: f64) -> Capacitor {
        Capacitor::new(CapacitorType::Custom, capacitance)
    }

    #[test]
    fn test_capacitance_clamping() {
        let c = Capacitor::new(CapacitorType::Film, 1e-15);
        assert_relative_eq!(c.capacitance(), MIN_CAPACITANCE);
        let c = Capacitor::new(CapacitorType::Film, 1.0);
        assert_relative_eq!(c.capacitance(), MAX_CAPACITANCE);
    }

    #[test]
    fn test_ideal_capacitor_tracks_constant_input() {
        // With ESR = ESL = DA = 0 the update reduces to backward Euler:
        // I = (V_in - V)/Xc and V += I*Xc lands on V_in once the current
        // clamp stops binding.
        let mut c = ideal(1e-6);
        c.set_sample_rate(48000.0);
        let mut v = 0.0;
        for _ in 0..1000 {
            v = c.process(1.0, 1000.0);
        }
        assert_relative_eq!(v, 1.0, max_relative = 1e-6);
    }

    #[test]
    fn test_current_clamp_preserves_sign() {
        let mut c = Capacitor::new(CapacitorType::Paper, 1e-3);
        c.set_sample_rate(48000.0);
        // Huge step at high frequency drives the raw current far past the
        // 0.5 A paper rating
        c.process(1e6, 20000.0);
        assert!(c.current() <= 0.5);
        c.reset();
        c.process(-1e6, 20000.0);
        assert!(c.current() >= -0.5);
    }

    #[test]
    fn test_impedance_falls_with_frequency() {
        let c = Capacitor::new(CapacitorType::Film, 1e-6);
        assert!(c.impedance(100.0) > c.impedance(10_000.0));
    }

    #[test]
    fn test_electrolytic_is_polarized() {
        let c = Capacitor::new(CapacitorType::Electrolytic, 10e-6);
        assert!(c.characteristics().polarized);
        assert!(!Capacitor::new(CapacitorType::Film, 10e-6)
            .characteristics()
            .polarized);
    }

    #[test]
    fn test_reset_clears_memory_bank() {
        let mut c = Capacitor::new(CapacitorType::Electrolytic, 10e-6);
        c.set_sample_rate(48000.0);
        for _ in 0..100 {
            c.process(5.0, 1000.0);
        }
        c.reset();
        assert_eq!(c.voltage(), 0.0);
        assert_eq!(c.current(), 0.0);
        assert!(c.da_accumulators.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut a = Capacitor::new(CapacitorType::Ceramic, 1e-7);
        let mut b = a.clone();
        a.set_sample_rate(48000.0);
        b.set_sample_rate(48000.0);
        a.reset();
        a.reset();
        b.reset();
        for step in 0..50 {
            let v = 0.1 * step as f64;
            assert_eq!(a.process(v, 440.0), b.process(v, 440.0));
        }
    }

    #[test]
    fn test_temperature_adjusts_capacitance() {
        let mut c = Capacitor::new(CapacitorType::Ceramic, 1e-6);
        let z_cold = c.impedance(1000.0);
        c.set_temperature(ROOM_TEMPERATURE + 50.0);
        // Positive coefficient: more capacitance, lower impedance
        assert!(c.impedance(1000.0) < z_cold);
    }

    #[test]
    fn test_custom_overrides() {
        let mut c = Capacitor::new(CapacitorType::Custom, 1e-6);
        c.set_esr(0.25);
        c.set_esl(1e-9);
        c.set_dielectric_absorption(2.0); // clamped
        assert_relative_eq!(c.characteristics().esr, 0.25);
        assert_relative_eq!(c.characteristics().dielectric_absorption, 1.0);
    }
}
