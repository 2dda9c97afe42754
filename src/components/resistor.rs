//! Resistor model.
//!
//! Ohm's law with second-order physical effects:
//! - Temperature dependence: R_T = R * (1 + tc * (T - T_ref))
//! - Self-heating: dissipated power raises the effective resistance by
//!   (1 + P / P_rating), with the power measurement trailing one sample
//! - Parasitic reactance: series lead inductance and parallel shunt
//!   capacitance give a frequency-dependent impedance magnitude
//! - Johnson-Nyquist thermal noise over a fixed audio bandwidth

use crate::{BOLTZMANN, ROOM_TEMPERATURE};

/// Minimum resistance in ohms.
pub const MIN_RESISTANCE: f64 = 1.0;
/// Maximum resistance in ohms.
pub const MAX_RESISTANCE: f64 = 1e6;
/// Minimum operating temperature in Kelvin (-40°C).
pub const MIN_TEMPERATURE: f64 = 233.15;
/// Maximum operating temperature in Kelvin (100°C).
pub const MAX_TEMPERATURE: f64 = 373.15;

/// Bandwidth used for the thermal noise estimate (20 kHz audio band).
const NOISE_BANDWIDTH: f64 = 20_000.0;

/// A resistor with temperature, self-heating, and parasitic effects.
#[derive(Debug, Clone)]
pub struct Resistor {
    /// Nominal resistance in ohms at the reference temperature
    resistance: f64,
    /// Temperature coefficient in 1/K (carbon film is about 0.0039)
    temp_coefficient: f64,
    /// Power rating in watts
    power_rating: f64,
    /// Parallel parasitic capacitance in farads
    parasitic_capacitance: f64,
    /// Series parasitic (lead) inductance in henries
    parasitic_inductance: f64,
    /// Operating temperature in Kelvin
    temperature: f64,

    /// Power dissipated by the previous process call, in watts.
    /// Feeds the self-heating term one step behind rather than being
    /// iterated to convergence within a sample.
    dissipated_power: f64,
}

impl Default for Resistor {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl Resistor {
    /// Create a resistor with typical carbon-film parameters.
    pub fn new(resistance: f64) -> Self {
        Self::with_parameters(resistance, 0.0039, 0.25, 0.5e-12, 0.1e-9)
    }

    /// Create a resistor with explicit physical parameters.
    ///
    /// # Arguments
    /// * `resistance` - nominal value in ohms, clamped to [1 Ω, 1 MΩ]
    /// * `temp_coefficient` - temperature coefficient in 1/K
    /// * `power_rating` - rated dissipation in watts
    /// * `parasitic_capacitance` - shunt capacitance in farads
    /// * `parasitic_inductance` - lead inductance in henries
    pub fn with_parameters(
        resistance: f64,
        temp_coefficient: f64,
        power_rating: f64,
        parasitic_capacitance: f64,
        parasitic_inductance: f64,
    ) -> Self {
        Self {
            resistance: resistance.clamp(MIN_RESISTANCE, MAX_RESISTANCE),
            temp_coefficient,
            power_rating: power_rating.max(1e-3),
            parasitic_capacitance: parasitic_capacitance.max(0.0),
            parasitic_inductance: parasitic_inductance.max(0.0),
            temperature: ROOM_TEMPERATURE,
            dissipated_power: 0.0,
        }
    }

    /// Set the nominal resistance, clamped to [1 Ω, 1 MΩ].
    pub fn set_resistance(&mut self, resistance: f64) {
        self.resistance = resistance.clamp(MIN_RESISTANCE, MAX_RESISTANCE);
    }

    /// Get the nominal resistance in ohms.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Set the operating temperature in Kelvin, clamped to [-40°C, 100°C].
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
    }

    /// Get the operating temperature in Kelvin.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Set the temperature coefficient in 1/K.
    pub fn set_temp_coefficient(&mut self, coefficient: f64) {
        self.temp_coefficient = coefficient;
    }

    /// Effective resistance including temperature and self-heating effects.
    ///
    /// R_eff = R * (1 + tc * (T - T_ref)) * (1 + P / P_rating)
    pub fn actual_resistance(&self) -> f64 {
        let temperature_effect =
            1.0 + self.temp_coefficient * (self.temperature - ROOM_TEMPERATURE);
        let power_effect = 1.0 + self.dissipated_power / self.power_rating;
        self.resistance * temperature_effect * power_effect
    }

    /// Process a single sample: current for the given voltage, I = V / R.
    ///
    /// Updates the dissipated-power state afterwards, so the self-heating
    /// term applies from the next call onward.
    pub fn process(&mut self, voltage: f64) -> f64 {
        let r = self.actual_resistance();
        let current = voltage / r;
        self.dissipated_power = voltage * voltage / r;
        current
    }

    /// Current through the resistor for a given voltage (no state update).
    pub fn current(&self, voltage: f64) -> f64 {
        voltage / self.actual_resistance()
    }

    /// Voltage across the resistor for a given current and frequency.
    ///
    /// The parasitic network (series lead inductance, parallel shunt
    /// capacitance) contributes a net reactance
    ///   X = 2πf*L - 2πf*C*R²
    /// (the first-order reactive part of R with shunt C plus series L),
    /// and the total impedance magnitude is Z = sqrt(R² + X²). The
    /// returned voltage is I * R scaled by Z / R, i.e. I * Z.
    ///
    /// Frequency must be positive; the hot path does not validate it.
    pub fn voltage(&self, current: f64, frequency: f64) -> f64 {
        let r = self.actual_resistance();
        let omega = 2.0 * std::f64::consts::PI * frequency;
        let reactance =
            omega * self.parasitic_inductance - omega * self.parasitic_capacitance * r * r;
        let z_total = (r * r + reactance * reactance).sqrt();
        current * z_total
    }

    /// Power dissipated by a given voltage, P = V² / R.
    pub fn power(&self, voltage: f64) -> f64 {
        voltage * voltage / self.actual_resistance()
    }

    /// RMS thermal (Johnson-Nyquist) noise voltage over a 20 kHz bandwidth.
    ///
    /// V_n = sqrt(4 * k * T * R * B)
    pub fn thermal_noise(&self) -> f64 {
        (4.0 * BOLTZMANN * self.temperature * self.actual_resistance() * NOISE_BANDWIDTH).sqrt()
    }

    /// Reset mutable state. Configuration is untouched.
    pub fn reset(&mut self) {
        self.dissipated_power = 0.0;
    }
}
