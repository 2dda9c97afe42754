//! Diode model.
//!
//! Uses the Shockley diode equation:
//!   I = Is * (exp(V / (n * Vt)) - 1)
//!
//! with a one-step series-resistance correction, a reverse region
//!   I = -Is * (1 - exp(V / (n * Vt)))
//! scaled up linearly past the breakdown voltage, and a junction
//! capacitance estimate for both bias regions.
//!
//! The inverse (voltage for a given current) is available analytically
//! and as a bounded Newton-Raphson solve that reports its convergence.
//!
//! Part-type presets (silicon, zener, germanium, LED, schottky) select a
//! characteristics record; `Custom` permits direct overrides.

use crate::{thermal_voltage, ROOM_TEMPERATURE};

/// Forward-voltage limit expressed in multiples of n*Vt. Beyond it the
/// exponential is extrapolated linearly to keep the current finite.
const V_CRIT_FACTOR: f64 = 40.0;

/// Extra reverse current per volt past the breakdown voltage.
const BREAKDOWN_SLOPE: f64 = 10.0;

/// Maximum Newton-Raphson iterations for the voltage inverse.
pub const MAX_INVERSE_ITERATIONS: usize = 10;

/// Convergence threshold on the residual current error, in amperes.
pub const INVERSE_TOLERANCE: f64 = 1e-9;

/// Diode part type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiodeType {
    Silicon,
    Zener,
    Germanium,
    Led,
    Schottky,
    /// Characteristics set directly through the override setters.
    Custom,
}

/// Physical characteristics of a diode part type.
#[derive(Debug, Clone, Copy)]
pub struct DiodeCharacteristics {
    /// Reverse saturation current Is in amperes
    pub saturation_current: f64,
    /// Ideality factor n, typically 1.0 to 2.0
    pub ideality: f64,
    /// Series resistance Rs in ohms
    pub series_resistance: f64,
    /// Reverse breakdown voltage in volts (positive number)
    pub breakdown_voltage: f64,
    /// Zero-bias junction capacitance in farads
    pub junction_capacitance: f64,
    /// Minority-carrier transit time in seconds
    pub transit_time: f64,
    /// Fractional change of Is per Kelvin
    pub temp_coefficient: f64,
    /// Maximum forward current in amperes
    pub max_current: f64,
}

impl DiodeType {
    /// Characteristics record for this part type.
    pub fn characteristics(self) -> DiodeCharacteristics {
        match self {
            // 1N914/1N4148-style small-signal silicon
            DiodeType::Silicon => DiodeCharacteristics {
                saturation_current: 2.52e-9,
                ideality: 1.752,
                series_resistance: 0.568,
                breakdown_voltage: 100.0,
                junction_capacitance: 4e-12,
                transit_time: 2e-8,
                temp_coefficient: 0.07,
                max_current: 0.2,
            },
            // 5.1 V reference zener
            DiodeType::Zener => DiodeCharacteristics {
                saturation_current: 1e-12,
                ideality: 1.0,
                series_resistance: 0.5,
                breakdown_voltage: 5.1,
                junction_capacitance: 3e-11,
                transit_time: 5e-8,
                temp_coefficient: 0.05,
                max_current: 0.1,
            },
            // 1N34A-style germanium: soft knee, leaky
            DiodeType::Germanium => DiodeCharacteristics {
                saturation_current: 2e-7,
                ideality: 1.3,
                series_resistance: 8.0,
                breakdown_voltage: 60.0,
                junction_capacitance: 8e-13,
                transit_time: 1e-8,
                temp_coefficient: 0.09,
                max_current: 0.05,
            },
            // Red indicator LED
            DiodeType::Led => DiodeCharacteristics {
                saturation_current: 1e-18,
                ideality: 2.0,
                series_resistance: 2.0,
                breakdown_voltage: 5.0,
                junction_capacitance: 4e-11,
                transit_time: 1e-9,
                temp_coefficient: 0.04,
                max_current: 0.03,
            },
            // 1N5817-style schottky: low knee, fast
            DiodeType::Schottky => DiodeCharacteristics {
                saturation_current: 1e-6,
                ideality: 1.05,
                series_resistance: 0.1,
                breakdown_voltage: 20.0,
                junction_capacitance: 1.1e-10,
                transit_time: 0.0,
                temp_coefficient: 0.06,
                max_current: 1.0,
            },
            // Neutral starting point for direct overrides
            DiodeType::Custom => DiodeCharacteristics {
                saturation_current: 1e-12,
                ideality: 1.0,
                series_resistance: 0.1,
                breakdown_voltage: 100.0,
                junction_capacitance: 1e-12,
                transit_time: 1e-9,
                temp_coefficient: 0.0,
                max_current: 1.0,
            },
        }
    }
}

/// Result of the Newton-Raphson voltage inverse.
#[derive(Debug, Clone, Copy)]
pub struct InverseSolve {
    /// Best available voltage iterate
    pub voltage: f64,
    /// Whether the residual dropped below [`INVERSE_TOLERANCE`]
    pub converged: bool,
    /// Iterations actually used
    pub iterations: usize,
    /// Final residual current error in amperes
    pub residual: f64,
}

/// A nonlinear junction diode.
#[derive(Debug, Clone)]
pub struct Diode {
    diode_type: DiodeType,
    characteristics: DiodeCharacteristics,
    /// Operating temperature in Kelvin
    temperature: f64,

    // Bookkeeping only; the device model is otherwise memoryless
    last_voltage: f64,
    last_current: f64,
}

impl Default for Diode {
    fn default() -> Self {
        Self::new(DiodeType::Silicon)
    }
}

impl Diode {
    /// Create a diode of the given part type at room temperature.
    pub fn new(diode_type: DiodeType) -> Self {
        Self {
            diode_type,
            characteristics: diode_type.characteristics(),
            temperature: ROOM_TEMPERATURE,
            last_voltage: 0.0,
            last_current: 0.0,
        }
    }

    /// Create a `Custom` diode from explicit Shockley parameters.
    pub fn with_parameters(saturation_current: f64, ideality: f64, series_resistance: f64) -> Self {
        let mut diode = Self::new(DiodeType::Custom);
        diode.set_saturation_current(saturation_current);
        diode.set_ideality(ideality);
        diode.set_series_resistance(series_resistance);
        diode
    }

    /// Switch the part type, reloading its characteristics.
    pub fn set_type(&mut self, diode_type: DiodeType) {
        self.diode_type = diode_type;
        self.characteristics = diode_type.characteristics();
    }

    /// Get the part type.
    pub fn diode_type(&self) -> DiodeType {
        self.diode_type
    }

    /// Get the active characteristics record.
    pub fn characteristics(&self) -> &DiodeCharacteristics {
        &self.characteristics
    }

    /// Set the operating temperature in Kelvin, clamped to [-40°C, 100°C].
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.clamp(233.15, 373.15);
    }

    /// Get the operating temperature in Kelvin.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Set the saturation current, clamped to [1e-18 A, 1e-3 A].
    pub fn set_saturation_current(&mut self, is: f64) {
        self.characteristics.saturation_current = is.clamp(1e-18, 1e-3);
    }

    /// Set the ideality factor, clamped to [0.5, 4.0].
    pub fn set_ideality(&mut self, n: f64) {
        self.characteristics.ideality = n.clamp(0.5, 4.0);
    }

    /// Set the series resistance, clamped to [0 Ω, 100 Ω].
    pub fn set_series_resistance(&mut self, rs: f64) {
        self.characteristics.series_resistance = rs.clamp(0.0, 100.0);
    }

    /// Set the breakdown voltage, clamped to [1 V, 1000 V].
    pub fn set_breakdown_voltage(&mut self, bv: f64) {
        self.characteristics.breakdown_voltage = bv.clamp(1.0, 1000.0);
    }

    /// Set the zero-bias junction capacitance, clamped to [0, 1 µF].
    pub fn set_junction_capacitance(&mut self, cj0: f64) {
        self.characteristics.junction_capacitance = cj0.clamp(0.0, 1e-6);
    }

    /// Set the transit time, clamped to [0, 1 µs].
    pub fn set_transit_time(&mut self, tt: f64) {
        self.characteristics.transit_time = tt.clamp(0.0, 1e-6);
    }

    /// Thermal voltage k*T/q at the operating temperature.
    pub fn vt(&self) -> f64 {
        thermal_voltage(self.temperature)
    }

    /// n * Vt, the voltage scale of the exponential.
    fn n_vt(&self) -> f64 {
        self.characteristics.ideality * self.vt()
    }

    /// Saturation current adjusted for the operating temperature.
    fn adjusted_is(&self) -> f64 {
        let is = self.characteristics.saturation_current;
        (is * (1.0 + self.characteristics.temp_coefficient * (self.temperature - ROOM_TEMPERATURE)))
            .max(1e-18)
    }

    /// Forward Shockley current, extrapolated linearly past 40 * n * Vt
    /// so the exponential cannot run away.
    fn forward_current(&self, voltage: f64) -> f64 {
        let n_vt = self.n_vt();
        let is = self.adjusted_is();
        let v_crit = V_CRIT_FACTOR * n_vt;

        if voltage > v_crit {
            let i_crit = is * ((v_crit / n_vt).exp() - 1.0);
            let g_crit = is / n_vt * (v_crit / n_vt).exp();
            i_crit + g_crit * (voltage - v_crit)
        } else {
            is * ((voltage / n_vt).exp() - 1.0)
        }
    }

    /// Reverse-region current, scaled up linearly past breakdown.
    fn reverse_current(&self, voltage: f64) -> f64 {
        let n_vt = self.n_vt();
        let is = self.adjusted_is();
        let mut current = -is * (1.0 - (voltage / n_vt).exp());

        let bv = self.characteristics.breakdown_voltage;
        if voltage < -bv {
            current *= 1.0 + BREAKDOWN_SLOPE * (-voltage - bv);
        }
        current
    }

    /// Total current at a terminal voltage, with the one-step series
    /// resistance correction: the junction voltage is the terminal
    /// voltage minus the IR drop of the uncorrected forward current, and
    /// the current is recomputed once at that corrected voltage (not
    /// iterated to self-consistency).
    ///
    /// The current estimate for the IR drop is capped at n*Vt/Rs as well
    /// as the device rating; past that point the estimated drop would
    /// grow faster than the applied voltage and the corrected junction
    /// voltage would run backwards, making the I-V curve non-monotonic.
    pub fn current(&self, voltage: f64) -> f64 {
        let rs = self.characteristics.series_resistance;
        let i_estimate = self
            .forward_current(voltage)
            .min(self.characteristics.max_current)
            .min(self.n_vt() / rs);
        let vd = if voltage >= 0.0 {
            // The IR drop cannot exceed the applied voltage
            (voltage - rs * i_estimate).max(0.0)
        } else {
            voltage
        };

        if vd >= 0.0 {
            self.forward_current(vd)
        } else {
            self.reverse_current(vd)
        }
    }

    /// Process a single sample: current for the given voltage.
    pub fn process(&mut self, voltage: f64) -> f64 {
        let current = self.current(voltage);
        self.last_voltage = voltage;
        self.last_current = current;
        current
    }

    /// Analytic inverse: terminal voltage for a given current.
    ///
    /// V = n*Vt*ln(I/Is + 1) + I*Rs for forward current, and the same
    /// logarithm for reverse-direction current with |I| < Is. Reverse
    /// currents at or beyond -Is have no finite analytic inverse and are
    /// pinned near the saturation asymptote.
    pub fn voltage(&self, current: f64) -> f64 {
        let n_vt = self.n_vt();
        let is = self.adjusted_is();
        let ratio = (1.0 + current / is).max(1e-12);
        n_vt * ratio.ln() + current * self.characteristics.series_resistance
    }

    /// Newton-Raphson inverse: solve `current(v) == current` for v.
    ///
    /// Bounded at [`MAX_INVERSE_ITERATIONS`] iterations with the
    /// [`INVERSE_TOLERANCE`] residual threshold; if the loop exhausts
    /// without converging the best iterate is still returned, flagged
    /// through [`InverseSolve::converged`].
    pub fn solve_voltage(&self, current: f64) -> InverseSolve {
        let n_vt = self.n_vt();
        let is = self.adjusted_is();

        // Seed with the analytic junction voltage; starting from zero
        // makes the first step overshoot by orders of magnitude on an
        // exponential device
        let mut v = n_vt * (1.0 + current / is).max(1e-12).ln();
        let mut residual = self.current(v) - current;
        let mut iterations = 0;

        for _ in 0..MAX_INVERSE_ITERATIONS {
            if residual.abs() < INVERSE_TOLERANCE {
                break;
            }
            iterations += 1;

            // dI/dV = Is/(n*Vt) * exp(V/(n*Vt)), floored away from zero
            // so deep reverse bias cannot produce an unbounded step
            let di_dv = (is / n_vt * (v / n_vt).exp()).max(1e-12);
            let step = (residual / di_dv).clamp(-0.5, 0.5);
            v -= step;
            residual = self.current(v) - current;
        }

        InverseSolve {
            voltage: v,
            converged: residual.abs() < INVERSE_TOLERANCE,
            iterations,
            residual,
        }
    }

    /// Junction capacitance estimate at a terminal voltage.
    ///
    /// Reverse bias: depletion capacitance C0 / sqrt(1 - V/Vbr).
    /// Forward bias: C0 plus the diffusion term tt * I_f / Vt.
    ///
    /// Not part of the default signal path.
    pub fn junction_capacitance(&self, voltage: f64) -> f64 {
        let c0 = self.characteristics.junction_capacitance;
        if voltage < 0.0 {
            let bv = self.characteristics.breakdown_voltage;
            c0 / (1.0 - voltage / bv).max(1e-6).sqrt()
        } else {
            c0 + self.characteristics.transit_time * self.forward_current(voltage) / self.vt()
        }
    }

    /// Voltage across the diode at the last process call.
    pub fn last_voltage(&self) -> f64 {
        self.last_voltage
    }

    /// Current through the diode at the last process call.
    pub fn last_current(&self) -> f64 {
        self.last_current
    }

    /// Clear the last-voltage/last-current bookkeeping. The device model
    /// itself is memoryless besides that bookkeeping.
    pub fn reset(&mut self) {
        self.last_voltage = 0.0;
        self.last_current = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_crossing() {
        for diode_type in [
            DiodeType::Silicon,
            DiodeType::Zener,
            DiodeType::Germanium,
            DiodeType::Led,
            DiodeType::Schottky,
            DiodeType::Custom,
        ] {
            let mut d = Diode::new(diode_type);
            assert_eq!(d.process(0.0), 0.0);
        }
    }

    #[test]
    fn test_exponential_forward_growth() {
        // Is = 1e-12, n = 1: raising the forward voltage from 0.3 V to
        // 0.6 V multiplies the current by several orders of magnitude
        let mut d = Diode::with_parameters(1e-12, 1.0, 0.0);
        d.set_temperature(ROOM_TEMPERATURE);
        let i_small = d.process(0.3);
        let i_large = d.process(0.6);
        assert!(i_small > 0.0);
        assert!(i_large > i_small * 1e3);
    }

    #[test]
    fn test_monotonic_in_forward_region() {
        // Strictly increasing from weak reverse bias through the
        // overdriven forward region, including the window where the
        // Rs-correction estimate hits its n*Vt/Rs cap (near 0.76 V for
        // silicon)
        let d = Diode::new(DiodeType::Silicon);
        let mut prev = d.current(-0.5);
        let mut v = -0.5 + 0.01;
        while v < 0.9 {
            let i = d.current(v);
            assert!(i > prev, "current not increasing at v = {v}: {i} <= {prev}");
            prev = i;
            v += 0.01;
        }
    }

    #[test]
    fn test_nondecreasing_in_deep_reverse() {
        // Deep reverse bias flattens onto -Is below the f64 resolution
        // of the exponential; consecutive samples may be bit-identical
        // but the curve must never bend back
        let d = Diode::new(DiodeType::Silicon);
        let mut prev = d.current(-2.0);
        let mut v = -2.0 + 0.01;
        while v < -0.5 {
            let i = d.current(v);
            assert!(i >= prev, "current decreased at v = {v}: {i} < {prev}");
            prev = i;
            v += 0.01;
        }
    }

    #[test]
    fn test_reverse_bias_approaches_saturation() {
        let d = Diode::new(DiodeType::Silicon);
        let i = d.current(-5.0);
        assert!(i < 0.0);
        // Within a factor of the temperature-adjusted saturation current
        assert!(i > -1e-8);
    }

    #[test]
    fn test_breakdown_multiplies_reverse_current() {
        let d = Diode::new(DiodeType::Zener); // 5.1 V breakdown
        let before = d.current(-5.0).abs();
        let after = d.current(-7.0).abs();
        assert!(after > before * 5.0);
    }

    #[test]
    fn test_round_trip_forward_region() {
        let d = Diode::new(DiodeType::Silicon);
        for v in [0.35, 0.40, 0.45, 0.50] {
            let i = d.current(v);
            let v_back = d.voltage(i);
            assert!((v_back - v).abs() < 1e-6, "round trip at {v}: got {v_back}");
        }
    }

    #[test]
    fn test_newton_inverse_converges() {
        let d = Diode::new(DiodeType::Silicon);
        let i = d.current(0.55);
        let solve = d.solve_voltage(i);
        assert!(solve.converged, "residual {}", solve.residual);
        assert!(solve.iterations <= MAX_INVERSE_ITERATIONS);
        assert!((d.current(solve.voltage) - i).abs() < INVERSE_TOLERANCE);
    }

    #[test]
    fn test_newton_inverse_zero_current() {
        let d = Diode::new(DiodeType::Silicon);
        let solve = d.solve_voltage(0.0);
        assert!(solve.converged);
        assert!(solve.voltage.abs() < 1e-6);
    }

    #[test]
    fn test_junction_capacitance_regions() {
        let d = Diode::new(DiodeType::Silicon);
        let c0 = d.characteristics().junction_capacitance;
        // Reverse bias shrinks the depletion capacitance
        assert!(d.junction_capacitance(-10.0) < c0);
        // Forward bias adds the diffusion term
        assert!(d.junction_capacitance(0.6) > c0);
    }

    #[test]
    fn test_parameter_clamping() {
        let mut d = Diode::new(DiodeType::Custom);
        d.set_saturation_current(1.0);
        assert_relative_eq!(d.characteristics().saturation_current, 1e-3);
        d.set_ideality(0.0);
        assert_relative_eq!(d.characteristics().ideality, 0.5);
        d.set_series_resistance(-5.0);
        assert_relative_eq!(d.characteristics().series_resistance, 0.0);
    }

    #[test]
    fn test_reset_clears_bookkeeping_only() {
        let mut d = Diode::new(DiodeType::Germanium);
        d.process(0.4);
        assert!(d.last_current() > 0.0);
        d.reset();
        assert_eq!(d.last_voltage(), 0.0);
        assert_eq!(d.last_current(), 0.0);
        assert_eq!(d.diode_type(), DiodeType::Germanium);
    }
}
