//! Potentiometer model.
//!
//! A variable voltage divider over a resistive track:
//!   n1 ----[R1]---- wiper ----[R2]---- n2
//!
//! R1 = position_eff * total and R2 = (1 - position_eff) * total, where
//! the effective position follows the taper curve. The divider holds its
//! own total-resistance value; it is composed from the resistance math
//! rather than inheriting a resistor, since the divider needs no shared
//! mutable state with the other components.

/// Minimum track resistance in ohms.
pub const MIN_TOTAL_RESISTANCE: f64 = 1.0;
/// Maximum track resistance in ohms.
pub const MAX_TOTAL_RESISTANCE: f64 = 1e6;

/// Position-to-ratio taper curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taper {
    /// Ratio equals the wiper position.
    Linear,
    /// Audio taper: (10^position - 1) / 9, a fixed base-10 curve that
    /// approximates a standard audio-taper response.
    Logarithmic,
}

impl Taper {
    /// Map a raw wiper position in [0, 1] to the divider ratio.
    pub fn apply(self, position: f64) -> f64 {
        match self {
            Taper::Linear => position,
            Taper::Logarithmic => (10f64.powf(position) - 1.0) / 9.0,
        }
    }
}

/// A potentiometer wired as a voltage divider.
#[derive(Debug, Clone)]
pub struct Potentiometer {
    /// Total track resistance in ohms
    total_resistance: f64,
    /// Raw wiper position in [0, 1]
    position: f64,
    taper: Taper,
}

impl Default for Potentiometer {
    fn default() -> Self {
        Self::new(10_000.0, 0.5, Taper::Linear)
    }
}

impl Potentiometer {
    /// Create a potentiometer.
    ///
    /// Total resistance is clamped to [1 Ω, 1 MΩ]; position to [0, 1].
    pub fn new(total_resistance: f64, position: f64, taper: Taper) -> Self {
        Self {
            total_resistance: total_resistance.clamp(MIN_TOTAL_RESISTANCE, MAX_TOTAL_RESISTANCE),
            position: position.clamp(0.0, 1.0),
            taper,
        }
    }

    /// Set the wiper position, clamped to [0, 1].
    pub fn set_position(&mut self, position: f64) {
        self.position = position.clamp(0.0, 1.0);
    }

    /// Get the raw wiper position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Wiper position after the taper curve.
    pub fn effective_position(&self) -> f64 {
        self.taper.apply(self.position)
    }

    /// Set the taper curve.
    pub fn set_taper(&mut self, taper: Taper) {
        self.taper = taper;
    }

    /// Get the taper curve.
    pub fn taper(&self) -> Taper {
        self.taper
    }

    /// Set the total track resistance, clamped to [1 Ω, 1 MΩ].
    pub fn set_total_resistance(&mut self, total_resistance: f64) {
        self.total_resistance =
            total_resistance.clamp(MIN_TOTAL_RESISTANCE, MAX_TOTAL_RESISTANCE);
    }

    /// Get the total track resistance in ohms.
    pub fn total_resistance(&self) -> f64 {
        self.total_resistance
    }

    /// Resistance between terminal 1 and the wiper.
    pub fn resistance1(&self) -> f64 {
        self.total_resistance * self.effective_position()
    }

    /// Resistance between the wiper and terminal 2.
    pub fn resistance2(&self) -> f64 {
        self.total_resistance * (1.0 - self.effective_position())
    }

    /// Process a single sample: wiper voltage between the two terminal
    /// voltages, V_wiper = V1 + (V2 - V1) * position_eff.
    pub fn process(&self, voltage1: f64, voltage2: f64) -> f64 {
        voltage1 + (voltage2 - voltage1) * self.effective_position()
    }

    /// Reset. The potentiometer holds no mutable processing state; the
    /// wiper position is configuration and survives.
    pub fn reset(&mut self) {}
}
