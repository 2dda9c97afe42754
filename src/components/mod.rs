//! Component models for analog circuit simulation.
//!
//! This module provides physical models for all supported components:
//! - Passive: Resistor, Capacitor
//! - Nonlinear: Diode, Transistor (BJT), OpAmp
//! - Controls: Potentiometer
//!
//! Each component follows the same contract: construction clamps its
//! configuration to documented physical ranges, `process(...)` advances
//! one sample, `reset()` zeroes mutable state without touching
//! configuration, and components that integrate over time take the
//! host's sample rate through `set_sample_rate` before processing.

mod capacitor;
mod diode;
mod opamp;
mod potentiometer;
mod resistor;
mod transistor;

pub use capacitor::{
    Capacitor, CapacitorCharacteristics, CapacitorType, DA_BANK_SIZE, DA_TIME_CONSTANTS,
};
pub use diode::{
    Diode, DiodeCharacteristics, DiodeType, InverseSolve, INVERSE_TOLERANCE,
    MAX_INVERSE_ITERATIONS,
};
pub use opamp::OpAmp;
pub use potentiometer::{Potentiometer, Taper};
pub use resistor::Resistor;
pub use transistor::{Transistor, TransistorType};
