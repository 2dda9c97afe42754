//! # Analog Core
//!
//! Component-level analog circuit simulation for guitar pedal distortion.
//!
//! This library provides:
//! - Physical models of discrete analog components (resistor, capacitor,
//!   diode, BJT, potentiometer, op-amp) with temperature effects,
//!   parasitics, and multi-region nonlinear behavior
//! - A hand-composed transistor clipper circuit that chains the component
//!   models into a per-sample distortion transfer function
//! - Audio processing pipeline for real-time effect simulation
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`components`] - Component models (resistor, capacitor, diode, BJT, ...)
//! - [`circuits`] - Composed circuits built from the component models
//! - [`error`] - Error types for the non-real-time edges (I/O, CLI)
//! - [`audio`] - Audio I/O and processing (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ffmpeg -i input.wav -f f32le -ac 1 -ar 48000 - | clipper --drive 0.7 | ffmpeg -f f32le -ac 1 -ar 48000 -i - output.wav
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmClipper } from 'analog_core';
//!
//! const clipper = new WasmClipper(48000);
//! clipper.set_drive(0.7);
//! clipper.process_block(buffer);
//! ```
//!
//! ## Simulation Method
//!
//! Unlike a nodal (SPICE-style) solver, each component model is evaluated
//! independently and composed along a fixed signal path. Reactive behavior
//! is discretized per sample with dt = 1/sample_rate: the capacitor
//! integrates charge with backward Euler plus parasitic (ESR/ESL) and
//! dielectric-absorption terms, and the diode inverse is solved with a
//! bounded scalar Newton-Raphson iteration.
//!
//! The processing path never allocates, locks, or returns errors; runtime
//! numeric faults (NaN/Inf) are contained at the circuit boundary and
//! replaced with silence for the affected sample.

pub mod circuits;
pub mod components;
pub mod error;

#[cfg(feature = "cli")]
pub mod audio;

// Re-export main types for convenience
pub use circuits::{BlockStats, ClipperObserver, TransistorClipper};
pub use error::{AnalogError, Result};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmClipper;

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Boltzmann constant in J/K
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Elementary charge in C
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Reference temperature in Kelvin (20°C)
pub const ROOM_TEMPERATURE: f64 = 293.15;

/// Thermal voltage k*T/q at the given temperature in Kelvin.
pub fn thermal_voltage(temperature: f64) -> f64 {
    BOLTZMANN * temperature / ELEMENTARY_CHARGE
}
