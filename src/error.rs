//! Error types for the analog_core edges.
//!
//! This module provides a unified error type [`AnalogError`] for the
//! non-real-time surfaces of the crate: audio I/O, CLI setup, and the WASM
//! constructor. The component models themselves never return errors from
//! the processing path; out-of-range configuration is clamped and runtime
//! numeric faults are contained locally (see the crate docs).

use thiserror::Error;

/// Result type alias using [`AnalogError`].
pub type Result<T> = std::result::Result<T, AnalogError>;

/// Unified error type for all analog_core operations.
#[derive(Error, Debug)]
pub enum AnalogError {
    // ============ Setup Errors ============
    /// Invalid sample rate supplied by the host
    #[error("Invalid sample rate {rate} Hz - must be positive and finite")]
    InvalidSampleRate { rate: f64 },

    /// Invalid processing parameter
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // ============ I/O Errors ============
    /// Error reading audio input
    #[error("Audio input error: {message}")]
    AudioInputError { message: String },

    /// Error writing audio output
    #[error("Audio output error: {message}")]
    AudioOutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl AnalogError {
    /// Create an invalid-sample-rate error
    pub fn invalid_sample_rate(rate: f64) -> Self {
        Self::InvalidSampleRate { rate }
    }

    /// Create an invalid-parameter error
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
