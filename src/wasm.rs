//! WASM bindings for Analog Core.
//!
//! This module provides JavaScript-friendly bindings for use in web
//! browsers with Web Audio API's AudioWorklet.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmClipper } from 'analog_core';
//!
//! await init();
//!
//! const clipper = new WasmClipper(48000);
//! clipper.set_drive(0.7);
//!
//! // In AudioWorkletProcessor.process():
//! const samples = outputBuffer.getChannelData(0);
//! clipper.process_block(samples);
//! ```

use wasm_bindgen::prelude::*;

use crate::circuits::TransistorClipper;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible transistor clipper.
///
/// Wraps the native [`TransistorClipper`] with a JavaScript-friendly API
/// for processing audio blocks in a Web Audio AudioWorklet.
#[wasm_bindgen]
pub struct WasmClipper {
    clipper: TransistorClipper,
}

#[wasm_bindgen]
impl WasmClipper {
    /// Create a new clipper.
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz (typically 44100 or 48000)
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> Result<WasmClipper, JsValue> {
        let mut clipper = TransistorClipper::new();
        clipper
            .prepare(sample_rate)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmClipper { clipper })
    }

    /// Set the drive amount, clamped to [0, 1].
    pub fn set_drive(&mut self, drive: f64) {
        self.clipper.set_drive(drive);
    }

    /// Process a block of samples in place.
    pub fn process_block(&mut self, samples: &mut [f32]) {
        self.clipper.process_block(samples);
    }

    /// Reset the clipper state without touching its configuration.
    pub fn reset(&mut self) {
        self.clipper.reset();
    }

    /// Numeric faults contained since the last reset.
    pub fn fault_count(&self) -> usize {
        self.clipper.fault_count()
    }
}
