//! Audio I/O for the CLI frontend.
//!
//! Handles reading raw f32le PCM from stdin and writing to stdout, block
//! by block, through a [`TransistorClipper`].

use std::io::{self, Read, Write};

use crate::circuits::TransistorClipper;
use crate::error::{AnalogError, Result};

/// Buffer size for audio processing (in samples).
pub const BUFFER_SIZE: usize = 256;

/// Audio input reader from stdin.
pub struct AudioInput {
    buffer: Vec<u8>,
}

impl AudioInput {
    /// Create a new audio input reader.
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; BUFFER_SIZE * 4], // 4 bytes per f32
        }
    }

    /// Read a block of samples from stdin.
    /// Returns the number of samples read, or 0 on EOF.
    pub fn read_block(&mut self, samples: &mut [f32]) -> Result<usize> {
        let bytes_to_read = samples.len() * 4;
        let buffer = &mut self.buffer[..bytes_to_read];

        let bytes_read = io::stdin()
            .read(buffer)
            .map_err(|e| AnalogError::AudioInputError {
                message: e.to_string(),
            })?;

        let samples_read = bytes_read / 4;
        for (sample, bytes) in samples
            .iter_mut()
            .zip(buffer.chunks_exact(4))
            .take(samples_read)
        {
            *sample = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        Ok(samples_read)
    }
}

impl Default for AudioInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Audio output writer to stdout.
pub struct AudioOutput {
    buffer: Vec<u8>,
}

impl AudioOutput {
    /// Create a new audio output writer.
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; BUFFER_SIZE * 4],
        }
    }

    /// Write a block of samples to stdout.
    pub fn write_block(&mut self, samples: &[f32]) -> Result<()> {
        let bytes_needed = samples.len() * 4;
        if self.buffer.len() < bytes_needed {
            self.buffer.resize(bytes_needed, 0);
        }

        for (chunk, &sample) in self.buffer.chunks_exact_mut(4).zip(samples) {
            chunk.copy_from_slice(&sample.to_le_bytes());
        }

        io::stdout()
            .write_all(&self.buffer[..bytes_needed])
            .map_err(|e| AnalogError::AudioOutputError {
                message: e.to_string(),
            })
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<()> {
        io::stdout()
            .flush()
            .map_err(|e| AnalogError::AudioOutputError {
                message: e.to_string(),
            })
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Process audio from stdin to stdout through the given clipper until EOF.
pub fn process_audio(clipper: &mut TransistorClipper) -> Result<()> {
    let mut input = AudioInput::new();
    let mut output = AudioOutput::new();
    let mut samples = [0.0f32; BUFFER_SIZE];

    loop {
        let count = input.read_block(&mut samples)?;
        if count == 0 {
            break;
        }
        clipper.process_block(&mut samples[..count]);
        output.write_block(&samples[..count])?;
    }

    output.flush()
}
