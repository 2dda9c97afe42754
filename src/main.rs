//! Clipper - transistor clipper distortion for raw PCM streams.
//!
//! # Usage
//!
//! ```bash
//! ffmpeg -i input.wav -f f32le -ac 1 -ar 48000 - | clipper --drive 0.7 | ffmpeg -f f32le -ac 1 -ar 48000 -i - output.wav
//! ```

use clap::Parser;
use analog_core::{
    audio::process_audio,
    error::Result,
    TransistorClipper, DEFAULT_SAMPLE_RATE,
};

/// Transistor clipper distortion effect
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Drive amount, 0.0 to 1.0
    #[arg(short, long, default_value_t = 0.5)]
    drive: f64,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    /// Use a single transistor stage instead of the Darlington pair
    #[arg(long)]
    single_stage: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut clipper = TransistorClipper::new();
    clipper.prepare(args.sample_rate)?;
    clipper.set_drive(args.drive);
    clipper.set_darlington(!args.single_stage);

    process_audio(&mut clipper)
}
