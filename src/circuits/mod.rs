//! Composed circuits built from the component models.
//!
//! Each circuit owns its components and persistent state, wires them
//! into a fixed, hand-composed signal path (no nodal matrix solve), and
//! processes audio sample by sample.

mod transistor_clipper;

pub use transistor_clipper::{BlockStats, ClipperObserver, TransistorClipper};
