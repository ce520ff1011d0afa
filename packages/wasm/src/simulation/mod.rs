//! The interactive simulation instance.
//!
//! Owns the point set, the lattice and all live parameters, and turns
//! pointer, timer and export requests into core operations.

mod engine;

pub use engine::{DEMO_POINTS, Simulation, TENSION_SLIDER_RANGE};
