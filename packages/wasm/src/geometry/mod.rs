//! Lattice geometry.
//!
//! The fundamental cell, its fractional coordinate transforms and the integer
//! sector offsets that name its periodic copies.

mod lattice;
mod sector;

pub use lattice::{BASIS_TOLERANCE, Lattice, LatticeError};
pub use sector::Sector;
