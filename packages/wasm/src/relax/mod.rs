//! Constraint relaxation over the periodic point set.

mod engine;

pub use engine::RelaxationEngine;
