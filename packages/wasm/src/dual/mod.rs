//! Dual graph export.
//!
//! This module turns the periodic point set into a finite neighbour graph:
//! - `triangulate`: Delaunay primitive (delaunator)
//! - `builder`: radius-bounded image sampling with a halo ring
//! - `artifact`: the exported graph and its encodings

mod artifact;
mod builder;
mod triangulate;

pub use artifact::{DocumentNeighbor, DocumentShape, DocumentVertex, DualDocument, DualGraph, DualVertex};
pub use builder::{DEFAULT_MAX_SECTOR_WINDOW, NeighborGraphBuilder};
pub use triangulate::{triangulate, unique_edges};
