//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index for efficient
//! nearest-image and range queries on periodic images.

mod rtree;

pub use rtree::{ImageEntry, ImageIndex};
