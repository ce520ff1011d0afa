//! Point type and related structures.
//!
//! Points are the base (fundamental-cell) entries of the tiling. Each point has:
//! - A dense positional identifier (renumbered when an earlier point is deleted)
//! - A position, canonicalized into the fundamental cell by the simulation
//! - An integer color/type tag

use std::fmt;

use glam::DVec2;
use serde::Serialize;

/// Dense point identifier.
///
/// Unlike a stable id this is the point's position in the [`PointSet`], so it
/// is invalidated by any deletion of an earlier point.
///
/// [`PointSet`]: super::PointSet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PointId(pub u32);

impl PointId {
    /// Create a new PointId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The id as a slice index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({})", self.0)
    }
}

impl From<u32> for PointId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<PointId> for u32 {
    #[inline]
    fn from(id: PointId) -> Self {
        id.0
    }
}

/// A colored base point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: DVec2,
    pub color: i32,
}

impl Point {
    #[inline]
    pub fn new(position: DVec2, color: i32) -> Self {
        Self { position, color }
    }
}
