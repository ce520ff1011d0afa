//! PointSet - the densely indexed base point store.
//!
//! Points live in a single `Vec` so ids are always exactly `0..len`. Deleting
//! a point shifts every later point down by one. Positions are written through
//! explicit setters; nothing hands out `&mut Point`.

use glam::DVec2;

use super::point::{Point, PointId};
use crate::geometry::Lattice;

/// Ordered collection of colored base points.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Create an empty point set.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point set with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Append a point with the next sequential id. The position is stored as
    /// given.
    pub fn add_point(&mut self, position: DVec2, color: i32) -> PointId {
        let id = PointId(self.points.len() as u32);
        self.points.push(Point::new(position, color));
        id
    }

    /// Remove a point and renumber every later point.
    ///
    /// Returns false (and does nothing) for an out-of-range id.
    pub fn delete_point(&mut self, id: PointId) -> bool {
        if id.index() >= self.points.len() {
            return false;
        }
        self.points.remove(id.index());
        true
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: PointId) -> bool {
        id.index() < self.points.len()
    }

    /// Get a point.
    #[inline]
    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.get(id.index())
    }

    /// Get a point's stored position.
    #[inline]
    pub fn position(&self, id: PointId) -> Option<DVec2> {
        self.get(id).map(|p| p.position)
    }

    /// Get a point's color.
    #[inline]
    pub fn color(&self, id: PointId) -> Option<i32> {
        self.get(id).map(|p| p.color)
    }

    /// Overwrite a point's stored position.
    ///
    /// Returns false for an out-of-range id.
    pub fn set_position(&mut self, id: PointId, position: DVec2) -> bool {
        match self.points.get_mut(id.index()) {
            Some(point) => {
                point.position = position;
                true
            }
            None => false,
        }
    }

    /// Move every stored position into the lattice's fundamental cell.
    pub fn canonicalize_all(&mut self, lattice: &Lattice) {
        for point in &mut self.points {
            point.position = lattice.canonicalize(point.position);
        }
    }

    /// Iterate over ids in index order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = PointId> + '_ {
        (0..self.points.len() as u32).map(PointId)
    }

    /// Iterate over `(id, point)` pairs in index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (PointId, &Point)> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (PointId(i as u32), p))
    }

    /// Get all points as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}
