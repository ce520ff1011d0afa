//! PeriodicView - read-only access to the tiled plane.
//!
//! The view borrows a [`PointSet`] and a [`Lattice`] and enumerates periodic
//! images over a square window of sectors. Enumeration is always sector-major,
//! point-minor, with sectors in row-major order; picking and drawing rely on
//! that order.

use glam::DVec2;

use crate::geometry::{Lattice, Sector};
use crate::points::{PointId, PointImage, PointSet};
use crate::spatial::ImageIndex;

/// Sector radius of the immediate neighbourhood used for relaxation and picking.
pub const NEIGHBORHOOD_RADIUS: i32 = 1;

/// Borrowed view of a point set tiled by a lattice.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicView<'a> {
    points: &'a PointSet,
    lattice: &'a Lattice,
}

impl<'a> PeriodicView<'a> {
    pub fn new(points: &'a PointSet, lattice: &'a Lattice) -> Self {
        Self { points, lattice }
    }

    #[inline]
    pub fn points(&self) -> &'a PointSet {
        self.points
    }

    #[inline]
    pub fn lattice(&self) -> &'a Lattice {
        self.lattice
    }

    /// All sectors within `radius`, row-major.
    pub fn sectors(&self, radius: i32) -> Vec<Sector> {
        Sector::window(radius)
    }

    /// Every point in every sector of the window, sector-major.
    pub fn images(&self, radius: i32) -> Vec<PointImage> {
        let sectors = self.sectors(radius);
        let mut images = Vec::with_capacity(sectors.len() * self.points.len());
        for sector in sectors {
            images.extend(self.points.ids().map(|id| PointImage::new(id, sector)));
        }
        images
    }

    /// One image per stored point, in sector `(0, 0)`, in index order.
    pub fn raw_images(&self) -> Vec<PointImage> {
        self.points.ids().map(PointImage::raw).collect()
    }

    /// Absolute position of an image, or `None` if its point no longer exists.
    pub fn absolute_position(&self, image: PointImage) -> Option<DVec2> {
        self.points
            .position(image.point)
            .map(|base| base + self.lattice.offset(image.sector))
    }

    /// Color of an image's base point.
    pub fn color(&self, image: PointImage) -> Option<i32> {
        self.points.color(image.point)
    }

    /// True if the image still refers to a stored point.
    pub fn is_valid(&self, image: PointImage) -> bool {
        self.points.contains(image.point)
    }

    /// `(image, absolute position)` pairs for a sector window, in enumeration
    /// order.
    pub fn positioned_images(&self, radius: i32) -> Vec<(PointImage, DVec2)> {
        let sectors = self.sectors(radius);
        let mut out = Vec::with_capacity(sectors.len() * self.points.len());
        for sector in sectors {
            let offset = self.lattice.offset(sector);
            for (id, point) in self.points.iter() {
                out.push((PointImage::new(id, sector), point.position + offset));
            }
        }
        out
    }

    /// The image in the 3×3 neighbourhood closest to `target`, if its distance
    /// is strictly below `max_distance`.
    ///
    /// Equidistant candidates resolve to the one enumerated first by
    /// [`images`](Self::images)`(1)`.
    pub fn nearest_image(&self, target: DVec2, max_distance: f64) -> Option<PointImage> {
        if self.points.is_empty() {
            return None;
        }
        ImageIndex::build(self.positioned_images(NEIGHBORHOOD_RADIUS))
            .nearest_within(target, max_distance)
    }

    /// Base point of the nearest image, see [`nearest_image`](Self::nearest_image).
    pub fn nearest_point(&self, target: DVec2, max_distance: f64) -> Option<PointId> {
        self.nearest_image(target, max_distance).map(|image| image.point)
    }
}
