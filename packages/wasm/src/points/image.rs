//! Periodic images of base points.

use std::fmt;

use serde::Serialize;

use super::point::PointId;
use crate::geometry::Sector;

/// One periodic copy of a base point: `(point, sector)`.
///
/// An image is a plain value; it owns nothing and is resolved against a
/// [`PeriodicView`](crate::periodic::PeriodicView). It goes stale when the
/// point set is structurally mutated and must be re-derived afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PointImage {
    pub point: PointId,
    pub sector: Sector,
}

impl PointImage {
    #[inline]
    pub fn new(point: PointId, sector: Sector) -> Self {
        Self { point, sector }
    }

    /// The image stored directly in the fundamental cell.
    #[inline]
    pub fn raw(point: PointId) -> Self {
        Self {
            point,
            sector: Sector::ORIGIN,
        }
    }

    #[inline]
    pub fn is_raw(self) -> bool {
        self.sector.is_origin()
    }
}

impl fmt::Display for PointImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({}, {})", self.point, self.sector.dx, self.sector.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_identity() {
        let a = PointImage::new(PointId(1), Sector::new(0, 1));
        assert_eq!(a, PointImage::new(PointId(1), Sector::new(0, 1)));
        assert_ne!(a, PointImage::new(PointId(1), Sector::ORIGIN));
        assert_ne!(a, PointImage::new(PointId(2), Sector::new(0, 1)));
        assert!(!a.is_raw());
        assert!(PointImage::raw(PointId(1)).is_raw());
        assert_eq!(format!("{}", a), "Point(1)@(0, 1)");
    }
}
