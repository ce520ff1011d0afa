//! R-tree based spatial index over periodic images using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Nearest image within a pick radius
//! - Images within a radius

use glam::DVec2;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::points::PointImage;

/// An image in the spatial index with its absolute position.
///
/// `ordinal` is the image's position in the enumeration the index was built
/// from; equal-distance hits resolve to the smallest ordinal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageEntry {
    pub image: PointImage,
    pub ordinal: u32,
    pub x: f64,
    pub y: f64,
}

impl ImageEntry {
    /// Create a new ImageEntry.
    pub fn new(image: PointImage, ordinal: u32, position: DVec2) -> Self {
        Self {
            image,
            ordinal,
            x: position.x,
            y: position.y,
        }
    }
}

impl RTreeObject for ImageEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for ImageEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.x == point[0] && self.y == point[1]
    }
}

/// Spatial index for periodic images.
///
/// Uses an R*-tree for efficient spatial queries. Built in bulk from an
/// ordered image enumeration; positions are a snapshot and the index must be
/// rebuilt after points move.
pub struct ImageIndex {
    tree: RTree<ImageEntry>,
}

impl ImageIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load an index from `(image, position)` pairs. Ordinals follow the
    /// iteration order.
    pub fn build<I>(images: I) -> Self
    where
        I: IntoIterator<Item = (PointImage, DVec2)>,
    {
        let entries: Vec<_> = images
            .into_iter()
            .enumerate()
            .map(|(ordinal, (image, pos))| ImageEntry::new(image, ordinal as u32, pos))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Find the image nearest to `target` whose squared distance is strictly
    /// below `max_distance²`.
    ///
    /// Among images at exactly the same distance the one enumerated first
    /// wins, so repeated queries pick the same image.
    pub fn nearest_within(&self, target: DVec2, max_distance: f64) -> Option<PointImage> {
        let max_distance_sq = max_distance * max_distance;
        let query = [target.x, target.y];

        let nearest = self.tree.nearest_neighbor(&query)?;
        let best_sq = nearest.distance_2(&query);
        if !(best_sq < max_distance_sq) {
            return None;
        }

        let best = self
            .tree
            .locate_within_distance(query, best_sq)
            .min_by_key(|entry| entry.ordinal)
            .unwrap_or(nearest);
        Some(best.image)
    }

    /// Get the number of images in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for ImageIndex {
    fn default() -> Self {
        Self::new()
    }
}
