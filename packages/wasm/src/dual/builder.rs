//! NeighborGraphBuilder - Delaunay neighbour graph of a radius-bounded sample.
//!
//! The builder samples every periodic image within `R + ε` of the origin,
//! sorts by distance, triangulates the whole sample and keeps only triangles
//! whose three corners lie strictly inside `R`. The ring between `R` and
//! `R + ε` is the halo: it shapes the triangulation near the cutoff but never
//! reaches the output.

use glam::DVec2;
use log::{debug, warn};
use petgraph::graph::{NodeIndex, UnGraph};

use super::artifact::{DualGraph, DualVertex};
use super::triangulate::triangulate;
use crate::geometry::Sector;
use crate::periodic::PeriodicView;
use crate::points::PointImage;

/// Default upper bound on the sampled sector radius.
pub const DEFAULT_MAX_SECTOR_WINDOW: i32 = 64;

/// A sampled image with its absolute position.
#[derive(Debug, Clone, Copy)]
struct Sample {
    image: PointImage,
    position: DVec2,
    distance_sq: f64,
    color: i32,
}

/// Builds [`DualGraph`]s from a periodic view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborGraphBuilder {
    max_sector_window: i32,
}

impl Default for NeighborGraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SECTOR_WINDOW)
    }
}

impl NeighborGraphBuilder {
    pub fn new(max_sector_window: i32) -> Self {
        Self {
            max_sector_window: max_sector_window.max(0),
        }
    }

    #[inline]
    pub fn max_sector_window(&self) -> i32 {
        self.max_sector_window
    }

    pub fn set_max_sector_window(&mut self, window: i32) {
        self.max_sector_window = window.max(0);
    }

    /// Sector radius scanned for a sample reaching `reach` from the origin.
    pub fn sector_window(&self, view: &PeriodicView<'_>, reach: f64) -> i32 {
        let needed = view.lattice().covering_window(reach);
        if needed > self.max_sector_window {
            warn!(
                "sector window {} needed for reach {:.3}, clamped to {}",
                needed, reach, self.max_sector_window
            );
            self.max_sector_window
        } else {
            needed
        }
    }

    /// Export the neighbour graph of all images closer than `radius`.
    ///
    /// A negative or non-finite radius or halo margin yields an empty graph.
    pub fn build(&self, view: &PeriodicView<'_>, radius: f64, halo_margin: f64) -> DualGraph {
        if !(radius >= 0.0 && halo_margin >= 0.0 && (radius + halo_margin).is_finite()) {
            warn!("rejected export radius {} with halo {}", radius, halo_margin);
            return DualGraph::default();
        }

        let samples = self.gather(view, radius + halo_margin);
        let radius_sq = radius * radius;
        let num_valid = samples.partition_point(|s| s.distance_sq < radius_sq);

        let positions: Vec<DVec2> = samples.iter().map(|s| s.position).collect();
        let triangles = triangulate(&positions);

        let mut graph = UnGraph::<u32, ()>::with_capacity(num_valid, num_valid * 3);
        for index in 0..num_valid {
            graph.add_node(index as u32);
        }

        let mut kept = 0usize;
        for &[a, b, c] in &triangles {
            if a >= num_valid || b >= num_valid || c >= num_valid {
                continue;
            }
            kept += 1;
            for (i, j) in [(a, b), (b, c), (c, a)] {
                graph.update_edge(NodeIndex::new(i), NodeIndex::new(j), ());
            }
        }

        let neighbors: Vec<Vec<u32>> = graph
            .node_indices()
            .map(|node| {
                let mut list: Vec<u32> = graph.neighbors(node).map(|n| n.index() as u32).collect();
                list.sort_unstable();
                list
            })
            .collect();

        let vertices: Vec<DualVertex> = samples[..num_valid]
            .iter()
            .enumerate()
            .map(|(index, s)| DualVertex {
                index: index as u32,
                color: s.color,
                position: [s.position.x, s.position.y, 0.0],
                image: s.image,
            })
            .collect();

        debug!(
            "dual export: {} valid, {} halo, kept {} of {} triangles, {} edges",
            num_valid,
            samples.len() - num_valid,
            kept,
            triangles.len(),
            graph.edge_count()
        );

        DualGraph::new(vertices, neighbors, samples.len() - num_valid)
    }

    /// Every image within `reach` of the origin, stably sorted by distance.
    fn gather(&self, view: &PeriodicView<'_>, reach: f64) -> Vec<Sample> {
        let points = view.points();
        if points.is_empty() {
            return Vec::new();
        }

        let reach_sq = reach * reach;
        let window = self.sector_window(view, reach);
        let mut samples = Vec::new();

        for sector in Sector::window(window) {
            let offset = view.lattice().offset(sector);
            for (id, point) in points.iter() {
                let position = point.position + offset;
                let distance_sq = position.length_squared();
                if distance_sq <= reach_sq {
                    samples.push(Sample {
                        image: PointImage::new(id, sector),
                        position,
                        distance_sq,
                        color: point.color,
                    });
                }
            }
        }

        samples.sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Lattice;
    use crate::points::{PointId, PointSet};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn assert_valid(graph: &DualGraph) {
        let n = graph.num_valid() as u32;
        for vertex in graph.vertices() {
            for &j in graph.neighbors(vertex.index) {
                assert!(j < n, "neighbor {j} out of range");
                assert_ne!(j, vertex.index, "self loop at {j}");
                assert!(graph.neighbors(j).contains(&vertex.index), "{} -> {j} not symmetric", vertex.index);
            }
        }
    }

    #[test]
    fn test_single_triangle_with_halo() {
        let lattice = Lattice::new(DVec2::new(3.0, 0.0), DVec2::new(1.5, 1.5 * 3f64.sqrt())).unwrap();
        let mut points = PointSet::new();
        points.add_point(DVec2::new(0.0, 0.0), 0);
        points.add_point(DVec2::new(1.0, 0.0), 1);
        points.add_point(DVec2::new(0.5, 0.866), 2);
        let view = PeriodicView::new(&points, &lattice);

        let graph = NeighborGraphBuilder::default().build(&view, 2.0, 2.0);

        assert_eq!(graph.num_valid(), 3);
        assert!(graph.halo_count() > 0);
        assert_eq!(graph.neighbors(0), &[1, 2]);
        assert_eq!(graph.neighbors(1), &[0, 2]);
        assert_eq!(graph.neighbors(2), &[0, 1]);

        // Sorted by distance: (0.5, 0.866) sits just inside the unit circle.
        let colors: Vec<i32> = graph.vertices().iter().map(|v| v.color).collect();
        assert_eq!(colors, vec![0, 2, 1]);
        assert_eq!(graph.vertices()[2].image, PointImage::raw(PointId(1)));
        assert_eq!(graph.vertices()[2].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_distance_exactly_radius_is_halo() {
        let lattice = Lattice::new(DVec2::new(4.0, 0.0), DVec2::new(0.0, 4.0)).unwrap();
        let mut points = PointSet::new();
        points.add_point(DVec2::new(1.0, 1.0), 0);
        points.add_point(DVec2::new(2.0, 0.0), 1);
        let view = PeriodicView::new(&points, &lattice);

        let graph = NeighborGraphBuilder::default().build(&view, 2.0, 1.0);

        assert_eq!(graph.num_valid(), 1);
        assert_eq!(graph.vertices()[0].color, 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_random_graphs_are_valid() {
        let lattice = Lattice::hexagonal(2.4).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..10 {
            let mut points = PointSet::new();
            for c in 0..8 {
                let frac = DVec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
                points.add_point(lattice.absolute_of(frac), c);
            }
            let view = PeriodicView::new(&points, &lattice);
            let radius = rng.gen_range(1.0..6.0);

            let graph = NeighborGraphBuilder::default().build(&view, radius, 2.0);

            let expected = view
                .positioned_images(10)
                .iter()
                .filter(|(_, p)| p.length_squared() < radius * radius)
                .count();
            assert_eq!(graph.num_valid(), expected);
            assert_valid(&graph);

            let distances: Vec<f64> = graph
                .vertices()
                .iter()
                .map(|v| DVec2::new(v.position[0], v.position[1]).length_squared())
                .collect();
            assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_interior_vertices_are_connected() {
        let lattice = Lattice::hexagonal(2.4).unwrap();
        let mut points = PointSet::new();
        points.add_point(DVec2::new(0.3, 0.2), 0);
        points.add_point(DVec2::new(1.5, 0.9), 1);
        let view = PeriodicView::new(&points, &lattice);

        let graph = NeighborGraphBuilder::default().build(&view, 6.0, 2.0);

        assert!(graph.num_valid() > 10);
        assert_valid(&graph);
        // The closest vertex is far from the cutoff and keeps its full fan.
        assert!(graph.neighbors(0).len() >= 3);
    }

    #[test]
    fn test_empty_inputs() {
        let lattice = Lattice::hexagonal(2.4).unwrap();
        let empty = PointSet::new();
        let graph = NeighborGraphBuilder::default().build(&PeriodicView::new(&empty, &lattice), 5.0, 2.0);
        assert_eq!(graph.num_valid(), 0);
        assert_eq!(graph.edge_count(), 0);

        let mut points = PointSet::new();
        points.add_point(DVec2::new(0.5, 0.5), 0);
        let view = PeriodicView::new(&points, &lattice);
        assert_eq!(NeighborGraphBuilder::default().build(&view, 0.0, 2.0).num_valid(), 0);
        assert_eq!(NeighborGraphBuilder::default().build(&view, -1.0, 2.0).num_valid(), 0);
        assert_eq!(NeighborGraphBuilder::default().build(&view, f64::NAN, 2.0).num_valid(), 0);
    }

    #[test]
    fn test_sector_window_is_clamped() {
        let lattice = Lattice::new(DVec2::new(0.1, 0.0), DVec2::new(0.0, 0.1)).unwrap();
        let points = PointSet::new();
        let view = PeriodicView::new(&points, &lattice);
        let builder = NeighborGraphBuilder::new(8);

        assert_eq!(builder.sector_window(&view, 100.0), 8);
        assert_eq!(builder.sector_window(&view, 0.25), 4);
    }
}
