//! Delaunay triangulation of a 2D point sequence.

use std::collections::BTreeSet;

use glam::DVec2;

/// Triangulate `points`, returning index triples into the input.
///
/// Fewer than three points, or an all-collinear input, yield no triangles.
/// Duplicate points are tolerated; delaunator skips them.
pub fn triangulate(points: &[DVec2]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    let input: Vec<delaunator::Point> = points
        .iter()
        .map(|p| delaunator::Point { x: p.x, y: p.y })
        .collect();

    delaunator::triangulate(&input)
        .triangles
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect()
}

/// Undirected edges of a triangle list as sorted `(low, high)` pairs.
pub fn unique_edges(triangles: &[[usize; 3]]) -> Vec<(usize, usize)> {
    let mut edges = BTreeSet::new();
    for &[a, b, c] in triangles {
        for (i, j) in [(a, b), (b, c), (c, a)] {
            edges.insert((i.min(j), i.max(j)));
        }
    }
    edges.into_iter().collect()
}
