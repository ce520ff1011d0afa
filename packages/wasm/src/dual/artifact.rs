//! The exported dual graph and its encodings.
//!
//! [`DualGraph`] is the structural result of an export: vertices in
//! sorted-by-distance order plus a deduplicated neighbour list per vertex.
//! [`DualDocument`] is the `.dual` file layout the desktop tooling reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::points::PointImage;

/// One exported vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualVertex {
    /// Position in the distance-sorted sample.
    pub index: u32,
    pub color: i32,
    /// Absolute position; `z` is always zero.
    pub position: [f64; 3],
    /// Image the vertex was sampled from.
    #[serde(skip)]
    pub image: PointImage,
}

/// Immutable result of one export call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DualGraph {
    vertices: Vec<DualVertex>,
    neighbors: BTreeMap<u32, Vec<u32>>,
    #[serde(skip)]
    halo_count: usize,
}

impl DualGraph {
    /// Assemble a graph. `neighbors[i]` must list vertex `i`'s adjacent vertices.
    pub(crate) fn new(vertices: Vec<DualVertex>, neighbors: Vec<Vec<u32>>, halo_count: usize) -> Self {
        let neighbors = neighbors
            .into_iter()
            .enumerate()
            .map(|(i, list)| (i as u32, list))
            .collect();
        Self {
            vertices,
            neighbors,
            halo_count,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[DualVertex] {
        &self.vertices
    }

    /// Number of valid (exported) vertices.
    #[inline]
    pub fn num_valid(&self) -> usize {
        self.vertices.len()
    }

    /// Number of halo images that were triangulated but not exported.
    #[inline]
    pub fn halo_count(&self) -> usize {
        self.halo_count
    }

    /// Sorted neighbour indices of `index`; empty for unknown vertices.
    pub fn neighbors(&self, index: u32) -> &[u32] {
        self.neighbors.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.values().map(Vec::len).sum::<usize>() / 2
    }

    /// The `.dual` document for this graph.
    pub fn to_document(&self) -> DualDocument {
        DualDocument {
            symmetry: None,
            shape: DocumentShape {
                kind: "plane".to_string(),
            },
            vertices: self
                .vertices
                .iter()
                .map(|v| DocumentVertex {
                    index: v.index,
                    color: v.color,
                    pos: v.position,
                    neighbors: self
                        .neighbors(v.index)
                        .iter()
                        .map(|&index| DocumentNeighbor { index, sector: 0 })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Pretty-printed `.dual` JSON text.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }

    /// Adjacency in CSR format.
    ///
    /// Returns [offsets..., targets...] where offsets has `num_valid + 1`
    /// elements and every undirected edge appears once per endpoint.
    pub fn to_csr(&self) -> Vec<u32> {
        let count = self.num_valid();
        let mut offsets = vec![0u32; count + 1];
        let mut targets = Vec::with_capacity(self.edge_count() * 2);

        for (i, vertex) in self.vertices.iter().enumerate() {
            let list = self.neighbors(vertex.index);
            offsets[i + 1] = offsets[i] + list.len() as u32;
            targets.extend_from_slice(list);
        }

        let mut result = Vec::with_capacity(offsets.len() + targets.len());
        result.extend(offsets);
        result.extend(targets);
        result
    }
}

/// `.dual` file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualDocument {
    /// Always `null` for a plane export.
    pub symmetry: Option<String>,
    pub shape: DocumentShape,
    pub vertices: Vec<DocumentVertex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentShape {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVertex {
    pub index: u32,
    pub color: i32,
    pub pos: [f64; 3],
    pub neighbors: Vec<DocumentNeighbor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentNeighbor {
    pub index: u32,
    pub sector: i32,
}
