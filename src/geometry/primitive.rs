// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Primitive identifiers and records stored by the mesh

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Local corner index following `i` inside a triangle
pub const NEXT: [usize; 3] = [1, 2, 0];
/// Local corner index preceding `i` inside a triangle
pub const PREV: [usize; 3] = [2, 0, 1];

/// Stable vertex index, never reused once retired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub usize);

/// Stable triangle index, never reused once retired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriangleId(pub usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl TriangleId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<VertexId> for usize {
    fn from(id: VertexId) -> usize {
        id.0
    }
}

impl From<TriangleId> for usize {
    fn from(id: TriangleId) -> usize {
        id.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TriangleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vertex record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }
}

/// Triangle record: three corners plus one neighbor link per edge
///
/// `neighbors[i]` is the triangle across the edge opposite corner `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) vertices: [VertexId; 3],
    pub(crate) neighbors: [Option<TriangleId>; 3],
}

impl Triangle {
    pub(crate) fn new(vertices: [VertexId; 3]) -> Self {
        Self {
            vertices,
            neighbors: [None; 3],
        }
    }

    pub fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// Corner at local index 0, 1 or 2
    pub fn vertex(&self, local: usize) -> Option<VertexId> {
        self.vertices.get(local).copied()
    }

    pub fn neighbors(&self) -> [Option<TriangleId>; 3] {
        self.neighbors
    }

    /// Triangle across the edge opposite corner `local`
    pub fn neighbor(&self, local: usize) -> Option<TriangleId> {
        self.neighbors.get(local).copied().flatten()
    }

    /// Local corner index of `vertex`, if it is a corner
    pub fn local_index(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Edge opposite corner `local`
    ///
    /// # Panics
    ///
    /// Panics if `local` is not 0, 1 or 2.
    pub fn edge(&self, local: usize) -> VertexPair {
        VertexPair::new(self.vertices[NEXT[local]], self.vertices[PREV[local]])
    }

    pub fn edges(&self) -> [VertexPair; 3] {
        [self.edge(0), self.edge(1), self.edge(2)]
    }

    /// Local index of the corner opposite `edge`, if both endpoints are corners
    pub fn opposite_corner(&self, edge: VertexPair) -> Option<usize> {
        (0..3).find(|&i| self.edge(i) == edge)
    }

    /// True when a vertex appears twice
    pub fn has_repeated_vertex(&self) -> bool {
        let [a, b, c] = self.vertices;
        a == b || b == c || a == c
    }
}

/// Unordered pair of vertices identifying an edge
///
/// `VertexPair::new(a, b) == VertexPair::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexPair {
    low: VertexId,
    high: VertexId,
}

impl VertexPair {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> VertexId {
        self.low
    }

    pub fn high(&self) -> VertexId {
        self.high
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.low == vertex || self.high == vertex
    }

    /// The endpoint that is not `vertex`
    pub fn other(&self, vertex: VertexId) -> Option<VertexId> {
        if self.low == vertex {
            Some(self.high)
        } else if self.high == vertex {
            Some(self.low)
        } else {
            None
        }
    }
}

impl Hash for VertexPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Fields are already canonical, so order-insensitive equality holds.
        state.write_usize(self.low.0);
        state.write_usize(self.high.0);
    }
}

impl fmt::Display for VertexPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}
