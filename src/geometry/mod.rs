// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, traversal and derived data

mod analytics;
mod bbox;
pub mod buffers;
mod circulator;
mod mesh;
mod normals;
mod primitive;
mod proxy;

pub use analytics::{analyze, MeshStats};
pub use bbox::BoundingBox;
pub use buffers::{FlattenedBuffers, IndexedBuffers, VertexRemap};
pub use circulator::{
    advance, Cursor, Fan, TriangleCirculator, TrianglesAroundVertex, VertexCirculator,
    VerticesAroundVertex,
};
pub use mesh::{EdgeTriangles, Mesh, MeshId, Rotation};
pub use primitive::{Triangle, TriangleId, Vertex, VertexId, VertexPair, NEXT, PREV};
pub use proxy::{TriangleProxy, VertexProxy};
