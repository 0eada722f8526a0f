// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surfmesh
//!
//! Triangular surface meshes with explicit adjacency, typed per-entity attributes,
//! one-ring circulation, OFF/OBJ loading and export, and an integrity checker.
//!
//! ```
//! use nalgebra::Point3;
//! use surfmesh::Mesh;
//!
//! let mut mesh = Mesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! mesh.add_triangle(a, b, c).unwrap();
//! assert_eq!(mesh.triangles_around_vertex(b).unwrap().iter().count(), 1);
//! ```

pub mod error;
pub mod extra_data;
pub mod geometry;
pub mod io;
pub mod validation;

pub use error::{MeshError, MeshResult};
pub use extra_data::{AttributeHandle, ExtraData, ExtraDataContainer, Scope, SingleDataExtraData};
pub use geometry::{
    Mesh, Triangle, TriangleId, TriangleProxy, Vertex, VertexId, VertexPair, VertexProxy,
};
pub use io::{ExportOptions, MeshExporter, MeshFormat, MeshLoader};
pub use validation::{IntegrityConfig, IntegrityReport, MeshIntegrity};

use std::path::Path;

/// Load a mesh file, picking the format from its extension
pub fn load(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    MeshLoader::new().load_path(path)
}

/// Export a mesh file with every available attribute, picking the format from its extension
pub fn save(mesh: &Mesh, path: impl AsRef<Path>) -> MeshResult<()> {
    MeshExporter::new(ExportOptions::all()).export_path(mesh, path)
}
