// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh comparison utilities for round-trip verification

use crate::geometry::{Mesh, VertexRemap};
use serde::{Deserialize, Serialize};

/// Result of mesh comparison
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshComparison {
    pub vertex_count_match: bool,
    pub triangle_count_match: bool,
    pub bbox_match: bool,
    /// Same triangles, corner for corner, after packing live vertices
    pub connectivity_match: bool,
    /// Every packed vertex within `tolerance` of its counterpart
    pub positions_match: bool,
    pub vertex_count_diff: i64,
    pub triangle_count_diff: i64,
    /// Largest coordinate difference between corresponding vertices
    pub max_position_error: f64,
    pub tolerance: f64,
    pub passed: bool,
}

impl MeshComparison {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compare two meshes for equivalence
///
/// Both meshes are compared through their live entities in index order, so a mesh
/// with removed entities matches its exported-and-reloaded copy.
pub fn compare_meshes(mesh_a: &Mesh, mesh_b: &Mesh, tolerance: f64) -> MeshComparison {
    let mut comparison = MeshComparison::new();
    comparison.tolerance = tolerance;

    comparison.vertex_count_diff = mesh_a.vertex_count() as i64 - mesh_b.vertex_count() as i64;
    comparison.vertex_count_match = comparison.vertex_count_diff == 0;

    comparison.triangle_count_diff =
        mesh_a.triangle_count() as i64 - mesh_b.triangle_count() as i64;
    comparison.triangle_count_match = comparison.triangle_count_diff == 0;

    let bbox_a = mesh_a.bounding_box();
    let bbox_b = mesh_b.bounding_box();
    comparison.bbox_match =
        (bbox_a.is_empty() && bbox_b.is_empty()) || bbox_a.approx_eq(&bbox_b, tolerance);

    if comparison.vertex_count_match {
        comparison.max_position_error = mesh_a
            .vertices()
            .zip(mesh_b.vertices())
            .map(|((_, a), (_, b))| (a.position - b.position).amax())
            .fold(0.0, f64::max);
        comparison.positions_match = comparison.max_position_error <= tolerance;
    }

    if comparison.vertex_count_match && comparison.triangle_count_match {
        let remap_a = VertexRemap::new(mesh_a);
        let remap_b = VertexRemap::new(mesh_b);
        comparison.connectivity_match = mesh_a
            .triangles()
            .zip(mesh_b.triangles())
            .all(|((_, ta), (_, tb))| {
                let packed_a = ta.vertices().map(|v| remap_a.get(v));
                let packed_b = tb.vertices().map(|v| remap_b.get(v));
                packed_a == packed_b
            });
    }

    comparison.passed = comparison.vertex_count_match
        && comparison.triangle_count_match
        && comparison.bbox_match
        && comparison.positions_match
        && comparison.connectivity_match;

    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VertexId;
    use nalgebra::Point3;

    fn triangle(offset: f64) -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(offset, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(offset + 1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(offset, 1.0, 0.0));
        mesh.add_triangle(a, b, c).unwrap();
        mesh
    }

    #[test]
    fn test_compare_identical_meshes() {
        let comparison = compare_meshes(&triangle(0.0), &triangle(0.0), 1e-9);
        assert!(comparison.passed);
        assert!(comparison.connectivity_match);
        assert_eq!(comparison.max_position_error, 0.0);
    }

    #[test]
    fn test_compare_moved_mesh() {
        let comparison = compare_meshes(&triangle(0.0), &triangle(0.5), 1e-3);
        assert!(!comparison.bbox_match);
        assert!(!comparison.positions_match);
        assert!(comparison.connectivity_match);
        assert!(!comparison.passed);
    }

    #[test]
    fn test_compare_ignores_removed_slots() {
        let mut sparse = Mesh::new();
        let junk = sparse.add_vertex(Point3::new(7.0, 7.0, 7.0));
        let a = sparse.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = sparse.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = sparse.add_vertex(Point3::new(0.0, 1.0, 0.0));
        sparse.add_triangle(a, b, c).unwrap();
        sparse.remove_vertex(junk).unwrap();
        assert_eq!(junk, VertexId(0));

        assert!(compare_meshes(&sparse, &triangle(0.0), 0.0).passed);
    }

    #[test]
    fn test_compare_reordered_corners() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(b, c, a).unwrap();

        let comparison = compare_meshes(&mesh, &triangle(0.0), 0.0);
        assert!(comparison.positions_match);
        assert!(!comparison.connectivity_match);
    }
}
