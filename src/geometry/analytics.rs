// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh statistics

use super::{BoundingBox, Mesh};
use serde::{Deserialize, Serialize};

/// Counts and measures of a mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStats {
    /// Live vertices
    pub vertex_count: usize,
    /// Live triangles
    pub triangle_count: usize,
    /// Distinct edges referenced by live triangles
    pub edge_count: usize,
    /// Vertex indices issued and later removed
    pub removed_vertices: usize,
    /// Triangle indices issued and later removed
    pub removed_triangles: usize,
    /// Edges with exactly one incident triangle
    pub boundary_edge_count: usize,
    /// Vertices without incident triangles
    pub isolated_vertex_count: usize,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Enclosed volume, meaningful only when `is_closed`
    pub volume: f64,
    /// Centroid of the live vertices
    pub centroid: [f64; 3],
    pub bbox: BoundingBox,
    /// V - E + F
    pub euler_characteristic: i64,
    /// No boundary edges and at least one triangle
    pub is_closed: bool,
}

impl MeshStats {
    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              MESH STATISTICS                             ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!(
            "║ Vertices:        {:>10} ({:>6} removed)              ║",
            self.vertex_count, self.removed_vertices
        );
        println!(
            "║ Triangles:       {:>10} ({:>6} removed)              ║",
            self.triangle_count, self.removed_triangles
        );
        println!(
            "║ Edges:           {:>10}                              ║",
            self.edge_count
        );
        println!(
            "║ Boundary edges:  {:>10}                              ║",
            self.boundary_edge_count
        );
        println!(
            "║ Isolated verts:  {:>10}                              ║",
            self.isolated_vertex_count
        );
        println!("║                                                          ║");
        println!(
            "║ Surface Area:    {:>10.4}                              ║",
            self.surface_area
        );
        println!(
            "║ Volume:          {:>10.4}                              ║",
            self.volume
        );
        println!(
            "║ Centroid:        ({:>7.2}, {:>7.2}, {:>7.2})            ║",
            self.centroid[0], self.centroid[1], self.centroid[2]
        );
        if !self.bbox.is_empty() {
            println!("║                                                          ║");
            println!("║ Bounding Box:                                            ║");
            println!(
                "║   Min: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
                self.bbox.min.x, self.bbox.min.y, self.bbox.min.z
            );
            println!(
                "║   Max: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
                self.bbox.max.x, self.bbox.max.y, self.bbox.max.z
            );
        }
        println!("║                                                          ║");
        println!(
            "║ Euler char.:     {:>10}                              ║",
            self.euler_characteristic
        );
        println!(
            "║ Closed:          {:>10}                              ║",
            if self.is_closed { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> MeshStats {
    let vertex_count = mesh.vertex_count();
    let triangle_count = mesh.triangle_count();
    let edge_count = mesh.edge_count();
    let boundary_edge_count = mesh.edges().filter(|(_, e)| e.is_boundary()).count();

    let isolated_vertex_count = mesh
        .vertex_ids()
        .filter(|&v| mesh.incident_slice(v).is_empty())
        .count();

    MeshStats {
        vertex_count,
        triangle_count,
        edge_count,
        removed_vertices: mesh.vertex_slot_count() - vertex_count,
        removed_triangles: mesh.triangle_slot_count() - triangle_count,
        boundary_edge_count,
        isolated_vertex_count,
        surface_area: calculate_surface_area(mesh),
        volume: calculate_volume(mesh),
        centroid: calculate_centroid(mesh),
        bbox: mesh.bounding_box(),
        euler_characteristic: vertex_count as i64 - edge_count as i64 + triangle_count as i64,
        is_closed: triangle_count > 0 && boundary_edge_count == 0,
    }
}

/// Sum of signed tetrahedron volumes against the origin
fn calculate_volume(mesh: &Mesh) -> f64 {
    let volume: f64 = mesh
        .triangle_ids()
        .filter_map(|t| mesh.triangle_positions(t).ok())
        .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
        .sum();
    volume.abs()
}

fn calculate_surface_area(mesh: &Mesh) -> f64 {
    mesh.triangle_ids()
        .filter_map(|t| mesh.triangle_positions(t).ok())
        .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() / 2.0)
        .sum()
}

fn calculate_centroid(mesh: &Mesh) -> [f64; 3] {
    let count = mesh.vertex_count();
    if count == 0 {
        return [0.0; 3];
    }
    let sum = mesh
        .vertices()
        .fold(nalgebra::Vector3::zeros(), |acc, (_, v)| acc + v.position.coords);
    let mean = sum / count as f64;
    [mean.x, mean.y, mean.z]
}
