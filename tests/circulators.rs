// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! One-ring circulation tests

mod common;

use anyhow::Result;
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use surfmesh::{Mesh, TriangleId, VertexId};

#[test]
fn test_quad_scenario() -> Result<()> {
    let (mesh, [a, b, c, d], [abc, bdc]) = common::quad();

    let triangles = mesh.triangles_around_vertex(b)?;
    assert!(triangles.is_open());
    assert_eq!(triangles.iter().collect::<Vec<_>>(), vec![bdc, abc]);

    let ring = mesh.vertices_around_vertex(b)?;
    assert!(ring.is_open());
    let vertices: Vec<VertexId> = ring.iter().collect();
    assert_eq!(vertices, vec![d, c, a]);
    assert_eq!(
        vertices.iter().copied().collect::<HashSet<_>>(),
        HashSet::from([a, c, d])
    );
    assert!(mesh.is_boundary_vertex(b)?);
    Ok(())
}

#[test]
fn test_interior_grid_vertex_is_a_closed_rotation() -> Result<()> {
    let n = 4;
    let mesh = common::grid(n);
    let pivot = common::grid_vertex(n, 2, 2);

    let range = mesh.triangles_around_vertex(pivot)?;
    assert!(!range.is_open());
    let order: Vec<TriangleId> = range.iter().collect();
    assert_eq!(order.len(), 6);

    // Consecutive triangles, wrapping around, share an edge through the pivot.
    for i in 0..order.len() {
        let here = mesh.triangle(order[i])?.vertices();
        let next = mesh.triangle(order[(i + 1) % order.len()])?.vertices();
        let shared = here
            .iter()
            .filter(|&&v| v != pivot && next.contains(&v))
            .count();
        assert_eq!(shared, 1, "triangles {} and {}", order[i], order[(i + 1) % order.len()]);
    }

    assert_eq!(mesh.vertices_around_vertex(pivot)?.iter().count(), 6);
    Ok(())
}

#[test]
fn test_every_cube_vertex_has_a_closed_fan() -> Result<()> {
    let mesh = common::cube();
    for vertex in mesh.vertex_ids() {
        let range = mesh.triangles_around_vertex(vertex)?;
        assert!(!range.is_open());
        assert_eq!(range.iter().count(), mesh.incident_triangles(vertex)?.len());
    }
    Ok(())
}

/// Every incident triangle comes out exactly once, and each open fan adds one
/// extra ring vertex, on randomly perturbed grids with random holes
#[test]
fn test_circulation_on_random_meshes() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..20 {
        let n = rng.gen_range(2..8);
        let mut mesh = common::grid_with(n, |x, y| {
            Point3::new(
                x as f64 + rng.gen_range(-0.2..0.2),
                y as f64 + rng.gen_range(-0.2..0.2),
                rng.gen_range(-0.5..0.5),
            )
        });

        let ids: Vec<TriangleId> = mesh.triangle_ids().collect();
        for id in ids {
            if rng.gen_bool(0.2) {
                mesh.remove_triangle(id)?;
            }
        }

        check_circulation(&mesh, round)?;
    }
    Ok(())
}

fn check_circulation(mesh: &Mesh, round: usize) -> Result<()> {
    for vertex in mesh.vertex_ids() {
        let range = mesh.triangles_around_vertex(vertex)?;
        let walked: Vec<TriangleId> = range.iter().collect();

        let unique: HashSet<TriangleId> = walked.iter().copied().collect();
        assert_eq!(unique.len(), walked.len(), "round {round}: vertex {vertex} repeats a triangle");

        let incident: HashSet<TriangleId> = mesh.incident_triangles(vertex)?.iter().copied().collect();
        assert_eq!(unique, incident, "round {round}: vertex {vertex}");

        let open_fans = range.fans().iter().filter(|fan| !fan.is_closed()).count();
        let ring = mesh.vertices_around_vertex(vertex)?.iter().count();
        assert_eq!(ring, walked.len() + open_fans, "round {round}: vertex {vertex}");
    }
    Ok(())
}
