// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topology container tests

mod common;

use anyhow::Result;
use nalgebra::Point3;
use surfmesh::{MeshError, Scope, VertexId, VertexPair};

#[test]
fn test_non_manifold_insertion_is_rejected_atomically() -> Result<()> {
    let (mut mesh, [_, b, c, _], [abc, bdc]) = common::quad();
    let e = mesh.add_vertex(Point3::new(0.5, 0.5, 1.0));
    let edges_before: Vec<_> = {
        let mut edges: Vec<_> = mesh.edges().collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges
    };

    let err = mesh.add_triangle(b, c, e).unwrap_err();
    assert!(matches!(err, MeshError::NonManifoldEdge { edge } if edge == VertexPair::new(b, c)));

    assert_eq!(mesh.triangle_count(), 2);
    let mut edges_after: Vec<_> = mesh.edges().collect();
    edges_after.sort_by_key(|(edge, _)| *edge);
    assert_eq!(edges_after, edges_before);
    assert!(mesh.incident_triangles(e)?.is_empty());
    assert_eq!(mesh.neighbor_across(abc, VertexPair::new(b, c))?, Some(bdc));

    // A failed insertion does not consume a triangle index.
    assert!(mesh.add_triangle(b, e, c).is_err());
    let a = VertexId(0);
    let t = mesh.add_triangle(a, e, b)?;
    assert_eq!(t.index(), 2);
    Ok(())
}

#[test]
fn test_removing_a_vertex_shrinks_vertex_stores() -> Result<()> {
    let (mut mesh, [a, b, c, d], _) = common::quad();
    mesh.attach(Scope::Vertex, "weight", 0.0f64)?;
    {
        let mut weights = mesh.attribute_mut::<f64>(Scope::Vertex, "weight")?;
        for (i, v) in [a, b, c, d].into_iter().enumerate() {
            weights.set(v, i as f64)?;
        }
    }

    let removed = mesh.remove_vertex(b)?;
    assert_eq!(removed.len(), 2);

    let weights = mesh.attribute::<f64>(Scope::Vertex, "weight")?;
    assert_eq!(weights.len(), mesh.vertex_count());
    assert_eq!(weights.get(b), None);
    assert_eq!(weights.get(a), Some(&0.0));
    assert_eq!(weights.get(d), Some(&3.0));
    assert_eq!(mesh.triangle_count(), 0);
    Ok(())
}

#[test]
fn test_removed_indices_are_never_reused() -> Result<()> {
    let (mut mesh, [a, _, _, _], [abc, _]) = common::quad();
    let proxy = mesh.vertex_proxy(a)?;
    mesh.remove_vertex(a)?;

    let fresh = mesh.add_vertex(Point3::new(3.0, 3.0, 3.0));
    assert_eq!(fresh, VertexId(4));
    assert!(!proxy.is_alive(&mesh));
    assert!(matches!(proxy.position(&mesh), Err(MeshError::InvalidIndex { .. })));
    assert!(!mesh.is_triangle_alive(abc));
    assert_eq!(mesh.vertex_slot_count(), 5);
    assert_eq!(mesh.vertex_count(), 4);
    Ok(())
}

#[test]
fn test_clone_is_independent() -> Result<()> {
    let (mesh, [a, ..], _) = common::quad();
    let mut copy = mesh.clone();
    assert_ne!(copy.id(), mesh.id());

    copy.set_position(a, Point3::new(-1.0, 0.0, 0.0))?;
    assert_eq!(mesh.position(a)?, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(copy.triangle_count(), mesh.triangle_count());
    Ok(())
}

#[test]
fn test_rebuild_adjacency_keeps_closed_cube_closed() -> Result<()> {
    let mut mesh = common::cube();
    assert!(mesh.boundary_edges().is_empty());
    assert_eq!(mesh.edge_count(), 18);

    mesh.rebuild_adjacency()?;
    assert!(mesh.boundary_edges().is_empty());
    for (id, triangle) in mesh.triangles() {
        assert!(triangle.neighbors().iter().all(Option::is_some), "triangle {id}");
    }
    Ok(())
}

#[test]
fn test_clear_releases_everything() -> Result<()> {
    let (mut mesh, _, _) = common::quad();
    mesh.attach(Scope::Triangle, "group", 1u32)?;
    mesh.clear();
    assert!(mesh.is_empty());
    assert_eq!(mesh.edge_count(), 0);
    assert!(!mesh.has_attribute(Scope::Triangle, "group"));
    Ok(())
}
