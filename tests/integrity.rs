// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Integrity checker tests

mod common;

use anyhow::Result;
use nalgebra::Point3;
use surfmesh::validation::{EntityRef, FindingKind, IntegrityReporter};
use surfmesh::{IntegrityConfig, MeshError, MeshIntegrity, MeshLoader, VertexPair};

#[test]
fn test_orphan_vertex_scenario() -> Result<()> {
    let (mut mesh, [a, b, c, d], _) = common::quad();
    let e = mesh.add_vertex(Point3::new(3.0, 3.0, 0.0));

    let report = MeshIntegrity::new().check(&mesh);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.count(FindingKind::OrphanVertex), 1);
    assert_eq!(report.findings[0].entity, EntityRef::Vertex(e));

    // Boundary edges are listed, not reported as problems.
    assert_eq!(
        report.boundary_edges,
        vec![
            VertexPair::new(a, b),
            VertexPair::new(a, c),
            VertexPair::new(b, d),
            VertexPair::new(c, d),
        ]
    );

    match report.into_result() {
        Err(MeshError::IntegrityFinding { kind, entity }) => {
            assert_eq!(kind, FindingKind::OrphanVertex);
            assert_eq!(entity, EntityRef::Vertex(e));
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[test]
fn test_check_is_read_only() -> Result<()> {
    let mut mesh = common::cube();
    mesh.update_vertex_boundary_status()?;
    let snapshot = mesh.clone();

    let report = MeshIntegrity::new().check(&mesh);
    assert!(report.is_valid(), "{:?}", report.findings);
    assert!(surfmesh::io::compare_meshes(&snapshot, &mesh, 0.0).passed);
    assert_eq!(mesh.edge_count(), snapshot.edge_count());
    assert!(MeshIntegrity::new().validate(&mesh).is_ok());
    Ok(())
}

#[test]
fn test_loaded_mesh_with_problems() -> Result<()> {
    // Two copies of one triangle, a sliver and an unused vertex.
    let source = "\
OFF
7 3 0
0 0 0
1 0 0
0 1 0
5 5 5
2 0 0
3 0 0
4 0 0
3 0 1 2
3 0 2 1
3 4 5 6
";
    let mesh = MeshLoader::new().parse_off(source)?;
    let report = MeshIntegrity::new().check(&mesh);

    assert_eq!(report.count(FindingKind::OrphanVertex), 1);
    assert_eq!(report.count(FindingKind::DuplicateTriangle), 1);
    assert_eq!(report.count(FindingKind::DegenerateTriangle), 1);
    assert_eq!(report.findings.len(), 3);

    let md = IntegrityReporter::to_markdown(&report, "inline.off");
    assert!(md.contains("| duplicate-triangle | 1 |"));
    Ok(())
}

#[test]
fn test_config_file_drives_the_checker() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("surfmesh.toml");
    std::fs::write(&path, "orphan_vertices = false\narea_epsilon = 0.5\n")?;
    let config = IntegrityConfig::from_file(&path)?;

    let (mut mesh, _, _) = common::quad();
    mesh.add_vertex(Point3::new(9.0, 9.0, 9.0));

    let report = MeshIntegrity::with_config(config).check(&mesh);
    assert_eq!(report.count(FindingKind::OrphanVertex), 0);
    // Both quad triangles have area 0.5.
    assert_eq!(report.count(FindingKind::DegenerateTriangle), 2);
    Ok(())
}
