// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Round-trip export/import tests

mod common;

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::{Point3, Vector2, Vector3};
use surfmesh::extra_data::{
    AttributeKind, CornerTexCoords, Material, MaterialLibraries, ObjectMaterials,
    PreservedDirectives, SmoothVertexNormal, TriangleMaterial, TriangleNormal,
};
use surfmesh::io::{compare_meshes, ExportOptions, MeshExporter, MeshFormat, MeshLoader};
use surfmesh::{Mesh, MeshError, TriangleId, VertexId};
use tempfile::{tempdir, NamedTempFile};

fn connectivity(mesh: &Mesh) -> Vec<[VertexId; 3]> {
    mesh.triangles().map(|(_, t)| t.vertices()).collect()
}

#[test]
fn test_off_round_trip_through_file() -> Result<()> {
    let mesh = common::grid_with(5, |x, y| {
        Point3::new(x as f64 * 0.1, y as f64 / 3.0, (x * y) as f64 * 1e-7)
    });

    let file = NamedTempFile::with_suffix(".off")?;
    MeshExporter::default().export_path(&mesh, file.path())?;
    let loaded = MeshLoader::new().load_path(file.path())?;

    assert_eq!(loaded.vertex_count(), mesh.vertex_count());
    assert_eq!(loaded.triangle_count(), mesh.triangle_count());
    assert_eq!(connectivity(&loaded), connectivity(&mesh));
    for (id, vertex) in mesh.vertices() {
        assert_eq!(loaded.position(id)?, vertex.position);
    }
    Ok(())
}

#[test]
fn test_round_trip_compacts_removed_entities() -> Result<()> {
    let mut mesh = common::grid(3);
    mesh.remove_vertex(VertexId(5))?;
    mesh.remove_triangle(TriangleId(0))?;

    for format in [MeshFormat::Off, MeshFormat::Obj] {
        let text = MeshExporter::default().to_string(&mesh, format)?;
        let loaded = MeshLoader::new().load(text.as_bytes(), format)?;
        let comparison = compare_meshes(&mesh, &loaded, 0.0);
        assert!(comparison.passed, "{format}: {comparison:?}");
    }
    Ok(())
}

#[test]
fn test_obj_round_trip_keeps_selected_attributes() -> Result<()> {
    let (mut mesh, _, [abc, bdc]) = common::quad();
    mesh.compute_triangle_normals(true)?;
    {
        let mut uv = mesh.ensure_kind::<CornerTexCoords>()?;
        uv.set(abc, [Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0)])?;
        uv.set(bdc, [Vector2::new(1.0, 0.0), Vector2::new(1.0, 1.0), Vector2::new(0.0, 1.0)])?;
    }
    mesh.ensure_kind::<TriangleMaterial>()?.set(bdc, "red".to_string())?;
    mesh.ensure_kind::<PreservedDirectives>()?
        .set(0usize, vec!["o quad".to_string(), "s off".to_string()])?;

    let mut red = Material::new("red");
    red.diffuse = Vector3::new(0.8, 0.1, 0.1);
    red.shininess = 12.5;
    mesh.ensure_kind::<ObjectMaterials>()?.set(0usize, vec![red.clone()])?;

    let dir = tempdir()?;
    let path = dir.path().join("quad.obj");
    MeshExporter::new(ExportOptions::all()).export_path(&mesh, &path)?;
    assert!(dir.path().join("quad.mtl").exists());

    let loaded = MeshLoader::new().load_path(&path)?;
    assert!(compare_meshes(&mesh, &loaded, 0.0).passed);

    let uv = loaded.kind::<CornerTexCoords>()?;
    assert_eq!(uv.get(bdc), mesh.kind::<CornerTexCoords>()?.get(bdc));
    let normals = loaded.kind::<TriangleNormal>()?;
    assert_relative_eq!(*normals.get(abc).unwrap(), Vector3::z());
    let materials = loaded.kind::<TriangleMaterial>()?;
    assert_eq!(materials.get(abc).map(String::as_str), Some(""));
    assert_eq!(materials.get(bdc).map(String::as_str), Some("red"));

    assert_eq!(
        loaded.mesh_value::<Vec<String>>(PreservedDirectives::NAME)?,
        &vec!["o quad".to_string(), "s off".to_string()]
    );
    assert_eq!(
        loaded.mesh_value::<Vec<String>>(MaterialLibraries::NAME)?,
        &vec!["quad.mtl".to_string()]
    );
    assert_eq!(loaded.mesh_value::<Vec<Material>>(ObjectMaterials::NAME)?, &vec![red]);
    Ok(())
}

#[test]
fn test_unselected_attributes_are_not_written() -> Result<()> {
    let (mut mesh, _, _) = common::quad();
    mesh.compute_triangle_normals(true)?;
    mesh.ensure_kind::<TriangleMaterial>()?;

    let options = ExportOptions::all().with_normals(false).with_materials(false);
    let text = MeshExporter::new(options).to_string(&mesh, MeshFormat::Obj)?;
    let loaded = MeshLoader::new().parse_obj(&text)?;
    assert!(!loaded.has_kind::<TriangleNormal>());
    assert!(!loaded.has_kind::<TriangleMaterial>());
    assert_eq!(loaded.triangle_count(), 2);
    Ok(())
}

#[test]
fn test_missing_material_library_is_skipped() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("lonely.obj");
    std::fs::write(&path, "mtllib nowhere.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")?;

    let mesh = MeshLoader::new().load_path(&path)?;
    assert_eq!(mesh.triangle_count(), 1);
    assert!(!mesh.has_kind::<ObjectMaterials>());
    Ok(())
}

#[test]
fn test_failed_load_reports_position() -> Result<()> {
    let file = NamedTempFile::with_suffix(".off")?;
    std::fs::write(file.path(), "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 7\n")?;

    match MeshLoader::new().load_path(file.path()) {
        Err(MeshError::Parse { format, line, .. }) => {
            assert_eq!(format, "OFF");
            assert_eq!(line, 6);
        }
        other => panic!("unexpected {other:?}"),
    }

    let unknown = NamedTempFile::with_suffix(".stl")?;
    assert!(matches!(
        MeshLoader::new().load_path(unknown.path()),
        Err(MeshError::Io(_))
    ));
    Ok(())
}

#[test]
fn test_obj_round_trip_keeps_smooth_vertex_normals() -> Result<()> {
    let mut mesh = common::grid_with(3, |x, y| {
        Point3::new(x as f64, y as f64, (x * y) as f64 * 0.25)
    });
    mesh.compute_smooth_vertex_normals(true)?;
    assert!(!mesh.has_kind::<TriangleNormal>());

    let exporter = MeshExporter::new(ExportOptions::none().with_normals(true));
    let text = exporter.to_string(&mesh, MeshFormat::Obj)?;
    let loaded = MeshLoader::new().load(text.as_bytes(), MeshFormat::Obj)?;

    assert!(!loaded.has_kind::<TriangleNormal>());
    let expected = mesh.kind::<SmoothVertexNormal>()?;
    let normals = loaded.kind::<SmoothVertexNormal>()?;
    assert_eq!(normals.len(), mesh.vertex_count());
    for (vertex, normal) in expected.iter() {
        assert_eq!(normals.get(vertex), Some(normal));
    }
    Ok(())
}

#[test]
fn test_obj_smooth_normals_on_planar_mesh() -> Result<()> {
    let (mut mesh, [a, _, _, d], _) = common::quad();
    mesh.compute_smooth_vertex_normals(true)?;

    let text = MeshExporter::new(ExportOptions::none().with_normals(true))
        .to_string(&mesh, MeshFormat::Obj)?;
    let loaded = MeshLoader::new().load(text.as_bytes(), MeshFormat::Obj)?;

    let normals = loaded.kind::<SmoothVertexNormal>()?;
    assert_relative_eq!(*normals.get(a).unwrap(), Vector3::z());
    assert_relative_eq!(*normals.get(d).unwrap(), Vector3::z());
    assert!(!loaded.has_kind::<TriangleNormal>());
    Ok(())
}

#[test]
fn test_obj_per_corner_normals_load_per_vertex() -> Result<()> {
    let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nvn 0 0 1\nvn 0 1 0\n\
                  f 1//1 2//1 3//2\nf 2//1 4//2 3//1\n";
    let loaded = MeshLoader::new().load(source.as_bytes(), MeshFormat::Obj)?;

    assert!(!loaded.has_kind::<TriangleNormal>());
    let normals = loaded.kind::<SmoothVertexNormal>()?;
    // VertexId(2) is referenced with both normals; its first reference wins.
    assert_eq!(normals.get(VertexId(2)), Some(&Vector3::y()));
    assert_eq!(normals.get(VertexId(3)), Some(&Vector3::y()));
    assert_eq!(normals.get(VertexId(0)), Some(&Vector3::z()));
    Ok(())
}
