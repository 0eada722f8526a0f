// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh export to OFF, OBJ and MTL
//!
//! Removed entities are skipped and the remaining vertices are renumbered densely in
//! index order, so exporting and reloading a mesh reproduces its live vertices and
//! triangles with the same relative order.

use super::format::{self, MeshFormat};
use crate::error::{MeshError, MeshResult};
use crate::extra_data::{
    CornerTexCoords, Material, MaterialLibraries, ObjectMaterials, PreservedDirectives,
    SmoothVertexNormal, TriangleMaterial, TriangleNormal,
};
use crate::geometry::{Mesh, VertexId, VertexRemap};
use ahash::RandomState;
use log::{debug, info};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Attributes written alongside positions and connectivity
///
/// OFF carries positions and triangles only; the options apply to OBJ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// `CornerTexCoords` as `vt` records
    pub tex_coords: bool,
    /// `TriangleNormal` as `vn` records, or `SmoothVertexNormal` per corner when only that is attached
    pub normals: bool,
    /// `TriangleMaterial` as `usemtl`, material libraries as `mtllib`
    pub materials: bool,
    /// `PreservedDirectives` written back verbatim
    pub preserved_directives: bool,
}

impl ExportOptions {
    pub fn all() -> Self {
        Self {
            tex_coords: true,
            normals: true,
            materials: true,
            preserved_directives: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_tex_coords(mut self, enabled: bool) -> Self {
        self.tex_coords = enabled;
        self
    }

    pub fn with_normals(mut self, enabled: bool) -> Self {
        self.normals = enabled;
        self
    }

    pub fn with_materials(mut self, enabled: bool) -> Self {
        self.materials = enabled;
        self
    }

    pub fn with_preserved_directives(mut self, enabled: bool) -> Self {
        self.preserved_directives = enabled;
        self
    }
}

/// Writes meshes to streams, strings and files
#[derive(Debug, Clone, Default)]
pub struct MeshExporter {
    options: ExportOptions,
}

impl MeshExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn export<W: Write>(&self, mesh: &Mesh, writer: W, format: MeshFormat) -> MeshResult<()> {
        match format {
            MeshFormat::Off => self.export_off(mesh, writer),
            MeshFormat::Obj => self.export_obj(mesh, writer),
        }
    }

    /// Export to an in-memory string
    pub fn to_string(&self, mesh: &Mesh, format: MeshFormat) -> MeshResult<String> {
        let mut buffer = Vec::new();
        self.export(mesh, &mut buffer, format)?;
        String::from_utf8(buffer).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e).into()
        })
    }

    pub fn export_off<W: Write>(&self, mesh: &Mesh, mut writer: W) -> MeshResult<()> {
        let remap = VertexRemap::new(mesh);
        let mut out = Vec::new();

        writeln!(out, "OFF")?;
        writeln!(out, "{} {} 0", remap.len(), mesh.triangle_count())?;
        for &vertex in remap.ids() {
            let p = mesh.position(vertex)?;
            writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
        }
        for (_, triangle) in mesh.triangles() {
            let [a, b, c] = packed(&remap, triangle.vertices())?;
            writeln!(out, "3 {} {} {}", a, b, c)?;
        }

        writer.write_all(&out)?;
        writer.flush()?;
        Ok(())
    }

    /// Export as OBJ, naming the material libraries recorded on the mesh
    pub fn export_obj<W: Write>(&self, mesh: &Mesh, writer: W) -> MeshResult<()> {
        let libraries = match mesh.kind::<MaterialLibraries>() {
            Ok(store) => store.get(0usize).cloned().unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        self.write_obj(mesh, writer, &libraries)
    }

    /// Write materials as an MTL library
    pub fn export_mtl<W: Write>(&self, materials: &[Material], mut writer: W) -> MeshResult<()> {
        let mut out = Vec::new();
        for (i, material) in materials.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            writeln!(out, "newmtl {}", material.name)?;
            write_color(&mut out, "Ka", &material.ambient)?;
            write_color(&mut out, "Kd", &material.diffuse)?;
            write_color(&mut out, "Ks", &material.specular)?;
            write_color(&mut out, "Ke", &material.emissive)?;
            writeln!(out, "Ns {}", material.shininess)?;
            writeln!(out, "Ni {}", material.optical_density)?;
            writeln!(out, "d {}", material.dissolve)?;
            for (key, map) in [
                ("map_Ka", &material.ambient_map),
                ("map_Kd", &material.diffuse_map),
                ("map_Ks", &material.specular_map),
            ] {
                if let Some(file) = map {
                    writeln!(out, "{} {}", key, file)?;
                }
            }
        }
        writer.write_all(&out)?;
        writer.flush()?;
        Ok(())
    }

    /// Export to a file, choosing the format from its extension
    ///
    /// For OBJ with materials enabled, `ObjectMaterials` is written to a sibling
    /// `<stem>.mtl` which the OBJ then names as its only library.
    pub fn export_path(&self, mesh: &Mesh, path: impl AsRef<Path>) -> MeshResult<()> {
        let path = path.as_ref();
        let format = MeshFormat::from_path(path).ok_or_else(|| format::unsupported(path))?;

        let materials = match mesh.kind::<ObjectMaterials>() {
            Ok(store) if format == MeshFormat::Obj && self.options.materials => {
                store.get(0usize).cloned().unwrap_or_default()
            }
            _ => Vec::new(),
        };

        if materials.is_empty() {
            self.export(mesh, BufWriter::new(File::create(path)?), format)?;
        } else {
            let library = path.with_extension("mtl");
            let name = library
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.export_mtl(&materials, BufWriter::new(File::create(&library)?))?;
            self.write_obj(mesh, BufWriter::new(File::create(path)?), &[name])?;
            debug!("Wrote {} materials to {}", materials.len(), library.display());
        }

        info!(
            "Exported {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(())
    }

    fn write_obj<W: Write>(&self, mesh: &Mesh, mut writer: W, libraries: &[String]) -> MeshResult<()> {
        let remap = VertexRemap::new(mesh);
        let options = &self.options;

        let tex_store = mesh.kind::<CornerTexCoords>().ok().filter(|_| options.tex_coords);
        let normal_store = mesh.kind::<TriangleNormal>().ok().filter(|_| options.normals);
        let smooth_store = mesh
            .kind::<SmoothVertexNormal>()
            .ok()
            .filter(|_| options.normals && normal_store.is_none());
        let material_store = mesh.kind::<TriangleMaterial>().ok().filter(|_| options.materials);
        if options.tex_coords && tex_store.is_none() {
            debug!("OBJ export: no texture coordinates attached");
        }
        if options.normals && normal_store.is_none() && smooth_store.is_none() {
            debug!("OBJ export: no normals attached");
        }

        let mut tex_table = DedupTable::<2>::default();
        let mut normal_table = DedupTable::<3>::default();
        let mut faces = Vec::with_capacity(mesh.triangle_count());
        for (id, triangle) in mesh.triangles() {
            let vertices = packed(&remap, triangle.vertices())?;
            let uv = tex_store.map(|store| {
                let corners = store.get(id).cloned().unwrap_or([Vector2::zeros(); 3]);
                corners.map(|t| tex_table.insert([t.x, t.y]))
            });
            let normal = match (normal_store, smooth_store) {
                (Some(store), _) => {
                    let n = store.get(id).copied().unwrap_or_else(Vector3::zeros);
                    Some([normal_table.insert([n.x, n.y, n.z]); 3])
                }
                // One `vn` per written vertex, in `v` order
                (None, Some(_)) => Some(vertices.map(|v| v as usize)),
                (None, None) => None,
            };
            let material = material_store.and_then(|store| store.get(id));
            faces.push((vertices, uv, normal, material));
        }

        let mut out = Vec::new();
        writeln!(out, "# surfmesh")?;
        if options.preserved_directives {
            if let Some(directives) = mesh
                .kind::<PreservedDirectives>()
                .ok()
                .and_then(|store| store.get(0usize))
            {
                for line in directives {
                    writeln!(out, "{}", line)?;
                }
            }
        }
        if options.materials && !libraries.is_empty() {
            writeln!(out, "mtllib {}", libraries.join(" "))?;
        }

        for &vertex in remap.ids() {
            let p = mesh.position(vertex)?;
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for [u, v] in &tex_table.values {
            writeln!(out, "vt {} {}", u, v)?;
        }
        if let Some(store) = smooth_store {
            for &vertex in remap.ids() {
                let n = store.get(vertex).copied().unwrap_or_else(Vector3::zeros);
                writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
            }
        }
        for [x, y, z] in &normal_table.values {
            writeln!(out, "vn {} {} {}", x, y, z)?;
        }

        let mut current_material: Option<&String> = None;
        for (vertices, uv, normal, material) in faces {
            if let Some(name) = material {
                if current_material != Some(name) {
                    if name.is_empty() {
                        writeln!(out, "usemtl")?;
                    } else {
                        writeln!(out, "usemtl {}", name)?;
                    }
                    current_material = Some(name);
                }
            }

            write!(out, "f")?;
            for corner in 0..3 {
                write!(out, " {}", vertices[corner] + 1)?;
                match (uv, normal) {
                    (Some(uv), Some(n)) => write!(out, "/{}/{}", uv[corner] + 1, n[corner] + 1)?,
                    (Some(uv), None) => write!(out, "/{}", uv[corner] + 1)?,
                    (None, Some(n)) => write!(out, "//{}", n[corner] + 1)?,
                    (None, None) => {}
                }
            }
            writeln!(out)?;
        }

        writer.write_all(&out)?;
        writer.flush()?;
        Ok(())
    }
}

fn packed(remap: &VertexRemap, vertices: [VertexId; 3]) -> MeshResult<[u32; 3]> {
    let mut packed = [0; 3];
    for (slot, vertex) in packed.iter_mut().zip(vertices) {
        *slot = remap
            .get(vertex)
            .ok_or(MeshError::invalid_vertex(vertex.0))?;
    }
    Ok(packed)
}

fn write_color(out: &mut Vec<u8>, key: &str, color: &Vector3<f64>) -> std::io::Result<()> {
    writeln!(out, "{} {} {} {}", key, color.x, color.y, color.z)
}

/// Deduplicates float tuples by their exact bit patterns
struct DedupTable<const N: usize> {
    values: Vec<[f64; N]>,
    index: HashMap<[u64; N], usize, RandomState>,
}

impl<const N: usize> Default for DedupTable<N> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            index: HashMap::with_hasher(RandomState::new()),
        }
    }
}

impl<const N: usize> DedupTable<N> {
    /// 0-based position of `value`, appending it if new
    fn insert(&mut self, value: [f64; N]) -> usize {
        let key = value.map(f64::to_bits);
        let values = &mut self.values;
        *self.index.entry(key).or_insert_with(|| {
            values.push(value);
            values.len() - 1
        })
    }
}
