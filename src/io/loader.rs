// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh loading from OFF and OBJ sources
//!
//! Every load builds into a scratch mesh and only hands it out once the whole input
//! has been read, so a failure never leaves a partially built mesh behind.

use super::format::{self, MeshFormat};
use super::parser::{self, Located, ObjCorner, ObjStatement, Position};
use crate::error::{MeshError, MeshResult};
use crate::extra_data::{
    CornerTexCoords, Material, MaterialLibraries, ObjectMaterials, PreservedDirectives,
    SmoothVertexNormal, TriangleMaterial, TriangleNormal,
};
use crate::geometry::{Mesh, TriangleId, VertexId};
use log::{debug, info, warn};
use nalgebra::{Vector2, Vector3};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads meshes from streams, strings and files
#[derive(Debug, Clone)]
pub struct MeshLoader {
    material_libraries: bool,
}

impl MeshLoader {
    pub fn new() -> Self {
        Self {
            material_libraries: true,
        }
    }

    /// Whether `load_path` reads the MTL files named by `mtllib`
    pub fn with_material_libraries(mut self, enabled: bool) -> Self {
        self.material_libraries = enabled;
        self
    }

    /// Read a whole mesh from `reader`
    pub fn load<R: Read>(&self, reader: R, format: MeshFormat) -> MeshResult<Mesh> {
        match format {
            MeshFormat::Off => self.load_off(reader),
            MeshFormat::Obj => self.load_obj(reader),
        }
    }

    /// Load into an existing mesh, replacing its contents only on success
    ///
    /// The replaced mesh gets a new identity, so proxies into the old contents no
    /// longer resolve.
    pub fn load_into<R: Read>(&self, mesh: &mut Mesh, reader: R, format: MeshFormat) -> MeshResult<()> {
        *mesh = self.load(reader, format)?;
        Ok(())
    }

    pub fn load_off<R: Read>(&self, reader: R) -> MeshResult<Mesh> {
        self.parse_off(&read_source(reader)?)
    }

    /// Read an OBJ stream; `mtllib` names are recorded but not opened
    pub fn load_obj<R: Read>(&self, reader: R) -> MeshResult<Mesh> {
        self.parse_obj(&read_source(reader)?)
    }

    pub fn load_mtl<R: Read>(&self, reader: R) -> MeshResult<Vec<Material>> {
        parser::parse_mtl(&read_source(reader)?)
    }

    pub fn parse_off(&self, source: &str) -> MeshResult<Mesh> {
        let document = parser::parse_off(source)?;
        let mut mesh = Mesh::with_capacity(document.vertices.len(), document.faces.len());

        for position in document.vertices {
            mesh.add_vertex(position);
        }
        for face in &document.faces {
            let corners: Vec<VertexId> = face.value.iter().copied().map(VertexId).collect();
            for i in 1..corners.len() - 1 {
                mesh.add_triangle(corners[0], corners[i], corners[i + 1])
                    .map_err(|e| topology_error("OFF", face.position, e))?;
            }
        }

        debug!(
            "OFF: {} vertices, {} faces, {} triangles",
            mesh.vertex_count(),
            document.faces.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    pub fn parse_obj(&self, source: &str) -> MeshResult<Mesh> {
        let mut builder = ObjBuilder::default();
        for statement in parser::parse_obj(source)? {
            builder.apply(statement)?;
        }
        builder.finish()
    }

    /// Load a file, detecting the format from its extension
    ///
    /// For OBJ files, material libraries are resolved relative to the file and stored
    /// in `ObjectMaterials`; missing libraries are skipped with a warning.
    pub fn load_path(&self, path: impl AsRef<Path>) -> MeshResult<Mesh> {
        let path = path.as_ref();
        let format = MeshFormat::from_path(path).ok_or_else(|| format::unsupported(path))?;
        let file = File::open(path)?;
        let mut mesh = self.load(BufReader::new(file), format)?;

        if format == MeshFormat::Obj && self.material_libraries {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            self.resolve_materials(&mut mesh, base)?;
        }

        info!(
            "Loaded {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    fn resolve_materials(&self, mesh: &mut Mesh, base: &Path) -> MeshResult<()> {
        let libraries = match mesh.kind::<MaterialLibraries>() {
            Ok(store) => store.get(0usize).cloned().unwrap_or_default(),
            Err(_) => return Ok(()),
        };

        let mut materials = Vec::new();
        for library in &libraries {
            let path = base.join(library);
            match File::open(&path) {
                Ok(file) => materials.extend(self.load_mtl(BufReader::new(file))?),
                Err(err) => warn!("Skipping material library {}: {}", path.display(), err),
            }
        }

        if !materials.is_empty() {
            debug!("OBJ: {} materials from {} libraries", materials.len(), libraries.len());
            mesh.ensure_kind::<ObjectMaterials>()?.set(0usize, materials)?;
        }
        Ok(())
    }
}

impl Default for MeshLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_source<R: Read>(mut reader: R) -> MeshResult<String> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    Ok(source)
}

/// Topology failures while loading are reported as parse errors at the offending face
fn topology_error(format: &'static str, position: Position, err: MeshError) -> MeshError {
    MeshError::parse(format, position, err.to_string())
}

/// Resolve a 1-based or negative (relative to the end) OBJ index
fn resolve_index(raw: i64, len: usize) -> Option<usize> {
    if raw > 0 {
        let index = (raw - 1) as usize;
        (index < len).then_some(index)
    } else if raw < 0 {
        len.checked_sub(raw.unsigned_abs() as usize)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct ResolvedCorner {
    vertex: VertexId,
    tex_coord: Option<Vector2<f64>>,
    /// 0-based `vn` index
    normal: Option<usize>,
}

/// Corner vertices of one loaded triangle with their `vn` indices
type CornerNormals = [(VertexId, Option<usize>); 3];

#[derive(Default)]
struct ObjBuilder {
    mesh: Mesh,
    tex_coords: Vec<Vector2<f64>>,
    normals: Vec<Vector3<f64>>,
    material: Option<String>,
    corner_tex_coords: Vec<(TriangleId, [Vector2<f64>; 3])>,
    corner_normals: Vec<(TriangleId, CornerNormals)>,
    triangle_materials: Vec<(TriangleId, String)>,
    libraries: Vec<String>,
    directives: Vec<String>,
}

impl ObjBuilder {
    fn apply(&mut self, statement: Located<ObjStatement>) -> MeshResult<()> {
        let Located { position, value } = statement;
        match value {
            ObjStatement::Vertex(point) => {
                self.mesh.add_vertex(point);
            }
            ObjStatement::TexCoord(uv) => self.tex_coords.push(uv),
            ObjStatement::Normal(normal) => self.normals.push(normal),
            ObjStatement::Face(corners) => self.add_face(position, &corners)?,
            ObjStatement::UseMaterial(name) => self.material = Some(name),
            ObjStatement::MaterialLibraries(files) => self.libraries.extend(files),
            ObjStatement::Directive(line) => self.directives.push(line),
        }
        Ok(())
    }

    fn resolve(&self, position: Position, corner: &ObjCorner) -> MeshResult<ResolvedCorner> {
        let out_of_range = |what: &str, raw: i64| {
            MeshError::parse("OBJ", position, format!("{} index {} out of range", what, raw))
        };

        let vertex = resolve_index(corner.vertex, self.mesh.vertex_slot_count())
            .ok_or_else(|| out_of_range("vertex", corner.vertex))?;
        let tex_coord = corner
            .tex_coord
            .map(|raw| {
                resolve_index(raw, self.tex_coords.len())
                    .map(|i| self.tex_coords[i])
                    .ok_or_else(|| out_of_range("texture coordinate", raw))
            })
            .transpose()?;
        let normal = corner
            .normal
            .map(|raw| {
                resolve_index(raw, self.normals.len())
                    .ok_or_else(|| out_of_range("normal", raw))
            })
            .transpose()?;

        Ok(ResolvedCorner {
            vertex: VertexId(vertex),
            tex_coord,
            normal,
        })
    }

    /// Fan-triangulate a polygon around its first corner
    fn add_face(&mut self, position: Position, corners: &[ObjCorner]) -> MeshResult<()> {
        let resolved = corners
            .iter()
            .map(|corner| self.resolve(position, corner))
            .collect::<MeshResult<Vec<_>>>()?;

        for i in 1..resolved.len() - 1 {
            let triangle = [resolved[0], resolved[i], resolved[i + 1]];
            let id = self
                .mesh
                .add_triangle(triangle[0].vertex, triangle[1].vertex, triangle[2].vertex)
                .map_err(|e| topology_error("OBJ", position, e))?;

            if triangle.iter().any(|c| c.tex_coord.is_some()) {
                let uv = triangle.map(|c| c.tex_coord.unwrap_or_else(Vector2::zeros));
                self.corner_tex_coords.push((id, uv));
            }
            if triangle.iter().any(|c| c.normal.is_some()) {
                self.corner_normals.push((id, triangle.map(|c| (c.vertex, c.normal))));
            }
            if let Some(material) = &self.material {
                self.triangle_materials.push((id, material.clone()));
            }
        }
        Ok(())
    }

    fn finish(self) -> MeshResult<Mesh> {
        let Self {
            mut mesh,
            normals,
            material,
            corner_tex_coords,
            corner_normals,
            triangle_materials,
            libraries,
            directives,
            ..
        } = self;

        if !corner_tex_coords.is_empty() {
            let mut store = mesh.ensure_kind::<CornerTexCoords>()?;
            for (triangle, uv) in corner_tex_coords {
                store.set(triangle, uv)?;
            }
        }
        if !corner_normals.is_empty() {
            apply_normals(&mut mesh, &normals, &corner_normals)?;
        }
        if material.is_some() {
            let mut store = mesh.ensure_kind::<TriangleMaterial>()?;
            for (triangle, name) in triangle_materials {
                store.set(triangle, name)?;
            }
        }
        if !libraries.is_empty() {
            mesh.ensure_kind::<MaterialLibraries>()?.set(0usize, libraries)?;
        }
        if !directives.is_empty() {
            debug!("OBJ: preserving {} unrecognized directives", directives.len());
            mesh.ensure_kind::<PreservedDirectives>()?.set(0usize, directives)?;
        }

        debug!(
            "OBJ: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

/// Store `vn` data as `TriangleNormal` when every face uses one normal for all of its
/// corners, otherwise as `SmoothVertexNormal`. A file whose normal list runs parallel to its
/// vertex list (corner normal index equal to the vertex index) is always per-vertex.
fn apply_normals(
    mesh: &mut Mesh,
    normals: &[Vector3<f64>],
    corner_normals: &[(TriangleId, CornerNormals)],
) -> MeshResult<()> {
    let vertex_slots = mesh.vertex_slot_count();
    let indexed_by_vertex = normals.len() == vertex_slots
        && corner_normals
            .iter()
            .all(|(_, corners)| corners.iter().all(|&(vertex, normal)| normal == Some(vertex.0)));
    let uniform = |corners: &CornerNormals| {
        let mut present = corners.iter().filter_map(|&(_, normal)| normal.map(|i| normals[i]));
        match present.next() {
            Some(first) => present.all(|n| n == first),
            None => true,
        }
    };

    if !indexed_by_vertex && corner_normals.iter().all(|(_, corners)| uniform(corners)) {
        let mut store = mesh.ensure_kind::<TriangleNormal>()?;
        for (triangle, corners) in corner_normals {
            if let Some(index) = corners.iter().find_map(|&(_, normal)| normal) {
                store.set(*triangle, normals[index])?;
            }
        }
        return Ok(());
    }

    // A vertex referenced with several normals keeps the first one.
    let mut assigned = vec![false; vertex_slots];
    let mut store = mesh.ensure_kind::<SmoothVertexNormal>()?;
    for (_, corners) in corner_normals {
        for &(vertex, normal) in corners {
            if let Some(index) = normal {
                if !assigned[vertex.0] {
                    store.set(vertex, normals[index])?;
                    assigned[vertex.0] = true;
                }
            }
        }
    }
    debug!("OBJ: per-vertex normals on {} vertices", assigned.iter().filter(|&&a| a).count());
    Ok(())
}
