// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat GPU-style buffers built from a mesh
//!
//! Removed entities leave gaps in the index space, so indexed buffers go through a
//! [`VertexRemap`] that packs live vertices densely.

use super::mesh::Mesh;
use super::primitive::{TriangleId, VertexId};
use crate::error::{MeshError, MeshResult};
use crate::extra_data::{
    AttributeValue, CornerTexCoords, Scope, SmoothVertexNormal, TriangleNormal,
};
use serde::{Deserialize, Serialize};

/// Dense renumbering of live vertices in index order
#[derive(Debug, Clone)]
pub struct VertexRemap {
    dense: Vec<Option<u32>>,
    ids: Vec<VertexId>,
}

impl VertexRemap {
    pub fn new(mesh: &Mesh) -> Self {
        let mut dense = vec![None; mesh.vertex_slot_count()];
        let ids: Vec<VertexId> = mesh.vertex_ids().collect();
        for (packed, id) in ids.iter().enumerate() {
            dense[id.0] = Some(packed as u32);
        }
        Self { dense, ids }
    }

    /// Packed index of a live vertex
    pub fn get(&self, vertex: VertexId) -> Option<u32> {
        self.dense.get(vertex.0).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Original id of every packed vertex
    pub fn ids(&self) -> &[VertexId] {
        &self.ids
    }
}

/// Shared-vertex buffers: one position per live vertex and three indices per triangle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexedBuffers {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Mesh vertex behind each entry of `positions`
    pub vertex_ids: Vec<VertexId>,
    /// Mesh triangle behind each index triple
    pub triangle_ids: Vec<TriangleId>,
}

impl IndexedBuffers {
    pub fn from_mesh(mesh: &Mesh) -> MeshResult<Self> {
        let remap = VertexRemap::new(mesh);
        let positions = remap
            .ids()
            .iter()
            .map(|&v| mesh.position(v).map(to_f32))
            .collect::<MeshResult<Vec<_>>>()?;

        let mut indices = Vec::with_capacity(mesh.triangle_count() * 3);
        let mut triangle_ids = Vec::with_capacity(mesh.triangle_count());
        for (id, triangle) in mesh.triangles() {
            for vertex in triangle.vertices() {
                let packed = remap
                    .get(vertex)
                    .ok_or(MeshError::invalid_vertex(vertex.0))?;
                indices.push(packed);
            }
            triangle_ids.push(id);
        }

        Ok(Self {
            positions,
            indices,
            vertex_ids: remap.ids().to_vec(),
            triangle_ids,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Per-corner buffers with no shared vertices, three entries per triangle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlattenedBuffers {
    pub positions: Vec<[f32; 3]>,
    /// Present when `CornerTexCoords` is attached
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// From `SmoothVertexNormal` when attached, otherwise `TriangleNormal`
    pub normals: Option<Vec<[f32; 3]>>,
    pub triangle_ids: Vec<TriangleId>,
}

impl FlattenedBuffers {
    pub fn from_mesh(mesh: &Mesh) -> MeshResult<Self> {
        let corners = mesh.triangle_count() * 3;
        let tex_store = mesh.kind::<CornerTexCoords>().ok();
        let smooth = mesh.kind::<SmoothVertexNormal>().ok();
        let flat = mesh.kind::<TriangleNormal>().ok();

        let mut buffers = Self {
            positions: Vec::with_capacity(corners),
            tex_coords: tex_store.map(|_| Vec::with_capacity(corners)),
            normals: (smooth.is_some() || flat.is_some()).then(|| Vec::with_capacity(corners)),
            triangle_ids: Vec::with_capacity(mesh.triangle_count()),
        };

        for (id, triangle) in mesh.triangles() {
            let positions = mesh.triangle_positions(id)?;
            buffers.positions.extend(positions.into_iter().map(to_f32));

            if let (Some(out), Some(store)) = (buffers.tex_coords.as_mut(), tex_store) {
                let uv = store.get(id).ok_or(MeshError::invalid_triangle(id.0))?;
                out.extend(uv.iter().map(|t| [t.x as f32, t.y as f32]));
            }

            if let Some(out) = buffers.normals.as_mut() {
                for vertex in triangle.vertices() {
                    let normal = match (smooth, flat) {
                        (Some(store), _) => store.get(vertex),
                        (None, Some(store)) => store.get(id),
                        (None, None) => None,
                    }
                    .ok_or(MeshError::invalid_triangle(id.0))?;
                    out.push([normal.x as f32, normal.y as f32, normal.z as f32]);
                }
            }

            buffers.triangle_ids.push(id);
        }

        Ok(buffers)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Values of a vertex attribute in the packed order of [`VertexRemap`]
pub fn vertex_attribute_buffer<T: AttributeValue>(mesh: &Mesh, name: &str) -> MeshResult<Vec<T>> {
    let store = mesh.attribute::<T>(Scope::Vertex, name)?;
    mesh.vertex_ids()
        .map(|v| store.get(v).cloned().ok_or(MeshError::invalid_vertex(v.0)))
        .collect()
}

/// Values of a triangle attribute in live triangle order
pub fn triangle_attribute_buffer<T: AttributeValue>(
    mesh: &Mesh,
    name: &str,
) -> MeshResult<Vec<T>> {
    let store = mesh.attribute::<T>(Scope::Triangle, name)?;
    mesh.triangle_ids()
        .map(|t| store.get(t).cloned().ok_or(MeshError::invalid_triangle(t.0)))
        .collect()
}

fn to_f32(p: nalgebra::Point3<f64>) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}
