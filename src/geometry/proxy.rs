// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detached entity handles
//!
//! A proxy pairs the identity of the mesh that issued it with a stable index.
//! Every access goes through the mesh and checks that the index is still live, so a
//! proxy to a removed entity reports `InvalidIndex` instead of reaching a different one.

use super::circulator::{TrianglesAroundVertex, VerticesAroundVertex};
use super::mesh::{Mesh, MeshId};
use super::primitive::{TriangleId, VertexId};
use crate::error::{MeshError, MeshResult};
use crate::extra_data::{AttributeValue, Scope};
use nalgebra::{Point3, Vector3};

/// Handle to a vertex of a specific mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexProxy {
    mesh: MeshId,
    id: VertexId,
}

impl VertexProxy {
    pub(crate) fn new(mesh: MeshId, id: VertexId) -> Self {
        Self { mesh, id }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    /// True while the vertex exists in `mesh`
    pub fn is_alive(&self, mesh: &Mesh) -> bool {
        mesh.id() == self.mesh && mesh.is_vertex_alive(self.id)
    }

    pub fn position(&self, mesh: &Mesh) -> MeshResult<Point3<f64>> {
        self.resolve(mesh)?;
        mesh.position(self.id)
    }

    pub fn incident_triangle(&self, mesh: &Mesh) -> MeshResult<Option<TriangleId>> {
        self.resolve(mesh)?;
        mesh.incident_triangle(self.id)
    }

    pub fn valence(&self, mesh: &Mesh) -> MeshResult<usize> {
        self.resolve(mesh)?;
        Ok(mesh.vertices_around_vertex(self.id)?.iter().count())
    }

    pub fn is_boundary(&self, mesh: &Mesh) -> MeshResult<bool> {
        self.resolve(mesh)?;
        mesh.is_boundary_vertex(self.id)
    }

    pub fn triangles<'m>(&self, mesh: &'m Mesh) -> MeshResult<TrianglesAroundVertex<'m>> {
        self.resolve(mesh)?;
        mesh.triangles_around_vertex(self.id)
    }

    pub fn vertices<'m>(&self, mesh: &'m Mesh) -> MeshResult<VerticesAroundVertex<'m>> {
        self.resolve(mesh)?;
        mesh.vertices_around_vertex(self.id)
    }

    /// Value of a vertex attribute for this vertex
    pub fn get<'m, T: AttributeValue>(&self, mesh: &'m Mesh, name: &str) -> MeshResult<&'m T> {
        self.resolve(mesh)?;
        mesh.attribute::<T>(Scope::Vertex, name)?
            .get(self.id)
            .ok_or(MeshError::invalid_vertex(self.id.0))
    }

    pub fn set<T: AttributeValue>(&self, mesh: &mut Mesh, name: &str, value: T) -> MeshResult<()> {
        self.resolve(mesh)?;
        mesh.attribute_mut::<T>(Scope::Vertex, name)?.set(self.id, value)
    }

    fn resolve(&self, mesh: &Mesh) -> MeshResult<()> {
        if mesh.id() != self.mesh {
            return Err(MeshError::ForeignHandle);
        }
        if !mesh.is_vertex_alive(self.id) {
            return Err(MeshError::invalid_vertex(self.id.0));
        }
        Ok(())
    }
}

/// Handle to a triangle of a specific mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangleProxy {
    mesh: MeshId,
    id: TriangleId,
}

impl TriangleProxy {
    pub(crate) fn new(mesh: MeshId, id: TriangleId) -> Self {
        Self { mesh, id }
    }

    pub fn id(&self) -> TriangleId {
        self.id
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    pub fn is_alive(&self, mesh: &Mesh) -> bool {
        mesh.id() == self.mesh && mesh.is_triangle_alive(self.id)
    }

    pub fn vertices(&self, mesh: &Mesh) -> MeshResult<[VertexId; 3]> {
        self.resolve(mesh)?;
        Ok(mesh.triangle(self.id)?.vertices())
    }

    /// Corner at local index 0, 1 or 2
    pub fn vertex(&self, mesh: &Mesh, local: usize) -> MeshResult<VertexProxy> {
        let vertices = self.vertices(mesh)?;
        let id = *vertices
            .get(local)
            .ok_or(MeshError::invalid_vertex(local))?;
        Ok(VertexProxy::new(self.mesh, id))
    }

    pub fn positions(&self, mesh: &Mesh) -> MeshResult<[Point3<f64>; 3]> {
        self.resolve(mesh)?;
        mesh.triangle_positions(self.id)
    }

    /// Neighbor across the edge opposite each corner
    pub fn neighbors(&self, mesh: &Mesh) -> MeshResult<[Option<TriangleId>; 3]> {
        self.resolve(mesh)?;
        Ok(mesh.triangle(self.id)?.neighbors())
    }

    pub fn area(&self, mesh: &Mesh) -> MeshResult<f64> {
        let [a, b, c] = self.positions(mesh)?;
        Ok((b - a).cross(&(c - a)).norm() * 0.5)
    }

    /// Unnormalized geometric normal, `(B - A) x (C - A)`
    pub fn cross_normal(&self, mesh: &Mesh) -> MeshResult<Vector3<f64>> {
        let [a, b, c] = self.positions(mesh)?;
        Ok((b - a).cross(&(c - a)))
    }

    pub fn get<'m, T: AttributeValue>(&self, mesh: &'m Mesh, name: &str) -> MeshResult<&'m T> {
        self.resolve(mesh)?;
        mesh.attribute::<T>(Scope::Triangle, name)?
            .get(self.id)
            .ok_or(MeshError::invalid_triangle(self.id.0))
    }

    pub fn set<T: AttributeValue>(&self, mesh: &mut Mesh, name: &str, value: T) -> MeshResult<()> {
        self.resolve(mesh)?;
        mesh.attribute_mut::<T>(Scope::Triangle, name)?
            .set(self.id, value)
    }

    fn resolve(&self, mesh: &Mesh) -> MeshResult<()> {
        if mesh.id() != self.mesh {
            return Err(MeshError::ForeignHandle);
        }
        if !mesh.is_triangle_alive(self.id) {
            return Err(MeshError::invalid_triangle(self.id.0));
        }
        Ok(())
    }
}
