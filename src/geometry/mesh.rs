// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh topology container
//!
//! The mesh owns vertex and triangle records, three adjacency tables
//! (vertex to incident triangles, edge to incident triangles, triangle to neighbor
//! triangles) and one attribute container per scope. Every mutation keeps all of
//! them in step; a failed mutation leaves the mesh untouched.

use super::circulator::{TrianglesAroundVertex, VerticesAroundVertex};
use super::primitive::{Triangle, TriangleId, Vertex, VertexId, VertexPair};
use super::proxy::{TriangleProxy, VertexProxy};
use super::BoundingBox;
use crate::error::{MeshError, MeshResult};
use crate::extra_data::{
    AttributeHandle, AttributeKind, AttributeMut, AttributeValue, ExtraDataContainer, Scope,
    SingleDataExtraData,
};
use ahash::RandomState;
use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a mesh instance, used to reject handles issued by another mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(u64);

impl MeshId {
    fn fresh() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Triangles registered on one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTriangles {
    first: TriangleId,
    second: Option<TriangleId>,
}

impl EdgeTriangles {
    fn new(first: TriangleId) -> Self {
        Self {
            first,
            second: None,
        }
    }

    pub fn first(&self) -> TriangleId {
        self.first
    }

    pub fn second(&self) -> Option<TriangleId> {
        self.second
    }

    pub fn len(&self) -> usize {
        if self.second.is_some() {
            2
        } else {
            1
        }
    }

    pub fn is_boundary(&self) -> bool {
        self.second.is_none()
    }

    /// The triangle across the edge from `triangle`
    pub fn other(&self, triangle: TriangleId) -> Option<TriangleId> {
        if self.first == triangle {
            self.second
        } else if self.second == Some(triangle) {
            Some(self.first)
        } else {
            None
        }
    }

    pub fn contains(&self, triangle: TriangleId) -> bool {
        self.first == triangle || self.second == Some(triangle)
    }

    /// Unregister `triangle`; true when the edge has no triangle left
    fn release(&mut self, triangle: TriangleId) -> bool {
        if self.second == Some(triangle) {
            self.second = None;
            false
        } else if self.first == triangle {
            match self.second.take() {
                Some(second) => {
                    self.first = second;
                    false
                }
                None => true,
            }
        } else {
            false
        }
    }
}

pub(crate) type EdgeMap = HashMap<VertexPair, EdgeTriangles, RandomState>;

/// Triangular surface mesh
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    vertices: Vec<Option<Vertex>>,
    triangles: Vec<Option<Triangle>>,
    vertex_triangles: Vec<Vec<TriangleId>>,
    edges: EdgeMap,
    vertex_count: usize,
    triangle_count: usize,
    mesh_data: ExtraDataContainer,
    vertex_data: ExtraDataContainer,
    triangle_data: ExtraDataContainer,
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            id: MeshId::fresh(),
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            vertex_triangles: Vec::with_capacity(vertex_count),
            edges: HashMap::with_capacity_and_hasher(
                triangle_count * 3 / 2,
                RandomState::new(),
            ),
            vertex_count: 0,
            triangle_count: 0,
            mesh_data: ExtraDataContainer::new(Scope::Mesh),
            vertex_data: ExtraDataContainer::new(Scope::Vertex),
            triangle_data: ExtraDataContainer::new(Scope::Triangle),
        }
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Number of live vertices
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of live triangles
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Number of vertex indices ever issued, tombstones included
    pub fn vertex_slot_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle indices ever issued, tombstones included
    pub fn triangle_slot_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn is_vertex_alive(&self, vertex: VertexId) -> bool {
        matches!(self.vertices.get(vertex.0), Some(Some(_)))
    }

    pub fn is_triangle_alive(&self, triangle: TriangleId) -> bool {
        matches!(self.triangles.get(triangle.0), Some(Some(_)))
    }

    /// Append a vertex
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Some(Vertex::new(position)));
        self.vertex_triangles.push(Vec::new());
        self.vertex_count += 1;
        self.vertex_data.resize_all(self.vertices.len());
        id
    }

    /// Append a triangle and wire it into the adjacency tables
    ///
    /// All three edges are validated before anything is modified, so on error
    /// the mesh is unchanged.
    pub fn add_triangle(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
    ) -> MeshResult<TriangleId> {
        let corners = [v0, v1, v2];
        for &vertex in &corners {
            self.live_vertex(vertex)?;
        }

        let mut triangle = Triangle::new(corners);
        if triangle.has_repeated_vertex() {
            return Err(MeshError::DegenerateTriangle { vertices: corners });
        }

        let mut shared = [None; 3];
        for (local, slot) in shared.iter_mut().enumerate() {
            let edge = triangle.edge(local);
            if let Some(entry) = self.edges.get(&edge) {
                if entry.second.is_some() {
                    return Err(MeshError::NonManifoldEdge { edge });
                }
                *slot = Some(entry.first);
            }
        }

        let id = TriangleId(self.triangles.len());
        for (local, neighbor) in shared.into_iter().enumerate() {
            let edge = triangle.edge(local);
            match neighbor {
                Some(neighbor) => {
                    triangle.neighbors[local] = Some(neighbor);
                    if let Some(entry) = self.edges.get_mut(&edge) {
                        entry.second = Some(id);
                    }
                    if let Some(Some(other)) = self.triangles.get_mut(neighbor.0) {
                        if let Some(corner) = other.opposite_corner(edge) {
                            other.neighbors[corner] = Some(id);
                        }
                    }
                }
                None => {
                    self.edges.insert(edge, EdgeTriangles::new(id));
                }
            }
        }

        for vertex in corners {
            self.vertex_triangles[vertex.0].push(id);
        }
        self.triangles.push(Some(triangle));
        self.triangle_count += 1;
        self.triangle_data.resize_all(self.triangles.len());
        Ok(id)
    }

    /// Retire a triangle, unlinking it from every adjacency table
    pub fn remove_triangle(&mut self, triangle: TriangleId) -> MeshResult<()> {
        let record = *self.live_triangle(triangle)?;

        for local in 0..3 {
            let edge = record.edge(local);
            let emptied = self
                .edges
                .get_mut(&edge)
                .map_or(false, |entry| entry.release(triangle));
            if emptied {
                self.edges.remove(&edge);
            }
            if let Some(neighbor) = record.neighbors[local] {
                if let Some(Some(other)) = self.triangles.get_mut(neighbor.0) {
                    if let Some(corner) = other.opposite_corner(edge) {
                        other.neighbors[corner] = None;
                    }
                }
            }
        }

        for vertex in record.vertices {
            self.vertex_triangles[vertex.0].retain(|&t| t != triangle);
        }
        self.triangles[triangle.0] = None;
        self.triangle_count -= 1;
        self.triangle_data.remove_slot_all(triangle.0);
        Ok(())
    }

    /// Retire a vertex together with its incident triangles
    ///
    /// Returns the triangles removed along with the vertex.
    pub fn remove_vertex(&mut self, vertex: VertexId) -> MeshResult<Vec<TriangleId>> {
        self.live_vertex(vertex)?;

        let incident = self.vertex_triangles[vertex.0].clone();
        for &triangle in &incident {
            self.remove_triangle(triangle)?;
        }

        self.vertices[vertex.0] = None;
        self.vertex_count -= 1;
        self.vertex_data.remove_slot_all(vertex.0);
        if !incident.is_empty() {
            debug!(
                "removed vertex {} and {} incident triangles",
                vertex,
                incident.len()
            );
        }
        Ok(incident)
    }

    /// Drop every entity and attribute
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.vertex_triangles.clear();
        self.edges.clear();
        self.vertex_count = 0;
        self.triangle_count = 0;
        self.mesh_data.clear();
        self.vertex_data.clear();
        self.triangle_data.clear();
    }

    pub fn vertex(&self, vertex: VertexId) -> MeshResult<&Vertex> {
        self.live_vertex(vertex)
    }

    pub fn triangle(&self, triangle: TriangleId) -> MeshResult<&Triangle> {
        self.live_triangle(triangle)
    }

    pub fn position(&self, vertex: VertexId) -> MeshResult<Point3<f64>> {
        Ok(self.live_vertex(vertex)?.position)
    }

    pub fn set_position(&mut self, vertex: VertexId, position: Point3<f64>) -> MeshResult<()> {
        match self.vertices.get_mut(vertex.0) {
            Some(Some(record)) => {
                record.position = position;
                Ok(())
            }
            _ => Err(MeshError::invalid_vertex(vertex.0)),
        }
    }

    /// Corner positions of a triangle
    pub fn triangle_positions(&self, triangle: TriangleId) -> MeshResult<[Point3<f64>; 3]> {
        let [a, b, c] = self.live_triangle(triangle)?.vertices;
        Ok([self.position(a)?, self.position(b)?, self.position(c)?])
    }

    pub fn vertex_proxy(&self, vertex: VertexId) -> MeshResult<VertexProxy> {
        self.live_vertex(vertex)?;
        Ok(VertexProxy::new(self.id, vertex))
    }

    pub fn triangle_proxy(&self, triangle: TriangleId) -> MeshResult<TriangleProxy> {
        self.live_triangle(triangle)?;
        Ok(TriangleProxy::new(self.id, triangle))
    }

    /// Live vertex ids in index order
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|_| VertexId(i)))
    }

    /// Live triangle ids in index order
    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|_| TriangleId(i)))
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (VertexId(i), v)))
    }

    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (TriangleId(i), t)))
    }

    /// One incident triangle of `vertex`, in O(1)
    pub fn incident_triangle(&self, vertex: VertexId) -> MeshResult<Option<TriangleId>> {
        Ok(self.incident_triangles(vertex)?.first().copied())
    }

    /// Every triangle using `vertex`, in insertion order
    pub fn incident_triangles(&self, vertex: VertexId) -> MeshResult<&[TriangleId]> {
        self.live_vertex(vertex)?;
        Ok(&self.vertex_triangles[vertex.0])
    }

    pub fn edge_triangles(&self, edge: VertexPair) -> Option<EdgeTriangles> {
        self.edges.get(&edge).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (VertexPair, EdgeTriangles)> + '_ {
        self.edges.iter().map(|(edge, entry)| (*edge, *entry))
    }

    /// Edges with a single incident triangle, sorted
    pub fn boundary_edges(&self) -> Vec<VertexPair> {
        let mut edges: Vec<VertexPair> = self
            .edges
            .iter()
            .filter(|(_, entry)| entry.is_boundary())
            .map(|(edge, _)| *edge)
            .collect();
        edges.sort();
        edges
    }

    pub fn is_boundary_edge(&self, edge: VertexPair) -> bool {
        self.edges.get(&edge).map_or(false, EdgeTriangles::is_boundary)
    }

    /// True when `vertex` lies on at least one boundary edge
    pub fn is_boundary_vertex(&self, vertex: VertexId) -> MeshResult<bool> {
        for &triangle in self.incident_triangles(vertex)? {
            let record = self.live_triangle(triangle)?;
            let on_boundary = record
                .edges()
                .iter()
                .filter(|edge| edge.contains(vertex))
                .any(|edge| self.is_boundary_edge(*edge));
            if on_boundary {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Triangle across `edge` from `triangle`
    pub fn neighbor_across(
        &self,
        triangle: TriangleId,
        edge: VertexPair,
    ) -> MeshResult<Option<TriangleId>> {
        let record = self.live_triangle(triangle)?;
        Ok(record
            .opposite_corner(edge)
            .and_then(|corner| record.neighbors[corner]))
    }

    /// Next triangle around `pivot`, crossing the edge from `pivot` to the corner
    /// before it (counter-clockwise) or after it (clockwise)
    pub fn next_around(
        &self,
        triangle: TriangleId,
        pivot: VertexId,
        rotation: Rotation,
    ) -> MeshResult<Option<TriangleId>> {
        let record = self.live_triangle(triangle)?;
        let local = record
            .local_index(pivot)
            .ok_or(MeshError::invalid_vertex(pivot.0))?;
        let corner = match rotation {
            Rotation::CounterClockwise => super::primitive::NEXT[local],
            Rotation::Clockwise => super::primitive::PREV[local],
        };
        Ok(record.neighbors[corner])
    }

    /// Triangles around `vertex` in rotational order
    pub fn triangles_around_vertex(&self, vertex: VertexId) -> MeshResult<TrianglesAroundVertex<'_>> {
        self.live_vertex(vertex)?;
        Ok(TrianglesAroundVertex::new(self, vertex))
    }

    /// One-ring vertices of `vertex` in rotational order
    pub fn vertices_around_vertex(&self, vertex: VertexId) -> MeshResult<VerticesAroundVertex<'_>> {
        self.live_vertex(vertex)?;
        Ok(VerticesAroundVertex::new(self, vertex))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices().map(|(_, v)| &v.position))
    }

    /// Recompute every adjacency table from the triangle records
    ///
    /// Fails with `NonManifoldEdge` if the records put three triangles on one edge,
    /// in which case the current tables are kept.
    pub fn rebuild_adjacency(&mut self) -> MeshResult<()> {
        let mut edges: EdgeMap =
            HashMap::with_capacity_and_hasher(self.edges.len(), RandomState::new());
        let mut vertex_triangles = vec![Vec::new(); self.vertices.len()];
        let mut triangles = self.triangles.clone();

        for (index, slot) in triangles.iter().enumerate() {
            let Some(record) = slot else { continue };
            let id = TriangleId(index);
            for vertex in record.vertices {
                match vertex_triangles.get_mut(vertex.0) {
                    Some(list) if self.is_vertex_alive(vertex) => list.push(id),
                    _ => return Err(MeshError::invalid_vertex(vertex.0)),
                }
            }
            for edge in record.edges() {
                match edges.get_mut(&edge) {
                    None => {
                        edges.insert(edge, EdgeTriangles::new(id));
                    }
                    Some(entry) if entry.second.is_none() => entry.second = Some(id),
                    Some(_) => return Err(MeshError::NonManifoldEdge { edge }),
                }
            }
        }

        for (index, slot) in triangles.iter_mut().enumerate() {
            let Some(record) = slot else { continue };
            let id = TriangleId(index);
            for local in 0..3 {
                record.neighbors[local] = edges
                    .get(&record.edge(local))
                    .and_then(|entry| entry.other(id));
            }
        }

        self.edges = edges;
        self.vertex_triangles = vertex_triangles;
        self.triangles = triangles;
        Ok(())
    }

    // Attribute registry

    /// Attach a new attribute store, one `default` per live entity of `scope`
    pub fn attach<T: AttributeValue>(
        &mut self,
        scope: Scope,
        name: &str,
        default: T,
    ) -> MeshResult<AttributeHandle<T>> {
        let store = match scope {
            Scope::Mesh => SingleDataExtraData::from_liveness([true], default),
            Scope::Vertex => {
                SingleDataExtraData::from_liveness(self.vertices.iter().map(Option::is_some), default)
            }
            Scope::Triangle => {
                SingleDataExtraData::from_liveness(self.triangles.iter().map(Option::is_some), default)
            }
        };
        self.container_mut(scope).insert(name, store)?;
        Ok(AttributeHandle::new(self.id, scope, name))
    }

    pub fn attribute<T: AttributeValue>(
        &self,
        scope: Scope,
        name: &str,
    ) -> MeshResult<&SingleDataExtraData<T>> {
        self.attributes(scope).get::<T>(name)
    }

    pub fn attribute_mut<T: AttributeValue>(
        &mut self,
        scope: Scope,
        name: &str,
    ) -> MeshResult<AttributeMut<'_, T>> {
        let store = self.container_mut(scope).get_mut::<T>(name)?;
        Ok(AttributeMut::new(scope, store))
    }

    /// Remove an attribute store; entities are unaffected
    pub fn detach(&mut self, scope: Scope, name: &str) -> MeshResult<()> {
        self.container_mut(scope).remove(name).map(|_| ())
    }

    pub fn has_attribute(&self, scope: Scope, name: &str) -> bool {
        self.attributes(scope).contains(name)
    }

    /// Attribute container of a scope, for named iteration
    pub fn attributes(&self, scope: Scope) -> &ExtraDataContainer {
        match scope {
            Scope::Mesh => &self.mesh_data,
            Scope::Vertex => &self.vertex_data,
            Scope::Triangle => &self.triangle_data,
        }
    }

    /// The single value of a mesh-scope attribute
    pub fn mesh_value<T: AttributeValue>(&self, name: &str) -> MeshResult<&T> {
        self.attribute::<T>(Scope::Mesh, name)?
            .get(0usize)
            .ok_or(MeshError::InvalidIndex {
                scope: Scope::Mesh,
                index: 0,
            })
    }

    pub fn attach_kind<K: AttributeKind>(&mut self) -> MeshResult<AttributeHandle<K::Value>> {
        self.attach(K::SCOPE, K::NAME, K::default_value())
    }

    pub fn kind<K: AttributeKind>(&self) -> MeshResult<&SingleDataExtraData<K::Value>> {
        self.attribute::<K::Value>(K::SCOPE, K::NAME)
    }

    pub fn kind_mut<K: AttributeKind>(&mut self) -> MeshResult<AttributeMut<'_, K::Value>> {
        self.attribute_mut::<K::Value>(K::SCOPE, K::NAME)
    }

    /// Write view of a well-known attribute, attaching it first if needed
    pub fn ensure_kind<K: AttributeKind>(&mut self) -> MeshResult<AttributeMut<'_, K::Value>> {
        if !self.has_kind::<K>() {
            self.attach_kind::<K>()?;
        }
        self.kind_mut::<K>()
    }

    pub fn has_kind<K: AttributeKind>(&self) -> bool {
        self.has_attribute(K::SCOPE, K::NAME)
    }

    pub fn detach_kind<K: AttributeKind>(&mut self) -> MeshResult<()> {
        self.detach(K::SCOPE, K::NAME)
    }

    // Crate-internal access for circulators and the integrity checker

    pub(crate) fn triangle_record(&self, triangle: TriangleId) -> Option<&Triangle> {
        self.triangles.get(triangle.0).and_then(Option::as_ref)
    }

    pub(crate) fn incident_slice(&self, vertex: VertexId) -> &[TriangleId] {
        self.vertex_triangles
            .get(vertex.0)
            .map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn edge_table(&self) -> &EdgeMap {
        &self.edges
    }

    #[cfg(test)]
    pub(crate) fn triangle_record_mut(&mut self, triangle: TriangleId) -> Option<&mut Triangle> {
        self.triangles.get_mut(triangle.0).and_then(Option::as_mut)
    }

    #[cfg(test)]
    pub(crate) fn attributes_mut(&mut self, scope: Scope) -> &mut ExtraDataContainer {
        self.container_mut(scope)
    }

    #[cfg(test)]
    pub(crate) fn incident_list_mut(&mut self, vertex: VertexId) -> Option<&mut Vec<TriangleId>> {
        self.vertex_triangles.get_mut(vertex.0)
    }

    fn live_vertex(&self, vertex: VertexId) -> MeshResult<&Vertex> {
        self.vertices
            .get(vertex.0)
            .and_then(Option::as_ref)
            .ok_or(MeshError::invalid_vertex(vertex.0))
    }

    fn live_triangle(&self, triangle: TriangleId) -> MeshResult<&Triangle> {
        self.triangle_record(triangle)
            .ok_or(MeshError::invalid_triangle(triangle.0))
    }

    fn container_mut(&mut self, scope: Scope) -> &mut ExtraDataContainer {
        match scope {
            Scope::Mesh => &mut self.mesh_data,
            Scope::Vertex => &mut self.vertex_data,
            Scope::Triangle => &mut self.triangle_data,
        }
    }
}

/// Direction of rotation around a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    CounterClockwise,
    Clockwise,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Mesh {
    /// Deep copy with a fresh identity; proxies of `self` do not resolve in the copy
    fn clone(&self) -> Self {
        Self {
            id: MeshId::fresh(),
            vertices: self.vertices.clone(),
            triangles: self.triangles.clone(),
            vertex_triangles: self.vertex_triangles.clone(),
            edges: self.edges.clone(),
            vertex_count: self.vertex_count,
            triangle_count: self.triangle_count,
            mesh_data: self.mesh_data.clone(),
            vertex_data: self.vertex_data.clone(),
            triangle_data: self.triangle_data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A(0,0,0) B(1,0,0) C(0,1,0) D(1,1,0) with triangles ABC and BDC
    fn quad() -> (Mesh, [VertexId; 4], [TriangleId; 2]) {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        let t0 = mesh.add_triangle(a, b, c).unwrap();
        let t1 = mesh.add_triangle(b, d, c).unwrap();
        (mesh, [a, b, c, d], [t0, t1])
    }

    #[test]
    fn test_add_triangle_links_neighbors() {
        let (mesh, [a, b, c, d], [t0, t1]) = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.edge_count(), 5);

        let shared = VertexPair::new(b, c);
        assert_eq!(mesh.neighbor_across(t0, shared).unwrap(), Some(t1));
        assert_eq!(mesh.neighbor_across(t1, shared).unwrap(), Some(t0));
        assert_eq!(mesh.neighbor_across(t0, VertexPair::new(a, b)).unwrap(), None);
        assert_eq!(mesh.edge_triangles(shared).map(|e| e.len()), Some(2));
        assert!(mesh.is_boundary_edge(VertexPair::new(b, d)));
        assert_eq!(mesh.incident_triangles(b).unwrap(), &[t0, t1]);
        assert_eq!(mesh.incident_triangle(d).unwrap(), Some(t1));
    }

    #[test]
    fn test_add_triangle_rejects_bad_input() {
        let (mut mesh, [a, b, c, _], _) = quad();
        assert!(matches!(
            mesh.add_triangle(a, b, VertexId(9)),
            Err(MeshError::InvalidIndex { index: 9, .. })
        ));
        assert!(matches!(
            mesh.add_triangle(a, a, c),
            Err(MeshError::DegenerateTriangle { .. })
        ));
        assert_eq!(mesh.triangle_count(), 2);
        let _ = b;
    }

    #[test]
    fn test_non_manifold_edge_is_atomic() {
        let (mut mesh, [_, b, c, _], _) = quad();
        let e = mesh.add_vertex(Point3::new(0.5, 0.5, 1.0));
        let f = mesh.add_vertex(Point3::new(2.0, 2.0, 0.0));
        let edges_before = mesh.edge_count();

        // Edge c-e is new, b-c already has two triangles.
        let err = mesh.add_triangle(c, e, b).unwrap_err();
        assert!(matches!(err, MeshError::NonManifoldEdge { .. }));
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.edge_count(), edges_before);
        assert!(mesh.incident_triangles(e).unwrap().is_empty());
        assert!(mesh.edge_triangles(VertexPair::new(c, e)).is_none());

        // The mesh still accepts valid triangles afterwards.
        mesh.add_triangle(c, e, f).unwrap();
        assert_eq!(mesh.triangle_count(), 3);
    }

    #[test]
    fn test_remove_triangle_unlinks() {
        let (mut mesh, [a, b, c, _], [t0, t1]) = quad();
        mesh.remove_triangle(t0).unwrap();

        assert!(!mesh.is_triangle_alive(t0));
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangle_slot_count(), 2);
        assert_eq!(mesh.neighbor_across(t1, VertexPair::new(b, c)).unwrap(), None);
        assert!(mesh.edge_triangles(VertexPair::new(a, b)).is_none());
        assert_eq!(mesh.edge_triangles(VertexPair::new(b, c)).map(|e| e.len()), Some(1));
        assert!(mesh.incident_triangles(a).unwrap().is_empty());
        assert!(matches!(
            mesh.remove_triangle(t0),
            Err(MeshError::InvalidIndex { .. })
        ));

        // Indices are never reused.
        let t2 = mesh.add_triangle(a, b, c).unwrap();
        assert_eq!(t2, TriangleId(2));
        assert_eq!(mesh.neighbor_across(t2, VertexPair::new(b, c)).unwrap(), Some(t1));
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let (mut mesh, [a, b, c, d], [t0, t1]) = quad();
        let removed = mesh.remove_vertex(b).unwrap();
        assert_eq!(removed, vec![t0, t1]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert!(matches!(mesh.position(b), Err(MeshError::InvalidIndex { .. })));
        assert!(matches!(
            mesh.add_triangle(a, b, c),
            Err(MeshError::InvalidIndex { .. })
        ));
        assert_eq!(mesh.add_vertex(Point3::origin()), VertexId(4));
        let _ = d;
    }

    #[test]
    fn test_attribute_stores_follow_entities() {
        let (mut mesh, [a, b, _, _], [t0, _]) = quad();
        let weight = mesh.attach(Scope::Vertex, "weight", 1.0f64).unwrap();
        mesh.attach(Scope::Triangle, "label", String::from("none")).unwrap();
        mesh.attach(Scope::Mesh, "author", String::from("surfmesh")).unwrap();

        weight.get_mut(&mut mesh).unwrap().set(b, 4.0).unwrap();
        mesh.add_vertex(Point3::new(3.0, 3.0, 3.0));
        assert_eq!(weight.get(&mesh).unwrap().len(), 5);

        mesh.remove_vertex(a).unwrap();
        let store = weight.get(&mesh).unwrap();
        assert_eq!(store.len(), mesh.vertex_count());
        assert_eq!(store.get(a), None);
        assert_eq!(store.get(b), Some(&4.0));

        let labels = mesh.attribute::<String>(Scope::Triangle, "label").unwrap();
        assert_eq!(labels.len(), mesh.triangle_count());
        assert_eq!(labels.get(t0), None);
        assert_eq!(mesh.mesh_value::<String>("author").unwrap(), "surfmesh");
    }

    #[test]
    fn test_attach_after_removal_skips_tombstones() {
        let (mut mesh, [a, _, _, _], _) = quad();
        mesh.remove_vertex(a).unwrap();
        mesh.attach(Scope::Vertex, "flag", true).unwrap();
        let store = mesh.attribute::<bool>(Scope::Vertex, "flag").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.slot_count(), 4);
    }

    #[test]
    fn test_clone_is_deep_with_fresh_identity() {
        let (mesh, [a, _, _, _], _) = quad();
        let mut copy = mesh.clone();
        assert_ne!(copy.id(), mesh.id());
        copy.set_position(a, Point3::new(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(mesh.position(a).unwrap(), Point3::origin());
        assert_eq!(copy.triangle_count(), mesh.triangle_count());
    }

    #[test]
    fn test_rebuild_adjacency_matches_incremental_tables() {
        let (mut mesh, [_, b, c, _], [t0, t1]) = quad();
        mesh.rebuild_adjacency().unwrap();
        assert_eq!(mesh.neighbor_across(t0, VertexPair::new(b, c)).unwrap(), Some(t1));
        assert_eq!(mesh.edge_count(), 5);
        assert_eq!(mesh.incident_triangles(b).unwrap().len(), 2);
    }

    #[test]
    fn test_next_around() {
        let (mesh, [_, b, _, _], [t0, t1]) = quad();
        assert_eq!(mesh.next_around(t1, b, Rotation::CounterClockwise).unwrap(), Some(t0));
        assert_eq!(mesh.next_around(t0, b, Rotation::CounterClockwise).unwrap(), None);
        assert_eq!(mesh.next_around(t0, b, Rotation::Clockwise).unwrap(), Some(t1));
    }
}
