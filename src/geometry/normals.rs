// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Normal and boundary attributes computed from the mesh geometry

use super::mesh::Mesh;
use super::primitive::{TriangleId, VertexId};
use crate::error::MeshResult;
use crate::extra_data::{
    FlatVertexNormals, SmoothVertexNormal, TriangleNormal, VertexBoundary,
};
use log::debug;
use nalgebra::Vector3;

fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
}

impl Mesh {
    /// Face normal from normalized edge vectors: `normalize(B - A) x normalize(C - A)`
    pub fn face_normal(&self, triangle: TriangleId, normalize: bool) -> MeshResult<Vector3<f64>> {
        let [a, b, c] = self.triangle_positions(triangle)?;
        let normal = unit_or_zero(b - a).cross(&unit_or_zero(c - a));
        Ok(if normalize { unit_or_zero(normal) } else { normal })
    }

    /// Store a face normal for every triangle in the `TriangleNormal` attribute
    pub fn compute_triangle_normals(&mut self, normalize: bool) -> MeshResult<()> {
        let normals = self
            .triangle_ids()
            .map(|t| Ok((t, self.face_normal(t, normalize)?)))
            .collect::<MeshResult<Vec<_>>>()?;

        let mut store = self.ensure_kind::<TriangleNormal>()?;
        for (triangle, normal) in normals {
            store.set(triangle, normal)?;
        }
        debug!("computed {} triangle normals", store.len());
        Ok(())
    }

    /// Store, for every vertex, the unit normals of its incident triangles scaled
    /// by the triangle's interior angle at that vertex
    ///
    /// Existing `TriangleNormal` values are used when attached.
    pub fn compute_flat_vertex_normals(&mut self) -> MeshResult<()> {
        let mut contributions: Vec<(VertexId, Vector3<f64>)> =
            Vec::with_capacity(self.triangle_count() * 3);
        let stored = self.kind::<TriangleNormal>().ok();

        for (id, triangle) in self.triangles() {
            let normal = match stored.and_then(|store| store.get(id)) {
                Some(normal) => unit_or_zero(*normal),
                None => self.face_normal(id, true)?,
            };
            let positions = self.triangle_positions(id)?;
            for (corner, vertex) in triangle.vertices().into_iter().enumerate() {
                let origin = positions[corner];
                let to_next = unit_or_zero(positions[(corner + 1) % 3] - origin);
                let to_prev = unit_or_zero(positions[(corner + 2) % 3] - origin);
                let angle = if to_next == Vector3::zeros() || to_prev == Vector3::zeros() {
                    0.0
                } else {
                    to_next.angle(&to_prev)
                };
                contributions.push((vertex, normal * angle));
            }
        }

        let mut store = self.ensure_kind::<FlatVertexNormals>()?;
        store.fill(Vec::new());
        for (vertex, weighted) in contributions {
            if let Some(list) = store.get_mut(vertex) {
                list.push(weighted);
            }
        }
        Ok(())
    }

    /// Angle-weighted average of incident face normals in `SmoothVertexNormal`
    ///
    /// Vertices without incident triangles get a zero normal.
    pub fn compute_smooth_vertex_normals(&mut self, normalize: bool) -> MeshResult<()> {
        let created = !self.has_kind::<FlatVertexNormals>();
        self.compute_flat_vertex_normals()?;

        let sums: Vec<(VertexId, Vector3<f64>)> = {
            let flat = self.kind::<FlatVertexNormals>()?;
            flat.iter()
                .map(|(slot, list)| {
                    let sum = list.iter().fold(Vector3::zeros(), |acc, n| acc + n);
                    (VertexId(slot), if normalize { unit_or_zero(sum) } else { sum })
                })
                .collect()
        };

        let mut store = self.ensure_kind::<SmoothVertexNormal>()?;
        for (vertex, normal) in sums {
            store.set(vertex, normal)?;
        }

        if created {
            self.detach_kind::<FlatVertexNormals>()?;
        }
        Ok(())
    }

    /// Set `VertexBoundary` to true exactly for endpoints of boundary edges
    pub fn update_vertex_boundary_status(&mut self) -> MeshResult<()> {
        let boundary = self.boundary_edges();
        let mut store = self.ensure_kind::<VertexBoundary>()?;
        store.fill(false);
        for edge in boundary {
            store.set(edge.low(), true)?;
            store.set(edge.high(), true)?;
        }
        Ok(())
    }
}
