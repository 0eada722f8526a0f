// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Read-only mesh integrity checker
//!
//! Every check works from a census recounted from the triangle records, so the
//! adjacency tables the mesh maintains are themselves checked rather than trusted.
//! Findings are reported, never corrected.

use super::config::IntegrityConfig;
use super::types::{EntityRef, Finding, FindingKind, IntegrityReport};
use crate::error::MeshResult;
use crate::extra_data::{Scope, VertexBoundary};
use crate::geometry::{Mesh, TriangleId, VertexId, VertexPair};
use ahash::RandomState;
use log::{debug, info};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Adjacency rebuilt from the triangle records alone
struct Census {
    edges: HashMap<VertexPair, Vec<TriangleId>, RandomState>,
    incident: Vec<Vec<TriangleId>>,
    /// Corners referring to a vertex that is not alive
    dangling: Vec<(TriangleId, VertexId)>,
}

impl Census {
    fn take(mesh: &Mesh) -> Self {
        let mut edges: HashMap<VertexPair, Vec<TriangleId>, RandomState> =
            HashMap::with_capacity_and_hasher(mesh.edge_count(), RandomState::new());
        let mut incident = vec![Vec::new(); mesh.vertex_slot_count()];
        let mut dangling = Vec::new();

        for (id, triangle) in mesh.triangles() {
            for vertex in triangle.vertices() {
                match incident.get_mut(vertex.0) {
                    Some(list) if mesh.is_vertex_alive(vertex) => {
                        if list.last() != Some(&id) {
                            list.push(id);
                        }
                    }
                    _ => dangling.push((id, vertex)),
                }
            }
            for edge in triangle.edges() {
                edges.entry(edge).or_default().push(id);
            }
        }

        Self {
            edges,
            incident,
            dangling,
        }
    }

    fn incident(&self, vertex: VertexId) -> &[TriangleId] {
        self.incident.get(vertex.0).map_or(&[][..], Vec::as_slice)
    }

    /// Edges whose triangle count passes `keep`, sorted
    fn edges_with(&self, keep: impl Fn(usize) -> bool) -> Vec<(VertexPair, &[TriangleId])> {
        let mut edges: Vec<(VertexPair, &[TriangleId])> = self
            .edges
            .iter()
            .filter(|(_, triangles)| keep(triangles.len()))
            .map(|(edge, triangles)| (*edge, triangles.as_slice()))
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges
    }
}

/// Diagnostic pass over a constructed mesh
#[derive(Debug, Clone, Default)]
pub struct MeshIntegrity {
    config: IntegrityConfig,
}

impl MeshIntegrity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IntegrityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Run every enabled check
    pub fn check(&self, mesh: &Mesh) -> IntegrityReport {
        let census = Census::take(mesh);
        let mut report = IntegrityReport::new(mesh);

        if self.config.report_boundary_edges {
            report.boundary_edges = census
                .edges_with(|n| n == 1)
                .into_iter()
                .map(|(edge, _)| edge)
                .collect();
        }

        let config = &self.config;
        let checks: [(bool, &str, CheckFn); 8] = [
            (config.orphan_vertices, "orphan vertices", Self::orphan_vertices),
            (config.duplicate_triangles, "duplicate triangles", Self::duplicate_triangles),
            (config.non_manifold_edges, "non-manifold edges", Self::non_manifold_edges),
            (config.degenerate_triangles, "degenerate triangles", Self::degenerate_triangles),
            (config.boundary_edges, "boundary consistency", Self::boundary_consistency),
            (config.adjacency, "adjacency", Self::adjacency),
            (config.non_manifold_vertices, "non-manifold vertices", Self::non_manifold_vertices),
            (config.attributes, "attribute stores", Self::attribute_stores),
        ];

        for (enabled, name, run) in checks {
            if !enabled {
                continue;
            }
            let before = report.findings.len();
            run(self, mesh, &census, &mut report.findings);
            debug!("{}: {} findings", name, report.findings.len() - before);
        }

        info!(
            "Integrity check of {} vertices, {} triangles: {} findings, {} boundary edges",
            report.vertex_count,
            report.triangle_count,
            report.findings.len(),
            report.boundary_edges.len()
        );
        report
    }

    /// `Ok(())` for a mesh with no findings, otherwise the first finding as an error
    pub fn validate(&self, mesh: &Mesh) -> MeshResult<()> {
        self.check(mesh).into_result()
    }

    fn orphan_vertices(&self, mesh: &Mesh, census: &Census, findings: &mut Vec<Finding>) {
        for vertex in mesh.vertex_ids() {
            if census.incident(vertex).is_empty() {
                findings.push(Finding::new(
                    FindingKind::OrphanVertex,
                    EntityRef::Vertex(vertex),
                    "referenced by no triangle",
                ));
            }
        }
    }

    fn duplicate_triangles(&self, mesh: &Mesh, _census: &Census, findings: &mut Vec<Finding>) {
        let mut seen: HashMap<[VertexId; 3], TriangleId, RandomState> =
            HashMap::with_capacity_and_hasher(mesh.triangle_count(), RandomState::new());
        for (id, triangle) in mesh.triangles() {
            let mut key = triangle.vertices();
            key.sort();
            match seen.entry(key) {
                Entry::Occupied(first) => findings.push(Finding::new(
                    FindingKind::DuplicateTriangle,
                    EntityRef::Triangle(id),
                    format!("same vertices as triangle {}", first.get()),
                )),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }
    }

    fn non_manifold_edges(&self, _mesh: &Mesh, census: &Census, findings: &mut Vec<Finding>) {
        for (edge, triangles) in census.edges_with(|n| n > 2) {
            findings.push(Finding::new(
                FindingKind::NonManifoldEdge,
                EntityRef::Edge(edge),
                format!("shared by {} triangles", triangles.len()),
            ));
        }
    }

    fn degenerate_triangles(&self, mesh: &Mesh, _census: &Census, findings: &mut Vec<Finding>) {
        let epsilon = self.config.area_epsilon;
        for (id, triangle) in mesh.triangles() {
            if triangle.has_repeated_vertex() {
                findings.push(Finding::new(
                    FindingKind::DegenerateTriangle,
                    EntityRef::Triangle(id),
                    "repeated vertex",
                ));
                continue;
            }
            // Dangling corners are reported by the adjacency check.
            let Ok([a, b, c]) = mesh.triangle_positions(id) else {
                continue;
            };
            let area = 0.5 * (b - a).cross(&(c - a)).norm();
            if area <= epsilon {
                findings.push(Finding::new(
                    FindingKind::DegenerateTriangle,
                    EntityRef::Triangle(id),
                    format!("area {:e} at or below {:e}", area, epsilon),
                ));
            }
        }
    }

    fn boundary_consistency(&self, mesh: &Mesh, census: &Census, findings: &mut Vec<Finding>) {
        let boundary = census.edges_with(|n| n == 1);

        for (edge, triangles) in &boundary {
            let owner = triangles[0];
            let linked = mesh
                .triangle(owner)
                .ok()
                .and_then(|record| record.opposite_corner(*edge).and_then(|c| record.neighbor(c)));
            if let Some(neighbor) = linked {
                findings.push(Finding::new(
                    FindingKind::InconsistentBoundary,
                    EntityRef::Edge(*edge),
                    format!(
                        "boundary edge of triangle {} links to triangle {}",
                        owner, neighbor
                    ),
                ));
            }
        }

        let Ok(flags) = mesh.kind::<VertexBoundary>() else {
            return;
        };
        let mut on_boundary = vec![false; mesh.vertex_slot_count()];
        for (edge, _) in &boundary {
            for vertex in [edge.low(), edge.high()] {
                if let Some(flag) = on_boundary.get_mut(vertex.0) {
                    *flag = true;
                }
            }
        }
        for vertex in mesh.vertex_ids() {
            let flagged = flags.get(vertex).copied().unwrap_or(false);
            let expected = on_boundary[vertex.0];
            if flagged != expected {
                findings.push(Finding::new(
                    FindingKind::InconsistentBoundary,
                    EntityRef::Vertex(vertex),
                    format!("boundary flag is {}, edges say {}", flagged, expected),
                ));
            }
        }
    }

    fn adjacency(&self, mesh: &Mesh, census: &Census, findings: &mut Vec<Finding>) {
        for (triangle, vertex) in &census.dangling {
            findings.push(Finding::new(
                FindingKind::AdjacencyMismatch,
                EntityRef::Triangle(*triangle),
                format!("references removed or missing vertex {}", vertex),
            ));
        }

        for (id, triangle) in mesh.triangles() {
            for local in 0..3 {
                let edge = triangle.edge(local);
                let shared = census.edges.get(&edge).filter(|t| t.len() == 2);
                let Some(pair) = shared else { continue };
                let expected = if pair[0] == id { pair[1] } else { pair[0] };
                let actual = triangle.neighbor(local);
                if actual != Some(expected) {
                    findings.push(Finding::new(
                        FindingKind::AdjacencyMismatch,
                        EntityRef::Triangle(id),
                        format!(
                            "neighbor across edge {} is {}, expected triangle {}",
                            edge,
                            describe(actual),
                            expected
                        ),
                    ));
                }
            }
        }

        for vertex in mesh.vertex_ids() {
            let mut listed = mesh.incident_slice(vertex).to_vec();
            listed.sort();
            let expected = census.incident(vertex);
            if listed != expected {
                findings.push(Finding::new(
                    FindingKind::AdjacencyMismatch,
                    EntityRef::Vertex(vertex),
                    format!(
                        "incident list holds {} triangles, records give {}",
                        listed.len(),
                        expected.len()
                    ),
                ));
            }
        }

        let table = mesh.edge_table();
        for (edge, triangles) in census.edges_with(|n| n <= 2) {
            let message = match table.get(&edge) {
                None => Some("missing from the edge table".to_string()),
                Some(entry)
                    if entry.len() != triangles.len()
                        || !triangles.iter().all(|t| entry.contains(*t)) =>
                {
                    Some(format!(
                        "edge table lists {} triangles, records give {}",
                        entry.len(),
                        triangles.len()
                    ))
                }
                Some(_) => None,
            };
            if let Some(message) = message {
                findings.push(Finding::new(
                    FindingKind::AdjacencyMismatch,
                    EntityRef::Edge(edge),
                    message,
                ));
            }
        }

        let mut stale: Vec<VertexPair> = table
            .keys()
            .filter(|edge| !census.edges.contains_key(edge))
            .copied()
            .collect();
        stale.sort();
        for edge in stale {
            findings.push(Finding::new(
                FindingKind::AdjacencyMismatch,
                EntityRef::Edge(edge),
                "edge table entry with no triangle",
            ));
        }
    }

    fn non_manifold_vertices(&self, mesh: &Mesh, census: &Census, findings: &mut Vec<Finding>) {
        for vertex in mesh.vertex_ids() {
            if census.incident(vertex).is_empty() {
                continue;
            }
            let Ok(ring) = mesh.triangles_around_vertex(vertex) else {
                continue;
            };
            let fans = ring.fans().len();
            if fans > 1 {
                findings.push(Finding::new(
                    FindingKind::NonManifoldVertex,
                    EntityRef::Vertex(vertex),
                    format!("incident triangles form {} separate fans", fans),
                ));
            }
        }
    }

    fn attribute_stores(&self, mesh: &Mesh, _census: &Census, findings: &mut Vec<Finding>) {
        for scope in Scope::all() {
            let (slots, live) = match scope {
                Scope::Mesh => (1, 1),
                Scope::Vertex => (mesh.vertex_slot_count(), mesh.vertex_count()),
                Scope::Triangle => (mesh.triangle_slot_count(), mesh.triangle_count()),
            };
            let alive = |slot: usize| match scope {
                Scope::Mesh => slot == 0,
                Scope::Vertex => mesh.is_vertex_alive(VertexId(slot)),
                Scope::Triangle => mesh.is_triangle_alive(TriangleId(slot)),
            };

            for (name, store) in mesh.attributes(scope).iter() {
                let message = if store.slot_count() != slots || store.len() != live {
                    Some(format!(
                        "{} slots holding {} values, scope has {} slots and {} live entities",
                        store.slot_count(),
                        store.len(),
                        slots,
                        live
                    ))
                } else {
                    (0..slots)
                        .find(|&slot| store.is_live(slot) != alive(slot))
                        .map(|slot| format!("slot {} disagrees with its {}", slot, scope))
                };
                if let Some(message) = message {
                    findings.push(Finding::new(
                        FindingKind::AttributeLengthMismatch,
                        EntityRef::Attribute {
                            scope,
                            name: name.to_string(),
                        },
                        message,
                    ));
                }
            }
        }
    }
}

type CheckFn = fn(&MeshIntegrity, &Mesh, &Census, &mut Vec<Finding>);

fn describe(triangle: Option<TriangleId>) -> String {
    match triangle {
        Some(t) => format!("triangle {}", t),
        None => "none".to_string(),
    }
}
