// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Integrity finding and report types

use crate::error::{MeshError, MeshResult};
use crate::extra_data::Scope;
use crate::geometry::{Mesh, TriangleId, VertexId, VertexPair};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an integrity problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Vertex referenced by no triangle
    OrphanVertex,
    /// Triangle with the same vertex set as an earlier one
    DuplicateTriangle,
    /// Edge used by more than two triangles
    NonManifoldEdge,
    /// Repeated vertex or zero area
    DegenerateTriangle,
    /// Boundary edge carrying a neighbor link, or a boundary flag disagreeing with the edges
    InconsistentBoundary,
    /// Adjacency tables disagreeing with the triangle records
    AdjacencyMismatch,
    /// Vertex whose triangles form more than one fan
    NonManifoldVertex,
    /// Attribute store out of step with its scope
    AttributeLengthMismatch,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::OrphanVertex => "orphan-vertex",
            FindingKind::DuplicateTriangle => "duplicate-triangle",
            FindingKind::NonManifoldEdge => "non-manifold-edge",
            FindingKind::DegenerateTriangle => "degenerate-triangle",
            FindingKind::InconsistentBoundary => "inconsistent-boundary",
            FindingKind::AdjacencyMismatch => "adjacency-mismatch",
            FindingKind::NonManifoldVertex => "non-manifold-vertex",
            FindingKind::AttributeLengthMismatch => "attribute-length-mismatch",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity a finding is about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef {
    Vertex(VertexId),
    Triangle(TriangleId),
    Edge(VertexPair),
    Attribute { scope: Scope, name: String },
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Vertex(v) => write!(f, "vertex {}", v),
            EntityRef::Triangle(t) => write!(f, "triangle {}", t),
            EntityRef::Edge(e) => write!(f, "edge {}", e),
            EntityRef::Attribute { scope, name } => write!(f, "{} attribute '{}'", scope, name),
        }
    }
}

/// One integrity problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub entity: EntityRef,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, entity: EntityRef, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.entity, self.message)
    }
}

/// Outcome of an integrity check
///
/// Boundary edges are not problems and are listed separately from the findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub findings: Vec<Finding>,
    pub boundary_edges: Vec<VertexPair>,
}

impl IntegrityReport {
    pub fn new(mesh: &Mesh) -> Self {
        Self {
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            findings: Vec::new(),
            boundary_edges: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings_of(kind).count()
    }

    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Per-kind totals in kind order
    pub fn summary(&self) -> Vec<(FindingKind, usize)> {
        let mut counts: Vec<(FindingKind, usize)> = Vec::new();
        for finding in &self.findings {
            match counts.iter_mut().find(|(kind, _)| *kind == finding.kind) {
                Some((_, n)) => *n += 1,
                None => counts.push((finding.kind, 1)),
            }
        }
        counts.sort();
        counts
    }

    /// `Ok(())` when valid, otherwise the first finding as an error
    pub fn into_result(self) -> MeshResult<()> {
        match self.findings.into_iter().next() {
            None => Ok(()),
            Some(finding) => Err(MeshError::IntegrityFinding {
                kind: finding.kind,
                entity: finding.entity,
            }),
        }
    }
}
