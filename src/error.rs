// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy shared by the topology, attribute, I/O and validation layers

use crate::extra_data::Scope;
use crate::geometry::{VertexId, VertexPair};
use crate::validation::{EntityRef, FindingKind};
use thiserror::Error;

/// Errors returned by mesh operations
///
/// Every mutating operation that fails leaves the mesh exactly as it was before the call.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Index out of range or referring to a tombstoned entity
    #[error("invalid {scope} index {index}")]
    InvalidIndex { scope: Scope, index: usize },

    /// Two of the three triangle corners are the same vertex
    #[error("degenerate triangle ({}, {}, {})", .vertices[0], .vertices[1], .vertices[2])]
    DegenerateTriangle { vertices: [VertexId; 3] },

    /// The edge is already shared by two triangles
    #[error("edge {edge} is already shared by two triangles")]
    NonManifoldEdge { edge: VertexPair },

    #[error("{scope} attribute '{name}' already exists")]
    DuplicateName { scope: Scope, name: String },

    #[error("{scope} attribute '{name}' stores {stored}, requested {requested}")]
    TypeMismatch {
        scope: Scope,
        name: String,
        stored: &'static str,
        requested: &'static str,
    },

    #[error("{scope} attribute '{name}' not found")]
    NotFound { scope: Scope, name: String },

    /// Malformed input or a topology failure while loading
    #[error("{format} parse error at line {line}, column {column}: {message}")]
    Parse {
        format: &'static str,
        line: usize,
        column: usize,
        message: String,
    },

    /// A single integrity finding surfaced as an error
    #[error("integrity finding: {kind} at {entity}")]
    IntegrityFinding { kind: FindingKind, entity: EntityRef },

    /// A proxy or attribute handle issued by another mesh instance
    #[error("handle belongs to a different mesh")]
    ForeignHandle,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MeshError {
    pub(crate) fn invalid_vertex(index: usize) -> Self {
        Self::InvalidIndex {
            scope: Scope::Vertex,
            index,
        }
    }

    pub(crate) fn invalid_triangle(index: usize) -> Self {
        Self::InvalidIndex {
            scope: Scope::Triangle,
            index,
        }
    }

    pub(crate) fn parse(format: &'static str, (line, column): (usize, usize), message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            column,
            message: message.into(),
        }
    }

    /// True for errors raised by the loaders
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Result alias used across the crate
pub type MeshResult<T> = std::result::Result<T, MeshError>;
