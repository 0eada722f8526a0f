// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Named per-scope attribute storage attached to a mesh

mod container;
mod handle;
pub mod kinds;
mod store;

pub use container::{ExtraDataContainer, Scope};
pub use handle::{AttributeHandle, AttributeMut};
pub use kinds::{
    AttributeKind, CornerTexCoords, FlatVertexNormals, Material, MaterialLibraries,
    ObjectMaterials, PreservedDirectives, SmoothVertexNormal, TriangleMaterial, TriangleNormal,
    VertexBoundary,
};
pub use store::{AttributeValue, ExtraData, SingleDataExtraData, ValueType};
