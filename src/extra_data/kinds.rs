// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Well-known attribute kinds
//!
//! Each kind fixes a name, a scope and a value type so that loaders, exporters and
//! geometry helpers agree on where a given piece of extra data lives.

use super::container::Scope;
use super::store::AttributeValue;
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Static description of a well-known attribute
pub trait AttributeKind {
    type Value: AttributeValue;

    const NAME: &'static str;
    const SCOPE: Scope;

    fn default_value() -> Self::Value;
}

/// Per-triangle face normal
pub struct TriangleNormal;

impl AttributeKind for TriangleNormal {
    type Value = Vector3<f64>;
    const NAME: &'static str = "triangle_normal";
    const SCOPE: Scope = Scope::Triangle;

    fn default_value() -> Self::Value {
        Vector3::zeros()
    }
}

/// Per-vertex normal averaged over incident triangles
pub struct SmoothVertexNormal;

impl AttributeKind for SmoothVertexNormal {
    type Value = Vector3<f64>;
    const NAME: &'static str = "smooth_vertex_normal";
    const SCOPE: Scope = Scope::Vertex;

    fn default_value() -> Self::Value {
        Vector3::zeros()
    }
}

/// Per-vertex list of incident face normals weighted by corner angle
pub struct FlatVertexNormals;

impl AttributeKind for FlatVertexNormals {
    type Value = Vec<Vector3<f64>>;
    const NAME: &'static str = "flat_vertex_normals";
    const SCOPE: Scope = Scope::Vertex;

    fn default_value() -> Self::Value {
        Vec::new()
    }
}

/// True for vertices on a boundary edge
pub struct VertexBoundary;

impl AttributeKind for VertexBoundary {
    type Value = bool;
    const NAME: &'static str = "is_boundary_vertex";
    const SCOPE: Scope = Scope::Vertex;

    fn default_value() -> Self::Value {
        false
    }
}

/// Material name used by a triangle, empty for none
pub struct TriangleMaterial;

impl AttributeKind for TriangleMaterial {
    type Value = String;
    const NAME: &'static str = "triangle_material";
    const SCOPE: Scope = Scope::Triangle;

    fn default_value() -> Self::Value {
        String::new()
    }
}

/// Texture coordinates of the three corners of a triangle
pub struct CornerTexCoords;

impl AttributeKind for CornerTexCoords {
    type Value = [Vector2<f64>; 3];
    const NAME: &'static str = "corner_tex_coords";
    const SCOPE: Scope = Scope::Triangle;

    fn default_value() -> Self::Value {
        [Vector2::zeros(); 3]
    }
}

/// Materials defined for the whole object
pub struct ObjectMaterials;

impl AttributeKind for ObjectMaterials {
    type Value = Vec<Material>;
    const NAME: &'static str = "object_materials";
    const SCOPE: Scope = Scope::Mesh;

    fn default_value() -> Self::Value {
        Vec::new()
    }
}

/// Material library files referenced by the source file
pub struct MaterialLibraries;

impl AttributeKind for MaterialLibraries {
    type Value = Vec<String>;
    const NAME: &'static str = "material_libraries";
    const SCOPE: Scope = Scope::Mesh;

    fn default_value() -> Self::Value {
        Vec::new()
    }
}

/// Unrecognized directives kept verbatim for export
pub struct PreservedDirectives;

impl AttributeKind for PreservedDirectives {
    type Value = Vec<String>;
    const NAME: &'static str = "preserved_directives";
    const SCOPE: Scope = Scope::Mesh;

    fn default_value() -> Self::Value {
        Vec::new()
    }
}

/// Surface material description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Ka
    pub ambient: Vector3<f64>,
    /// Kd
    pub diffuse: Vector3<f64>,
    /// Ks
    pub specular: Vector3<f64>,
    /// Ke
    pub emissive: Vector3<f64>,
    /// Ns
    pub shininess: f64,
    /// Ni
    pub optical_density: f64,
    /// d
    pub dissolve: f64,
    pub ambient_map: Option<String>,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: Vector3::zeros(),
            diffuse: Vector3::zeros(),
            specular: Vector3::zeros(),
            emissive: Vector3::zeros(),
            shininess: 0.0,
            optical_density: 1.0,
            dissolve: 1.0,
            ambient_map: None,
            diffuse_map: None,
            specular_map: None,
        }
    }
}
