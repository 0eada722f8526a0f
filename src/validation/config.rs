// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Integrity checker configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`IntegrityConfig::load`]
pub const CONFIG_FILE: &str = "surfmesh.toml";

/// Which integrity checks run, and their tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Triangles with area at or below this are degenerate
    pub area_epsilon: f64,
    pub orphan_vertices: bool,
    pub duplicate_triangles: bool,
    pub non_manifold_edges: bool,
    pub degenerate_triangles: bool,
    /// Boundary edges must have no neighbor link, and `VertexBoundary` flags must match them
    pub boundary_edges: bool,
    /// Neighbor links, incident lists and the edge table must mirror the triangle records
    pub adjacency: bool,
    pub non_manifold_vertices: bool,
    /// Attribute stores must stay in step with their scope
    pub attributes: bool,
    /// Fill `IntegrityReport::boundary_edges`
    pub report_boundary_edges: bool,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            area_epsilon: 1e-12,
            orphan_vertices: true,
            duplicate_triangles: true,
            non_manifold_edges: true,
            degenerate_triangles: true,
            boundary_edges: true,
            adjacency: true,
            non_manifold_vertices: true,
            attributes: true,
            report_boundary_edges: true,
        }
    }
}

impl IntegrityConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: IntegrityConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `surfmesh.toml` when present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Ok(epsilon) = std::env::var("SURFMESH_AREA_EPSILON") {
            config.area_epsilon = epsilon
                .parse()
                .with_context(|| format!("Invalid SURFMESH_AREA_EPSILON: {epsilon}"))?;
        }

        if let Ok(skip) = std::env::var("SURFMESH_SKIP_BOUNDARY") {
            if skip.parse().unwrap_or(false) {
                config.boundary_edges = false;
                config.report_boundary_edges = false;
            }
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Topology and attribute checks only, without geometric or fan checks
    pub fn structural_only() -> Self {
        Self {
            degenerate_triangles: false,
            non_manifold_vertices: false,
            report_boundary_edges: false,
            ..Self::default()
        }
    }
}
