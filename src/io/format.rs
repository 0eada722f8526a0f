// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file formats

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Textual mesh formats understood by the loader and exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    /// Object File Format, 0-based indices
    Off,
    /// Wavefront OBJ, with optional MTL material libraries
    Obj,
}

impl MeshFormat {
    /// Detect the format from a file extension, case-insensitively
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "off" => Some(Self::Off),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Obj => "obj",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Obj => "OBJ",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for paths whose extension names no supported format
pub(crate) fn unsupported(path: &Path) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("unrecognized mesh format: {}", path.display()),
    )
}
