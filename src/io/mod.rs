// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - loading, exporting and comparing meshes

mod compare;
mod exporter;
mod format;
mod loader;
mod parser;

pub use compare::{compare_meshes, MeshComparison};
pub use exporter::{ExportOptions, MeshExporter};
pub use format::MeshFormat;
pub use loader::MeshLoader;
