// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh integrity validation
//!
//! [`MeshIntegrity`] re-validates a constructed mesh independently of the checks
//! made at insertion time and produces an [`IntegrityReport`] of findings.

pub mod config;
pub mod integrity;
pub mod reporter;
pub mod types;

pub use config::IntegrityConfig;
pub use integrity::MeshIntegrity;
pub use reporter::IntegrityReporter;
pub use types::{EntityRef, Finding, FindingKind, IntegrityReport};
