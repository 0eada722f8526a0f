// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Integrity report writers

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use super::types::IntegrityReport;

/// Terminal, JSON and Markdown output for integrity reports
pub struct IntegrityReporter;

impl IntegrityReporter {
    /// Write JSON report
    pub fn write_json(report: &IntegrityReport, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Render the Markdown report
    pub fn to_markdown(report: &IntegrityReport, source: &str) -> String {
        let mut md = String::new();

        md.push_str("# Mesh Integrity Report\n\n");
        md.push_str(&format!("**Source:** `{}`\n\n", source));
        md.push_str("---\n\n");

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Vertices:** {}\n", report.vertex_count));
        md.push_str(&format!("- **Triangles:** {}\n", report.triangle_count));
        md.push_str(&format!("- **Boundary Edges:** {}\n", report.boundary_edges.len()));
        md.push_str(&format!("- **Findings:** {}\n", report.findings.len()));
        md.push_str(&format!(
            "- **Status:** {}\n\n",
            if report.is_valid() { "valid" } else { "invalid" }
        ));

        if !report.findings.is_empty() {
            md.push_str("## Findings\n\n");
            md.push_str("| Kind | Count |\n|---|---|\n");
            for (kind, count) in report.summary() {
                md.push_str(&format!("| {} | {} |\n", kind, count));
            }
            md.push('\n');

            for finding in &report.findings {
                md.push_str(&format!(
                    "- `{}` {}: {}\n",
                    finding.kind, finding.entity, finding.message
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Write Markdown report
    pub fn write_markdown(report: &IntegrityReport, source: &str, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), Self::to_markdown(report, source))
            .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Print terminal summary
    pub fn print_summary(report: &IntegrityReport, source: &str) {
        Self::print_summary_with_verbose(report, source, false)
    }

    /// Print terminal summary, listing every finding when `verbose`
    pub fn print_summary_with_verbose(report: &IntegrityReport, source: &str, verbose: bool) {
        println!("\n{}", "═".repeat(80).white());
        println!("{}", "Mesh Integrity Report".bold());
        println!("{}", "═".repeat(80).white());
        println!("  {} {}", "Source:".white(), source.cyan());
        println!("  {} {}", "Vertices:".white(), report.vertex_count.to_string().cyan());
        println!("  {} {}", "Triangles:".white(), report.triangle_count.to_string().cyan());
        println!(
            "  {} {}",
            "Boundary Edges:".white(),
            report.boundary_edges.len().to_string().yellow()
        );
        println!(
            "  {} {}",
            "Findings:".white(),
            if report.findings.is_empty() {
                report.findings.len().to_string().green()
            } else {
                report.findings.len().to_string().red()
            }
        );

        if !report.findings.is_empty() {
            println!("\n{}", "Findings by Kind".bold());
            println!("{}", "─".repeat(80).white());
            for (kind, count) in report.summary() {
                println!("  {} {}: {}", "✗".red(), kind.as_str().cyan(), count);
            }

            let shown = if verbose { report.findings.len() } else { 10 };
            println!();
            for finding in report.findings.iter().take(shown) {
                println!("  {} {}", finding.entity.to_string().yellow(), finding.message);
            }
            if report.findings.len() > shown {
                println!("  ... {} more (use --verbose)", report.findings.len() - shown);
            }
        }

        println!("{}", "═".repeat(80).white());
        if report.is_valid() {
            println!("{}", "✓ Mesh is valid".green().bold());
        } else {
            println!("{}", "✗ Mesh has integrity problems".red().bold());
        }
    }
}
