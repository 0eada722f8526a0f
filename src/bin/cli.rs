// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surfmesh CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use surfmesh::extra_data::TriangleNormal;
use surfmesh::geometry::analyze;
use surfmesh::io::compare_meshes;
use surfmesh::validation::IntegrityReporter;
use surfmesh::{ExportOptions, IntegrityConfig, Mesh, MeshExporter, MeshIntegrity, MeshLoader};

#[derive(Parser)]
#[command(name = "surfmesh")]
#[command(about = "Surfmesh - triangular surface mesh inspection and conversion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the integrity checker on a mesh file
    Check {
        /// Input OFF or OBJ file
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Integrity configuration file (defaults to surfmesh.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write a Markdown report
        #[arg(long, value_name = "FILE")]
        markdown: Option<PathBuf>,
    },

    /// Convert between OFF and OBJ
    Convert {
        input: PathBuf,

        output: PathBuf,

        /// Drop texture coordinates
        #[arg(long)]
        no_texcoords: bool,

        /// Drop normals
        #[arg(long)]
        no_normals: bool,

        /// Drop materials and material libraries
        #[arg(long)]
        no_materials: bool,

        /// Reload the output and compare it with the input
        #[arg(long)]
        verify: bool,
    },

    /// Print mesh statistics
    Info {
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute normals and write them out as OBJ
    Normals {
        input: PathBuf,

        output: PathBuf,

        /// Angle-weighted smooth vertex normals instead of per-triangle normals
        #[arg(long)]
        smooth: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Check {
            input,
            json,
            config,
            markdown,
        } => check_command(input, *json, config.as_deref(), markdown.as_deref(), cli.verbose),
        Commands::Convert {
            input,
            output,
            no_texcoords,
            no_normals,
            no_materials,
            verify,
        } => {
            let options = ExportOptions::all()
                .with_tex_coords(!no_texcoords)
                .with_normals(!no_normals)
                .with_materials(!no_materials);
            convert_command(input, output, options, *verify, cli.verbose)
        }
        Commands::Info { input, json } => info_command(input, *json),
        Commands::Normals {
            input,
            output,
            smooth,
        } => normals_command(input, output, *smooth, cli.verbose),
    }
}

fn load_input(input: &Path) -> Result<Mesh> {
    if !input.exists() {
        eprintln!("{} Input file not found: {}", "Error:".red(), input.display());
        std::process::exit(1);
    }
    MeshLoader::new()
        .load_path(input)
        .with_context(|| format!("Failed to load {}", input.display()))
}

fn check_command(
    input: &Path,
    json: bool,
    config: Option<&Path>,
    markdown: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => IntegrityConfig::from_file(path)?,
        None => IntegrityConfig::load()?,
    };
    let mesh = load_input(input)?;

    let report = MeshIntegrity::with_config(config).check(&mesh);
    let source = input.display().to_string();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        IntegrityReporter::print_summary_with_verbose(&report, &source, verbose);
    }

    if let Some(path) = markdown {
        IntegrityReporter::write_markdown(&report, &source, path)?;
        if verbose {
            println!("Markdown report written to: {}", path.display());
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

fn convert_command(
    input: &Path,
    output: &Path,
    options: ExportOptions,
    verify: bool,
    verbose: bool,
) -> Result<()> {
    let start = std::time::Instant::now();
    let mesh = load_input(input)?;
    if verbose {
        println!("Loaded in {:.2?}", start.elapsed());
        println!("Vertices: {}", mesh.vertex_count());
        println!("Triangles: {}", mesh.triangle_count());
    }

    let export_start = std::time::Instant::now();
    MeshExporter::new(options)
        .export_path(&mesh, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    if verbose {
        println!("Exported in {:.2?}", export_start.elapsed());
    }

    if verify {
        let reloaded = MeshLoader::new()
            .load_path(output)
            .with_context(|| format!("Failed to reload {}", output.display()))?;
        let comparison = compare_meshes(&mesh, &reloaded, 1e-9);
        if comparison.passed {
            println!("{} Round trip verified", "✓".green());
        } else {
            println!("{} Round trip mismatch", "✗".red());
            println!("{}", serde_json::to_string_pretty(&comparison)?);
            std::process::exit(1);
        }
    }

    println!("Successfully converted {} -> {}", input.display(), output.display());
    Ok(())
}

fn info_command(input: &Path, json: bool) -> Result<()> {
    let mesh = load_input(input)?;
    let stats = analyze(&mesh);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", input.display().to_string().bold());
    stats.print();

    for scope in surfmesh::Scope::all() {
        let attributes = mesh.attributes(scope);
        if attributes.is_empty() {
            continue;
        }
        println!("  {} attributes:", scope.to_string().cyan());
        for (name, store) in attributes.iter() {
            println!("    {} ({}, {} values)", name, store.value_type(), store.len());
        }
    }
    Ok(())
}

fn normals_command(input: &Path, output: &Path, smooth: bool, verbose: bool) -> Result<()> {
    let mut mesh = load_input(input)?;

    if smooth {
        mesh.compute_smooth_vertex_normals(true)?;
        // Exported OBJ normals prefer per-triangle values when both are attached.
        if mesh.has_kind::<TriangleNormal>() {
            mesh.detach_kind::<TriangleNormal>()?;
        }
    } else {
        mesh.compute_triangle_normals(true)?;
    }
    if verbose {
        println!(
            "Computed {} normals for {} triangles",
            if smooth { "smooth vertex" } else { "triangle" },
            mesh.triangle_count()
        );
    }

    MeshExporter::new(ExportOptions::all())
        .export_path(&mesh, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Normals written to {}", output.display());
    Ok(())
}
