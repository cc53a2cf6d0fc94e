// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshcheck CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use meshcheck::cli::{intersecting_triangles, Reporter, Runner};
use meshcheck::config::{DetectionConfig, KernelKind};
use meshcheck::io::{self, MeshFormat};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "meshcheck")]
#[command(about = "Self-intersection detection for triangle meshes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./meshcheck.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Box count from which the broad phase runs in parallel
    #[arg(long, global = true)]
    cutoff: Option<usize>,

    /// Predicate kernel (exact, float)
    #[arg(long, global = true)]
    kernel: Option<KernelKind>,

    /// Worker threads for the parallel broad phase
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether each mesh self-intersects (exit code 1 if any does)
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the intersecting facet pairs of a mesh
    List {
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Maximum number of pairs to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Write the intersecting triangles to an STL file
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Check every mesh file under a directory
    Scan { dir: PathBuf },

    /// Print structural information about a mesh
    Info {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            Reporter::report_error(&format!("{e:#}"));
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = DetectionConfig::load_from(cli.config.as_deref())?;
    if let Some(cutoff) = cli.cutoff {
        config.cutoff = cutoff;
    }
    if let Some(kernel) = cli.kernel {
        config.kernel = kernel;
    }
    if let Some(threads) = cli.threads {
        config.threads = (threads > 0).then_some(threads);
    }
    info!(cutoff = config.cutoff, kernel = %config.kernel, threads = ?config.threads, "Configuration loaded");

    let runner = Runner::new(config)?;

    match cli.command {
        Commands::Check { files } => check_command(&runner, &files),
        Commands::List {
            file,
            json,
            limit,
            export,
        } => list_command(&runner, &file, json, limit, export.as_deref()),
        Commands::Scan { dir } => scan_command(&runner, &dir),
        Commands::Info { file, json } => info_command(&runner, &file, json),
    }
}

fn check_command(runner: &Runner, files: &[PathBuf]) -> Result<ExitCode> {
    let mut intersecting = 0;
    let mut errors = 0;

    for file in files {
        match runner.check_file(file) {
            Ok(outcome) => {
                if outcome.self_intersecting {
                    intersecting += 1;
                }
                Reporter::report_check(&outcome);
            }
            Err(e) => {
                errors += 1;
                Reporter::report_error(&format!("{e:#}"));
            }
        }
    }

    if files.len() > 1 {
        Reporter::report_summary(files.len() - errors, intersecting, errors);
    }

    Ok(exit_code(intersecting, errors))
}

fn list_command(
    runner: &Runner,
    file: &Path,
    json: bool,
    limit: Option<usize>,
    export: Option<&Path>,
) -> Result<ExitCode> {
    let (mesh, report) = runner.list_file(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let limit = limit.unwrap_or(runner.config().report_limit);
        Reporter::report_pairs(&file.display().to_string(), &report, limit);
    }

    if let Some(path) = export {
        let triangles = intersecting_triangles(&mesh, &report);
        io::export_triangles_stl(path, &triangles)
            .with_context(|| format!("Failed to export triangles: {}", path.display()))?;
        if !json {
            Reporter::success(&format!("Exported {} triangles to {}", triangles.len(), path.display()));
        }
    }

    Ok(exit_code(usize::from(report.is_self_intersecting()), 0))
}

fn scan_command(runner: &Runner, dir: &Path) -> Result<ExitCode> {
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| MeshFormat::from_path(path).is_some())
        .collect();

    if files.is_empty() {
        Reporter::report_warning(&format!("No mesh files found under {}", dir.display()));
        return Ok(ExitCode::SUCCESS);
    }
    Reporter::report_info(&format!("Scanning {} mesh files", files.len()));

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut flagged = Vec::new();
    let mut failures = Vec::new();
    for file in &files {
        progress.set_message(file.display().to_string());
        match runner.check_file(file) {
            Ok(outcome) if outcome.self_intersecting => flagged.push(outcome.path),
            Ok(_) => {}
            Err(e) => failures.push(format!("{e:#}")),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    for path in &flagged {
        println!("{} {}", "❌".red(), path.display().to_string().cyan());
    }
    for failure in &failures {
        Reporter::report_error(failure);
    }
    Reporter::report_summary(files.len() - failures.len(), flagged.len(), failures.len());

    Ok(exit_code(flagged.len(), failures.len()))
}

fn info_command(runner: &Runner, file: &Path, json: bool) -> Result<ExitCode> {
    let info = runner.info_file(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        Reporter::report_mesh_info(&file.display().to_string(), &info);
    }
    Ok(ExitCode::SUCCESS)
}

/// 0 when clean, 1 when something self-intersects, 2 when a file failed
fn exit_code(intersecting: usize, errors: usize) -> ExitCode {
    if errors > 0 {
        ExitCode::from(2)
    } else if intersecting > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
