// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyforge CLI - generate solids from JSON requests
//!
//! # Usage
//!
//! ```bash
//! # One request, or an array of requests
//! polyforge request.json
//!
//! # Take the loops (or the revolution profile) from a point list file
//! polyforge request.json --points outline.txt
//!
//! # Read the request from stdin
//! echo '{ "kind": "revolution", "profile": { "points": [[1, 0], [1, 2]] } }' | polyforge -
//! ```
//!
//! Statistics for every generated mesh are printed as JSON. Logging goes to
//! stderr and is controlled through `RUST_LOG`; generation settings come from
//! the `POLYFORGE_*` environment variables.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use polyforge_processing::{
    batch_report, parse_requests, process_batch, ProcessingConfig, ShapeRequest,
};

/// Polyforge CLI - procedural solid generation
#[derive(Parser)]
#[command(name = "polyforge")]
#[command(about = "Generate revolution, extrusion and patch solids from JSON requests")]
#[command(version)]
struct Cli {
    /// Request file (JSON object or array), `-` for stdin
    request: PathBuf,

    /// Point list file replacing the loops or profile of a single request
    #[arg(long)]
    points: Option<PathBuf>,

    /// Recalculate position-welded smooth normals
    #[arg(long)]
    smooth_normals: bool,

    /// Override the triangulation jitter seed
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for batch generation
    #[arg(long)]
    threads: Option<usize>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,polyforge_processing=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ProcessingConfig::from_env();
    config.smooth_normals |= cli.smooth_normals;
    if let Some(seed) = cli.seed {
        config.jitter_seed = seed;
    }
    if let Some(threads) = cli.threads.filter(|n| *n > 0) {
        config.worker_threads = threads;
    }

    tracing::debug!(
        seed = config.jitter_seed,
        amplitude = config.jitter_amplitude,
        smooth_normals = config.smooth_normals,
        worker_threads = config.worker_threads,
        "Configuration loaded"
    );

    let json = read_input(&cli.request)?;
    let requests = match &cli.points {
        Some(path) => {
            let text = read_input(path)?;
            vec![ShapeRequest::from_json_with_points(&json, &text)
                .context("Failed to build request from point list")?]
        }
        None => parse_requests(&json).context("Failed to parse request")?,
    };

    let results = process_batch(&requests, &config)?;
    let report = batch_report(&requests, &results);

    let out = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", out);

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} requests failed", failed, results.len());
    }
    Ok(())
}
