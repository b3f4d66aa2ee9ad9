// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape generation with parallel batch processing.

use polyforge_geometry::{generate_loop_extrusion_with, generate_patch_with, generate_revolution_with, Mesh};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::request::ShapeRequest;
use crate::stats::MeshStats;

/// Result of processing one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedShape {
    pub mesh: Mesh,
    pub stats: MeshStats,
}

/// Per-request entry of a batch report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Ok { kind: String, stats: MeshStats },
    Failed { kind: String, error: String },
}

/// Generate the mesh for a single request.
pub fn process_request(request: &ShapeRequest, config: &ProcessingConfig) -> Result<ProcessedShape> {
    let span = tracing::info_span!("process_request", kind = request.kind());
    let _guard = span.enter();
    let start = std::time::Instant::now();

    let triangulator = config.triangulator();
    let generated = match request {
        ShapeRequest::Revolution(params) => generate_revolution_with(params, &triangulator),
        ShapeRequest::Extrusion(params) => generate_loop_extrusion_with(params, &triangulator),
        ShapeRequest::Patch(params) => generate_patch_with(params, &triangulator),
    };

    let mut mesh = match generated {
        Ok(mesh) => mesh,
        Err(e) => {
            tracing::warn!(error = %e, "Shape generation failed");
            return Err(e.into());
        }
    };

    if config.smooth_normals {
        mesh.recalculate_smooth_normals();
    }

    let stats = MeshStats::from_mesh(&mesh);
    tracing::info!(
        vertices = stats.vertices,
        triangles = stats.triangles,
        time_ms = start.elapsed().as_millis() as u64,
        "Shape generated"
    );

    Ok(ProcessedShape { mesh, stats })
}

/// Generate a batch of independent requests on a dedicated worker pool.
///
/// Results keep the order of `requests`; one failing request does not stop
/// the others.
pub fn process_batch(
    requests: &[ShapeRequest],
    config: &ProcessingConfig,
) -> Result<Vec<Result<ProcessedShape>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build()?;

    tracing::info!(
        requests = requests.len(),
        worker_threads = config.worker_threads,
        "Starting batch"
    );

    let results: Vec<Result<ProcessedShape>> = pool.install(|| {
        requests
            .par_iter()
            .map(|request| process_request(request, config))
            .collect()
    });

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        succeeded = results.len() - failed,
        failed,
        "Batch complete"
    );

    Ok(results)
}

/// Summarize batch results for reporting.
pub fn batch_report(requests: &[ShapeRequest], results: &[Result<ProcessedShape>]) -> Vec<BatchEntry> {
    requests
        .iter()
        .zip(results)
        .map(|(request, result)| {
            let kind = request.kind().to_string();
            match result {
                Ok(shape) => BatchEntry::Ok {
                    kind,
                    stats: shape.stats.clone(),
                },
                Err(e) => BatchEntry::Failed {
                    kind,
                    error: e.to_string(),
                },
            }
        })
        .collect()
}
