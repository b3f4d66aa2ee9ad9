// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the processing pipeline.

use thiserror::Error;

/// Processing error types.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] polyforge_geometry::Error),

    #[error("Point list error: {0}")]
    Points(#[from] polyforge_core::Error),

    #[error("Invalid request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ProcessingError>;
