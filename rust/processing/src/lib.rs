// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyforge Processing
//!
//! Caller-facing layer over `polyforge-geometry`: JSON request types,
//! environment configuration, batch generation on a rayon pool and mesh
//! statistics.
//!
//! ```rust
//! use polyforge_processing::{process_request, ProcessingConfig, ShapeRequest};
//!
//! let request = ShapeRequest::from_json(
//!     r#"{ "kind": "revolution", "profile": { "points": [[1, 0], [1, 2]] } }"#,
//! )
//! .unwrap();
//! let shape = process_request(&request, &ProcessingConfig::defaults()).unwrap();
//! assert_eq!(shape.stats.faces, 24);
//! ```

pub mod config;
pub mod error;
pub mod processor;
pub mod request;
pub mod stats;

pub use config::ProcessingConfig;
pub use error::{ProcessingError, Result};
pub use processor::{batch_report, process_batch, process_request, BatchEntry, ProcessedShape};
pub use request::{loops_from_text, parse_requests, profile_from_text, ShapeRequest};
pub use stats::MeshStats;
