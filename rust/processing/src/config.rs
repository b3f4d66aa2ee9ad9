// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Processing configuration loaded from environment variables.

use polyforge_geometry::triangulation::{DEFAULT_JITTER_AMPLITUDE, DEFAULT_JITTER_SEED};
use polyforge_geometry::{EarcutTriangulator, JitterSettings};

/// Processing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingConfig {
    /// Seed of the triangulation jitter generator.
    pub jitter_seed: u64,
    /// Jitter amplitude applied to points before ear clipping.
    pub jitter_amplitude: f64,
    /// Replace generated normals with position-welded smooth normals.
    pub smooth_normals: bool,
    /// Number of worker threads for batch processing.
    pub worker_threads: usize,
}

impl ProcessingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Missing or malformed values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::defaults();
        Self {
            jitter_seed: lookup("POLYFORGE_JITTER_SEED")
                .and_then(|v| parse_seed(&v))
                .unwrap_or(defaults.jitter_seed),
            jitter_amplitude: lookup("POLYFORGE_JITTER_AMPLITUDE")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|a| a.is_finite() && *a >= 0.0)
                .unwrap_or(defaults.jitter_amplitude),
            smooth_normals: lookup("POLYFORGE_SMOOTH_NORMALS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.smooth_normals),
            worker_threads: lookup("POLYFORGE_WORKER_THREADS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.worker_threads),
        }
    }

    /// Built-in defaults, ignoring the environment.
    pub fn defaults() -> Self {
        Self {
            jitter_seed: DEFAULT_JITTER_SEED,
            jitter_amplitude: DEFAULT_JITTER_AMPLITUDE,
            smooth_normals: false,
            worker_threads: num_cpus::get(),
        }
    }

    /// Triangulator configured with this jitter.
    pub fn triangulator(&self) -> EarcutTriangulator {
        EarcutTriangulator::new(JitterSettings {
            seed: self.jitter_seed,
            amplitude: self.jitter_amplitude,
        })
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Decimal or `0x`-prefixed hexadecimal seed
fn parse_seed(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
