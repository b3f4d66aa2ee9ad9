// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types accepted by the pipeline.
//!
//! Requests are JSON objects tagged by `kind`:
//!
//! ```json
//! { "kind": "extrusion", "thickness": 0.5, "loops": [{ "points": [[0, 0], [1, 0], [0, 1]] }] }
//! ```

use polyforge_geometry::{ExtrusionParams, Loop2D, PatchParams, Profile, RevolutionParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One shape to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeRequest {
    Revolution(RevolutionParams),
    Extrusion(ExtrusionParams),
    Patch(PatchParams),
}

impl ShapeRequest {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeRequest::Revolution(_) => "revolution",
            ShapeRequest::Extrusion(_) => "extrusion",
            ShapeRequest::Patch(_) => "patch",
        }
    }

    /// Parse a single request from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a request whose points come from the plain-text point format.
    ///
    /// Revolution requests take the first block as their profile; the
    /// other kinds take every block as a loop. Points given in the JSON
    /// are replaced.
    pub fn from_json_with_points(json: &str, points: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(json)?;
        let is_revolution = value.get("kind").and_then(Value::as_str) == Some("revolution");

        if let Value::Object(fields) = &mut value {
            if is_revolution {
                fields.insert(
                    "profile".to_string(),
                    serde_json::to_value(profile_from_text(points)?)?,
                );
            } else {
                fields.insert(
                    "loops".to_string(),
                    serde_json::to_value(loops_from_text(points)?)?,
                );
            }
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Parse a single request or an array of requests.
pub fn parse_requests(json: &str) -> Result<Vec<ShapeRequest>> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

/// Read extrusion loops from the plain-text point format.
pub fn loops_from_text(text: &str) -> Result<Vec<Loop2D>> {
    Ok(polyforge_core::parse_loops(text)?
        .into_iter()
        .map(Loop2D::from)
        .collect())
}

/// Read a revolution profile from the plain-text point format.
pub fn profile_from_text(text: &str) -> Result<Profile> {
    Ok(polyforge_core::parse_profile(text)?.into())
}
