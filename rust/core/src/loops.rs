// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loop and profile records produced by the interchange parser

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Role of a closed 2D loop inside a polygon solid definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LoopRole {
    /// The single boundary loop of the solid
    #[default]
    Outer,
    /// A cut-out inside the outer loop
    Hole,
}

impl LoopRole {
    /// +1 for the outer loop, -1 for holes
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            LoopRole::Outer => 1.0,
            LoopRole::Hole => -1.0,
        }
    }

    #[inline]
    pub fn is_hole(self) -> bool {
        matches!(self, LoopRole::Hole)
    }
}

/// A block of points read from text, tagged with its role
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParsedLoop {
    pub points: Vec<[f64; 2]>,
    pub role: LoopRole,
}

/// A revolution profile read from text
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParsedProfile {
    /// `(radius, height)` pairs
    pub points: Vec<[f64; 2]>,
    /// True when the block repeated its first point at the end
    pub closed: bool,
}
