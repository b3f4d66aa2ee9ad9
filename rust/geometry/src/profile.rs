// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D inputs for the generators: revolution profiles and extrusion loops

use nalgebra::Point2;
use polyforge_core::{LoopRole, ParsedLoop, ParsedProfile};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether a profile polyline is swept as-is or closes back on itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProfileKind {
    #[default]
    Open,
    Closed,
}

/// Revolution profile: `(radius, height)` points, first point at the bottom
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Profile {
    pub points: Vec<Point2<f64>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: ProfileKind,
}

impl Profile {
    pub fn open(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            kind: ProfileKind::Open,
        }
    }

    pub fn closed(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            kind: ProfileKind::Closed,
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.kind == ProfileKind::Closed
    }

    /// Check point count, finiteness and that no radius is negative
    pub fn validate(&self) -> Result<()> {
        let min = if self.is_closed() { 3 } else { 2 };
        if self.points.len() < min {
            return Err(Error::InvalidProfile(format!(
                "{:?} profile needs at least {} points, got {}",
                self.kind,
                min,
                self.points.len()
            )));
        }

        for (i, p) in self.points.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(Error::InvalidProfile(format!("point {} is not finite", i)));
            }
            if p.x < 0.0 {
                return Err(Error::InvalidProfile(format!(
                    "point {} has negative radius {}",
                    i, p.x
                )));
            }
        }

        Ok(())
    }
}

impl From<ParsedProfile> for Profile {
    fn from(parsed: ParsedProfile) -> Self {
        let points = parsed
            .points
            .into_iter()
            .map(|[x, y]| Point2::new(x, y))
            .collect();
        if parsed.closed {
            Profile::closed(points)
        } else {
            Profile::open(points)
        }
    }
}

/// Closed 2D loop of an extrusion, tagged outer or hole
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Loop2D {
    pub points: Vec<Point2<f64>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: LoopRole,
}

impl Loop2D {
    pub fn outer(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            role: LoopRole::Outer,
        }
    }

    pub fn hole(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            role: LoopRole::Hole,
        }
    }
}

impl From<ParsedLoop> for Loop2D {
    fn from(parsed: ParsedLoop) -> Self {
        Self {
            points: parsed
                .points
                .into_iter()
                .map(|[x, y]| Point2::new(x, y))
                .collect(),
            role: parsed.role,
        }
    }
}

/// Axis-aligned rectangle centered at the origin, counter-clockwise
pub fn create_rectangle(width: f64, height: f64) -> Vec<Point2<f64>> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    vec![
        Point2::new(-hw, -hh),
        Point2::new(hw, -hh),
        Point2::new(hw, hh),
        Point2::new(-hw, hh),
    ]
}

/// Regular polygon approximating a circle, counter-clockwise
pub fn create_circle(radius: f64, segments: usize) -> Vec<Point2<f64>> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / segments as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}
