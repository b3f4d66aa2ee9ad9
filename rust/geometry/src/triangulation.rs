// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! [`Triangulator`] is the seam for the ear-clipping backend; the default
//! [`EarcutTriangulator`] wraps earcutr and nudges coordinates with a seeded
//! jitter so that collinear and coincident points do not trip the clipper.
//! [`triangulate_polygon`] wraps any backend with the checks every caller
//! relies on: input validation, counter-clockwise output, degenerate
//! triangle removal and area coverage.

use nalgebra::Point2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::error::{Error, Result};
use crate::primitives::{contour_bounds, find_crossing, signed_area, triangle_area, EPSILON};

/// Default seed for the triangulation jitter
pub const DEFAULT_JITTER_SEED: u64 = 0x5EED_CAFE;

/// Default jitter amplitude, relative to the polygon extent
pub const DEFAULT_JITTER_AMPLITUDE: f64 = 1e-9;

/// Relative tolerance on the summed triangle area
const AREA_TOLERANCE: f64 = 0.01;

/// Ear-clipping backend
///
/// Indices address the outer loop followed by each hole in order.
pub trait Triangulator: Send + Sync {
    fn triangulate(
        &self,
        outer: &[Point2<f64>],
        holes: &[&[Point2<f64>]],
    ) -> Result<Vec<[usize; 3]>>;
}

/// Seeded coordinate perturbation applied before ear clipping
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JitterSettings {
    pub seed: u64,
    /// Maximum offset per coordinate as a fraction of the bounding-box extent
    pub amplitude: f64,
}

impl Default for JitterSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_JITTER_SEED,
            amplitude: DEFAULT_JITTER_AMPLITUDE,
        }
    }
}

/// earcutr-backed triangulator
///
/// A fresh generator is seeded for every call, so the same input always
/// yields the same triangles.
#[derive(Debug, Clone, Default)]
pub struct EarcutTriangulator {
    pub jitter: JitterSettings,
}

impl EarcutTriangulator {
    pub fn new(jitter: JitterSettings) -> Self {
        Self { jitter }
    }

    /// Flatten and perturb the input for earcutr
    fn jittered(&self, outer: &[Point2<f64>], holes: &[&[Point2<f64>]]) -> (Vec<f64>, Vec<usize>) {
        let extent = contour_bounds(outer)
            .map(|(min, max)| (max.x - min.x).max(max.y - min.y))
            .unwrap_or(0.0);
        let scale = self.jitter.amplitude * extent;
        let mut rng = Pcg64::seed_from_u64(self.jitter.seed);

        let total = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
        let mut vertices = Vec::with_capacity(total * 2);
        let mut hole_indices = Vec::with_capacity(holes.len());

        let mut push = |p: &Point2<f64>, vertices: &mut Vec<f64>| {
            vertices.push(p.x + rng.random_range(-1.0..1.0) * scale);
            vertices.push(p.y + rng.random_range(-1.0..1.0) * scale);
        };

        for p in outer {
            push(p, &mut vertices);
        }
        for hole in holes {
            hole_indices.push(vertices.len() / 2);
            for p in hole.iter() {
                push(p, &mut vertices);
            }
        }

        (vertices, hole_indices)
    }
}

impl Triangulator for EarcutTriangulator {
    fn triangulate(
        &self,
        outer: &[Point2<f64>],
        holes: &[&[Point2<f64>]],
    ) -> Result<Vec<[usize; 3]>> {
        // Fast paths only look at point order, so jitter cannot change them

        // FAST PATH: Triangle - no triangulation needed
        if holes.is_empty() && outer.len() == 3 {
            return Ok(vec![[0, 1, 2]]);
        }

        // FAST PATH: Convex polygon - use fan triangulation
        if holes.is_empty() && outer.len() <= 8 && is_convex(outer) {
            return Ok(fan_triangulate(outer.len()));
        }

        let (vertices, hole_indices) = self.jittered(outer, holes);

        let indices = earcutr::earcut(&vertices, &hole_indices, 2)
            .map_err(|e| Error::TriangulationFailure(format!("{:?}", e)))?;

        Ok(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect())
    }
}

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let min_cross = EPSILON * extent_sq(points);
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1 - p0).perp(&(p2 - p1));

        if cross.abs() > min_cross {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false; // Sign changed - not convex
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<[usize; 3]> {
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

/// Triangulate a polygon with holes through `triangulator`
///
/// Returns counter-clockwise triangles indexing the outer loop followed by
/// each hole. Triangles whose area is negligible on the unperturbed points
/// are dropped.
pub fn triangulate_polygon(
    triangulator: &dyn Triangulator,
    outer: &[Point2<f64>],
    holes: &[&[Point2<f64>]],
) -> Result<Vec<[usize; 3]>> {
    let points: Vec<Point2<f64>> = outer
        .iter()
        .chain(holes.iter().flat_map(|h| h.iter()))
        .cloned()
        .collect();

    let expected = validate_polygon(outer, holes)?;

    let raw = triangulator.triangulate(outer, holes)?;

    let min_area = EPSILON * extent_sq(outer);

    let mut covered = 0.0;
    let mut triangles = Vec::with_capacity(raw.len());
    for [a, b, c] in raw {
        if a >= points.len() || b >= points.len() || c >= points.len() {
            return Err(Error::TriangulationFailure(format!(
                "backend returned index out of range ({}, {}, {}) for {} points",
                a,
                b,
                c,
                points.len()
            )));
        }

        let area = triangle_area(&points[a], &points[b], &points[c]);
        if area.abs() <= min_area {
            continue;
        }
        covered += area.abs();
        triangles.push(if area > 0.0 { [a, b, c] } else { [a, c, b] });
    }

    if triangles.is_empty() {
        return Err(Error::TriangulationFailure(
            "no triangles produced".to_string(),
        ));
    }

    if (covered - expected).abs() > AREA_TOLERANCE * expected {
        return Err(Error::TriangulationFailure(format!(
            "triangles cover area {:.6}, polygon area is {:.6}",
            covered, expected
        )));
    }

    Ok(triangles)
}

/// Squared largest side of the bounding box
#[inline]
fn extent_sq(contour: &[Point2<f64>]) -> f64 {
    contour_bounds(contour)
        .map(|(min, max)| (max.x - min.x).max(max.y - min.y))
        .map_or(0.0, |e| e * e)
}

/// Reject inputs the ear clipper cannot handle; returns the net area
pub(crate) fn validate_polygon(outer: &[Point2<f64>], holes: &[&[Point2<f64>]]) -> Result<f64> {
    if outer.len() < 3 {
        return Err(Error::TriangulationFailure(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }
    if let Some(i) = holes.iter().position(|h| h.len() < 3) {
        return Err(Error::TriangulationFailure(format!(
            "hole {} has fewer than 3 points",
            i
        )));
    }

    let outer_area = signed_area(outer).abs();
    let min_area = EPSILON * extent_sq(outer);
    if outer_area <= min_area {
        return Err(Error::TriangulationFailure(
            "outer boundary has zero area".to_string(),
        ));
    }
    if let Some(i) = holes
        .iter()
        .position(|h| signed_area(h).abs() <= EPSILON * extent_sq(h))
    {
        return Err(Error::TriangulationFailure(format!(
            "hole {} has zero area",
            i
        )));
    }

    let contours: Vec<&[Point2<f64>]> = std::iter::once(outer).chain(holes.iter().copied()).collect();
    if let Some((ca, ea, cb, eb)) = find_crossing(&contours) {
        return Err(Error::TriangulationFailure(format!(
            "edge {} of loop {} crosses edge {} of loop {}",
            ea, ca, eb, cb
        )));
    }

    let hole_area: f64 = holes.iter().map(|h| signed_area(h).abs()).sum();
    Ok(outer_area - hole_area)
}
