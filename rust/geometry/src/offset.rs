// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contour offsetting for edge treatments
//!
//! Each vertex moves along the average of its two adjacent edge normals.
//! There is no miter scaling, so sharp corners end up slightly closer than
//! `distance` to the original edges.

use nalgebra::{Point2, Vector2};

use crate::error::{Error, Result};
use crate::primitives::{contour_bounds, find_crossing, point_in_contour, signed_area, EPSILON};

/// Left-hand unit normal of the edge `a -> b`
#[inline]
fn left_normal(a: &Point2<f64>, b: &Point2<f64>) -> Option<Vector2<f64>> {
    let e = b - a;
    Vector2::new(-e.y, e.x).try_normalize(EPSILON)
}

/// Offset a closed contour `distance` to the left of its travel direction
///
/// For a counter-clockwise contour a positive distance shrinks it.
pub fn offset_contour(points: &[Point2<f64>], distance: f64) -> Vec<Point2<f64>> {
    let n = points.len();
    if n < 2 || distance == 0.0 {
        return points.to_vec();
    }

    (0..n)
        .map(|i| {
            let prev = &points[(i + n - 1) % n];
            let curr = &points[i];
            let next = &points[(i + 1) % n];

            let dir = match (left_normal(prev, curr), left_normal(curr, next)) {
                (Some(a), Some(b)) => (a + b).try_normalize(EPSILON).unwrap_or(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => Vector2::zeros(),
            };
            curr + dir * distance
        })
        .collect()
}

/// Check that offset loops are still well formed next to their originals
///
/// `raw[k]` and `offset[k]` must have the same length; `raw[0]` is the outer
/// loop. Fails when an offset edge reverses, a loop flips orientation or
/// collapses, or offset loops cross or escape the outer loop.
pub fn validate_offsets(
    raw: &[&[Point2<f64>]],
    offset: &[Vec<Point2<f64>>],
    size: f64,
) -> Result<()> {
    for (k, (orig, moved)) in raw.iter().zip(offset).enumerate() {
        let n = orig.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let e = orig[j] - orig[i];
            let f = moved[j] - moved[i];
            if e.norm() > EPSILON && e.dot(&f) <= 0.0 {
                return Err(Error::InvalidEdgeTreatment(format!(
                    "offset of {} reverses edge {} of loop {}",
                    size, i, k
                )));
            }
        }

        let before = signed_area(orig);
        let after = signed_area(moved);
        let extent = contour_bounds(orig)
            .map(|(min, max)| (max.x - min.x).max(max.y - min.y))
            .unwrap_or(0.0);
        if after.abs() <= EPSILON * extent * extent || before.signum() != after.signum() {
            return Err(Error::InvalidEdgeTreatment(format!(
                "offset of {} collapses loop {}",
                size, k
            )));
        }
    }

    let contours: Vec<&[Point2<f64>]> = offset.iter().map(|c| c.as_slice()).collect();
    if let Some((ca, ea, cb, eb)) = find_crossing(&contours) {
        return Err(Error::InvalidEdgeTreatment(format!(
            "offset of {} makes edge {} of loop {} cross edge {} of loop {}",
            size, ea, ca, eb, cb
        )));
    }

    if let Some((outer, holes)) = offset.split_first() {
        for (h, hole) in holes.iter().enumerate() {
            if !hole.iter().all(|p| point_in_contour(p, outer)) {
                return Err(Error::InvalidEdgeTreatment(format!(
                    "offset of {} pushes hole {} outside the outer loop",
                    size, h
                )));
            }
            for (o, other) in holes.iter().enumerate() {
                if o != h && hole.iter().any(|p| point_in_contour(p, other)) {
                    return Err(Error::InvalidEdgeTreatment(format!(
                        "offset of {} makes hole {} overlap hole {}",
                        size, h, o
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(half: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(-half, -half),
            Point2::new(half, -half),
            Point2::new(half, half),
            Point2::new(-half, half),
        ]
    }

    #[test]
    fn test_offset_shrinks_ccw() {
        let moved = offset_contour(&square(1.0), 0.1);
        let d = 0.1 / 2f64.sqrt();
        assert_relative_eq!(moved[0], Point2::new(-1.0 + d, -1.0 + d), epsilon = 1e-12);
        assert!(signed_area(&moved) < 4.0);
    }

    #[test]
    fn test_offset_grows_cw() {
        let cw: Vec<_> = square(1.0).into_iter().rev().collect();
        let moved = offset_contour(&cw, 0.1);
        assert!(signed_area(&moved).abs() > 4.0);
    }

    #[test]
    fn test_straight_run_moves_perpendicular() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let moved = offset_contour(&pts, 0.2);
        assert_relative_eq!(moved[1], Point2::new(1.0, 0.2), epsilon = 1e-12);
    }

    #[test]
    fn test_validate_accepts_small_offset() {
        let outer = square(1.0);
        let hole = square(0.3);
        let raw: Vec<&[Point2<f64>]> = vec![outer.as_slice(), hole.as_slice()];
        let offsets = vec![offset_contour(&outer, 0.05), offset_contour(&hole, -0.05)];
        assert!(validate_offsets(&raw, &offsets, 0.05).is_ok());
    }

    #[test]
    fn test_validate_rejects_collapse() {
        let outer = square(1.0);
        let raw: Vec<&[Point2<f64>]> = vec![outer.as_slice()];
        let offsets = vec![offset_contour(&outer, 1.5)];
        assert!(matches!(
            validate_offsets(&raw, &offsets, 1.5),
            Err(Error::InvalidEdgeTreatment(_))
        ));
    }

    #[test]
    fn test_validate_rejects_hole_escaping() {
        let outer = square(1.0);
        let hole = square(0.9);
        let raw: Vec<&[Point2<f64>]> = vec![outer.as_slice(), hole.as_slice()];
        let offsets = vec![offset_contour(&outer, 0.2), offset_contour(&hole, -0.2)];
        assert!(matches!(
            validate_offsets(&raw, &offsets, 0.2),
            Err(Error::InvalidEdgeTreatment(_))
        ));
    }

    #[test]
    fn test_validate_accepts_tiny_loops() {
        let outer = square(1e-6);
        let hole = square(3e-7);
        let raw: Vec<&[Point2<f64>]> = vec![outer.as_slice(), hole.as_slice()];
        let offsets = vec![offset_contour(&outer, 5e-8), offset_contour(&hole, -5e-8)];
        assert!(validate_offsets(&raw, &offsets, 5e-8).is_ok());
    }
}
