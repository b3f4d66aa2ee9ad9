// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Small 2D/3D helpers shared by the generators
//!
//! Contours are plain point slices. Positive signed area means
//! counter-clockwise winding.

use nalgebra::{Point2, Point3, Unit, Vector2, Vector3};

/// Tolerance for degenerate lengths and areas
pub const EPSILON: f64 = 1e-10;

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Signed area of a single triangle
#[inline]
pub fn triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    0.5 * (b - a).perp(&(c - a))
}

/// Ensure contour has counter-clockwise winding (positive area)
///
/// Returns the contour and whether it was reversed.
pub fn ensure_ccw(contour: &[Point2<f64>]) -> (Vec<Point2<f64>>, bool) {
    if signed_area(contour) < 0.0 {
        (contour.iter().rev().cloned().collect(), true)
    } else {
        (contour.to_vec(), false)
    }
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    if contour.is_empty() {
        return None;
    }

    let mut min = contour[0];
    let mut max = contour[0];

    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// True when segments `a0-a1` and `b0-b1` cross at a single interior point
///
/// Touching endpoints and collinear overlaps do not count.
pub fn segments_cross(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
) -> bool {
    let d1 = (a1 - a0).perp(&(b0 - a0));
    let d2 = (a1 - a0).perp(&(b1 - a0));
    let d3 = (b1 - b0).perp(&(a0 - b0));
    let d4 = (b1 - b0).perp(&(a1 - b0));

    let eps = EPSILON * EPSILON;
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

/// Find the first pair of edges that cross between (or within) closed contours
///
/// Returns `(contour_a, edge_a, contour_b, edge_b)`.
pub fn find_crossing(contours: &[&[Point2<f64>]]) -> Option<(usize, usize, usize, usize)> {
    let edges: Vec<(usize, usize, Point2<f64>, Point2<f64>)> = contours
        .iter()
        .enumerate()
        .flat_map(|(c, pts)| {
            let n = pts.len();
            (0..n).map(move |i| (c, i, pts[i], pts[(i + 1) % n]))
        })
        .collect();

    for (i, a) in edges.iter().enumerate() {
        for b in &edges[i + 1..] {
            if segments_cross(&a.2, &a.3, &b.2, &b.3) {
                return Some((a.0, a.1, b.0, b.1));
            }
        }
    }
    None
}

/// Average of the points
pub fn centroid_2d(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / points.len() as f64)
}

/// Linear interpolation between two points, exact at both ends
#[inline]
pub fn lerp_2d(a: &Point2<f64>, b: &Point2<f64>, t: f64) -> Point2<f64> {
    Point2::from(a.coords * (1.0 - t) + b.coords * t)
}

/// Unit tangent of a profile polyline at point `i`
///
/// Central difference in the interior, one-sided at the ends of open
/// profiles, wrapping for closed ones.
pub fn profile_tangent(points: &[Point2<f64>], i: usize, closed: bool) -> Vector2<f64> {
    let n = points.len();
    if n < 2 {
        return Vector2::y();
    }

    let (prev, next) = if closed {
        ((i + n - 1) % n, (i + 1) % n)
    } else {
        (i.saturating_sub(1), (i + 1).min(n - 1))
    };

    (points[next] - points[prev])
        .try_normalize(EPSILON)
        .unwrap_or_else(Vector2::y)
}

/// Right-hand normal of a 2D direction: `(t.y, -t.x)`
#[inline]
pub fn normal_2d(tangent: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(tangent.y, -tangent.x)
}

/// Spherical interpolation between two unit normals
///
/// Falls back to a normalized linear blend when the inputs are opposite or
/// degenerate.
pub fn slerp_normal(a: &Vector3<f64>, b: &Vector3<f64>, t: f64) -> Vector3<f64> {
    if let (Some(ua), Some(ub)) = (Unit::try_new(*a, EPSILON), Unit::try_new(*b, EPSILON)) {
        if let Some(n) = ua.try_slerp(&ub, t, 1e-9) {
            return n.into_inner();
        }
    }

    (a * (1.0 - t) + b * t)
        .try_normalize(EPSILON)
        .unwrap_or_else(Vector3::z)
}

/// Calculate the normal of a polygon from its vertices (Newell's method)
///
/// Degenerate polygons get `(0, 0, 1)`.
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    try_polygon_normal(points).unwrap_or_else(Vector3::z)
}

/// Unit Newell normal, `None` when the enclosed area is negligible for the
/// polygon's size
pub fn try_polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let first = points.first()?;
    let (min, max) = points.iter().fold((*first, *first), |(lo, hi), p| {
        (lo.inf(p), hi.sup(p))
    });
    let extent = (max - min).amax();
    let min_norm = (EPSILON * extent * extent).max(f64::MIN_POSITIVE);
    polygon_normal_raw(points).try_normalize(min_norm)
}

/// Unnormalized Newell normal; zero for degenerate polygons
pub fn polygon_normal_raw(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();
    if n < 3 {
        return normal;
    }

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = square();
        assert_relative_eq!(signed_area(&ccw), 4.0);

        let (fixed, reversed) = ensure_ccw(&ccw.iter().rev().cloned().collect::<Vec<_>>());
        assert!(reversed);
        assert_relative_eq!(signed_area(&fixed), 4.0);
    }

    #[test]
    fn test_point_in_contour() {
        let sq = square();
        assert!(point_in_contour(&Point2::new(1.0, 1.0), &sq));
        assert!(!point_in_contour(&Point2::new(3.0, 1.0), &sq));
    }

    #[test]
    fn test_segments_cross() {
        let a0 = Point2::new(0.0, 0.0);
        let a1 = Point2::new(2.0, 2.0);
        assert!(segments_cross(&a0, &a1, &Point2::new(0.0, 2.0), &Point2::new(2.0, 0.0)));
        // Shared endpoint is not a crossing
        assert!(!segments_cross(&a0, &a1, &a1, &Point2::new(3.0, 0.0)));
    }

    #[test]
    fn test_find_crossing_bowtie() {
        let bowtie = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(find_crossing(&[&bowtie]).is_some());
        assert!(find_crossing(&[&square()]).is_none());
    }

    #[test]
    fn test_profile_tangent_ends() {
        let pts = vec![Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 1.0)];
        assert_relative_eq!(profile_tangent(&pts, 0, false), Vector2::y());
        assert_relative_eq!(profile_tangent(&pts, 2, false), Vector2::x());

        let mid = profile_tangent(&pts, 1, false);
        assert_relative_eq!(mid, Vector2::new(1.0, 1.0).normalize());
    }

    #[test]
    fn test_slerp_normal_endpoints() {
        let a = Vector3::x();
        let b = Vector3::z();
        assert_relative_eq!(slerp_normal(&a, &b, 0.0), a, epsilon = 1e-12);
        assert_relative_eq!(slerp_normal(&a, &b, 1.0), b, epsilon = 1e-12);
        let mid = slerp_normal(&a, &b, 0.5);
        assert_relative_eq!(mid.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mid.x, mid.z, epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_normal() {
        let quad = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert_relative_eq!(polygon_normal(&quad), Vector3::z());

        let line = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        assert_relative_eq!(polygon_normal(&line), Vector3::z());

        let tiny = quad.map(|p| Point3::from(p.coords * 1e-7));
        assert_relative_eq!(polygon_normal(&tiny), Vector3::z());
        let tilted = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-6, 0.0, 0.0),
            Point3::new(1e-6, 0.0, 1e-6),
        ];
        assert_relative_eq!(polygon_normal(&tilted), -Vector3::y(), epsilon = 1e-12);
    }
}
