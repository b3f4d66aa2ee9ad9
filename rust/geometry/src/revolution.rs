// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Revolution and spiral sweeps
//!
//! A profile of `(radius, height)` points is swept around the Y axis. Ring
//! `r` sits at angle `r * 360° / radial_segments`; a spiral keeps going for
//! `turns` revolutions while lifting each ring by `pitch / radial_segments`.
//!
//! Simple revolutions of open profiles can be capped with flat discs at
//! either end, optionally rounded over. Spirals are capped across the swept
//! cross-section at the start and end of the sweep instead.

use std::f64::consts::TAU;

use nalgebra::{Point2, Point3, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::primitives::{
    centroid_2d, contour_bounds, ensure_ccw, normal_2d, profile_tangent, triangle_area, EPSILON,
};
use crate::profile::Profile;
use crate::rounding::{emit_rounding, DepthAxis, EdgeTreatment, RoundingEdge, RoundingProfile};
use crate::triangulation::{triangulate_polygon, EarcutTriangulator, Triangulator};

/// Default number of steps per full turn
pub const DEFAULT_RADIAL_SEGMENTS: u32 = 24;

/// Helical continuation of a revolution
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiralParams {
    pub turns: u32,
    /// Height gained per full turn
    pub pitch: f64,
}

/// Revolution generator input
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RevolutionParams {
    pub profile: Profile,
    #[cfg_attr(feature = "serde", serde(default = "default_radial_segments"))]
    pub radial_segments: u32,
    /// Cap the last profile point (or the end of a spiral)
    #[cfg_attr(feature = "serde", serde(default))]
    pub close_top: bool,
    /// Cap the first profile point (or the start of a spiral)
    #[cfg_attr(feature = "serde", serde(default))]
    pub close_bottom: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spiral: Option<SpiralParams>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub top_rounding: EdgeTreatment,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bottom_rounding: EdgeTreatment,
}

#[cfg(feature = "serde")]
fn default_radial_segments() -> u32 {
    DEFAULT_RADIAL_SEGMENTS
}

impl RevolutionParams {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            radial_segments: DEFAULT_RADIAL_SEGMENTS,
            close_top: false,
            close_bottom: false,
            spiral: None,
            top_rounding: EdgeTreatment::NONE,
            bottom_rounding: EdgeTreatment::NONE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.profile.validate()?;

        if self.radial_segments < 3 {
            return Err(Error::InvalidParameters(format!(
                "radial_segments must be at least 3, got {}",
                self.radial_segments
            )));
        }

        if let Some(spiral) = &self.spiral {
            if spiral.turns == 0 {
                return Err(Error::InvalidParameters(
                    "spiral needs at least one turn".to_string(),
                ));
            }
            if self.radial_segments.checked_mul(spiral.turns).is_none() {
                return Err(Error::InvalidParameters(format!(
                    "{} turns of {} segments is too many sweep steps",
                    spiral.turns, self.radial_segments
                )));
            }
            if !spiral.pitch.is_finite() {
                return Err(Error::InvalidParameters(format!(
                    "spiral pitch must be finite, got {}",
                    spiral.pitch
                )));
            }
        }

        self.top_rounding.validate("top rounding")?;
        self.bottom_rounding.validate("bottom rounding")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Bottom,
    Top,
}

impl End {
    fn name(self) -> &'static str {
        match self {
            End::Bottom => "bottom",
            End::Top => "top",
        }
    }

    fn face_normal(self) -> Vector3<f64> {
        match self {
            End::Bottom => -Vector3::y(),
            End::Top => Vector3::y(),
        }
    }
}

/// Rounded corner between the wall and an end cap
#[derive(Debug, Clone, Copy)]
struct CornerPlan {
    size: f64,
    segments: u32,
    /// Height of the flat cap (the unmodified end point)
    cap_height: f64,
}

/// Revolve (or spiral) a profile into a mesh
pub fn generate_revolution(params: &RevolutionParams) -> Result<Mesh> {
    generate_revolution_with(params, &EarcutTriangulator::default())
}

/// [`generate_revolution`] with a caller-supplied triangulator for spiral caps
pub fn generate_revolution_with(
    params: &RevolutionParams,
    triangulator: &dyn Triangulator,
) -> Result<Mesh> {
    params.validate()?;

    let closed = params.profile.is_closed();
    let mut points = if closed {
        ensure_ccw(&params.profile.points).0
    } else {
        params.profile.points.clone()
    };

    let radial = params.radial_segments;
    let (turns, pitch) = params
        .spiral
        .map(|s| (s.turns, s.pitch))
        .unwrap_or((1, 0.0));
    let steps = radial * turns;
    let simple_open = params.spiral.is_none() && !closed;

    let rounding_requested =
        params.top_rounding.is_active() || params.bottom_rounding.is_active();
    if rounding_requested && !simple_open {
        tracing::debug!(
            closed,
            spiral = params.spiral.is_some(),
            "corner rounding only applies to capped open revolutions, ignoring"
        );
    }

    let bottom = if simple_open && params.close_bottom {
        plan_corner(&points, End::Bottom, &params.bottom_rounding)?
    } else {
        None
    };
    let top = if simple_open && params.close_top {
        plan_corner(&points, End::Top, &params.top_rounding)?
    } else {
        None
    };

    let last = points.len() - 1;
    if let (Some(b), Some(t)) = (&bottom, &top) {
        if last == 1 && (t.cap_height - t.size) - (b.cap_height + b.size) <= EPSILON {
            return Err(Error::InvalidEdgeTreatment(format!(
                "top and bottom rounding ({} + {}) do not fit the profile height",
                t.size, b.size
            )));
        }
    }
    if let Some(b) = &bottom {
        points[0].y += b.size;
    }
    if let Some(t) = &top {
        points[last].y -= t.size;
    }

    let n = points.len();
    let normals: Vec<Vector2<f64>> = (0..n)
        .map(|j| normal_2d(&profile_tangent(&points, j, closed)))
        .collect();
    let vs = arc_length_params(&points, closed);

    let mut mesh = Mesh::with_capacity((steps as usize + 1) * n, steps as usize * n);

    // Rings of vertex indices, one per sweep step
    let mut rings: Vec<Vec<u32>> = Vec::with_capacity(steps as usize + 1);
    for r in 0..=steps {
        let (angle, lift) = ring_frame(r, radial, pitch);
        let (sin, cos) = angle.sin_cos();
        let u = r as f64 / steps as f64;

        let ring = points
            .iter()
            .zip(&normals)
            .zip(&vs)
            .map(|((p, n2), &v)| {
                mesh.add_vertex(
                    Point3::new(cos * p.x, p.y + lift, sin * p.x),
                    Point2::new(u, v),
                    Vector3::new(cos * n2.x, n2.y, sin * n2.x),
                )
            })
            .collect();
        rings.push(ring);
    }

    let edges = if closed { n } else { n - 1 };
    for r in 0..steps as usize {
        for j in 0..edges {
            let j1 = (j + 1) % n;
            mesh.add_quad(rings[r][j], rings[r][j1], rings[r + 1][j1], rings[r + 1][j]);
        }
    }

    if simple_open {
        if params.close_bottom {
            emit_end_cap(&mut mesh, &points, &normals, End::Bottom, bottom, radial);
        }
        if params.close_top {
            emit_end_cap(&mut mesh, &points, &normals, End::Top, top, radial);
        }
    } else if params.spiral.is_some() {
        if params.close_bottom {
            let (angle, lift) = ring_frame(0, radial, pitch);
            emit_sweep_cap(&mut mesh, triangulator, &points, closed, angle, lift, false)?;
        }
        if params.close_top {
            let (angle, lift) = ring_frame(steps, radial, pitch);
            emit_sweep_cap(&mut mesh, triangulator, &points, closed, angle, lift, true)?;
        }
    }

    tracing::debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        steps,
        "revolution generated"
    );

    Ok(mesh)
}

/// Angle and vertical lift of ring `r`
#[inline]
fn ring_frame(r: u32, radial: u32, pitch: f64) -> (f64, f64) {
    // Reduce before scaling so every turn lands on identical angles
    let angle = TAU * (r % radial) as f64 / radial as f64;
    let lift = pitch * r as f64 / radial as f64;
    (angle, lift)
}

/// Normalized cumulative arc length for each profile point
fn arc_length_params(points: &[Point2<f64>], closed: bool) -> Vec<f64> {
    let mut acc = 0.0;
    let mut params = Vec::with_capacity(points.len());
    params.push(0.0);
    for w in points.windows(2) {
        acc += (w[1] - w[0]).norm();
        params.push(acc);
    }
    let total = if closed {
        acc + (points[0] - points[points.len() - 1]).norm()
    } else {
        acc
    };

    if total > EPSILON {
        params.iter_mut().for_each(|v| *v /= total);
    }
    params
}

fn plan_corner(
    points: &[Point2<f64>],
    end: End,
    treatment: &EdgeTreatment,
) -> Result<Option<CornerPlan>> {
    if !treatment.is_active() {
        return Ok(None);
    }

    let n = points.len();
    let (idx, adj) = match end {
        End::Bottom => (0, 1),
        End::Top => (n - 1, n - 2),
    };
    let p = points[idx];

    if p.x <= EPSILON {
        tracing::debug!(end = end.name(), "end lies on the axis, no cap to round");
        return Ok(None);
    }

    let size = treatment.size;
    if size >= p.x {
        return Err(Error::InvalidEdgeTreatment(format!(
            "{} rounding size {} must be smaller than the end radius {}",
            end.name(),
            size,
            p.x
        )));
    }

    let extremal = match end {
        End::Bottom => points.iter().all(|q| q.y >= p.y),
        End::Top => points.iter().all(|q| q.y <= p.y),
    };
    let rise = (p.y - points[adj].y).abs();
    if !extremal || rise <= size {
        return Err(Error::InvalidEdgeTreatment(format!(
            "{} rounding size {} needs an extremal end with more than that much wall, found {}",
            end.name(),
            size,
            rise
        )));
    }

    Ok(Some(CornerPlan {
        size,
        segments: treatment.segments,
        cap_height: p.y,
    }))
}

/// Flat disc over an end of a simple revolution, with an optional rounded rim
fn emit_end_cap(
    mesh: &mut Mesh,
    points: &[Point2<f64>],
    normals: &[Vector2<f64>],
    end: End,
    corner: Option<CornerPlan>,
    radial: u32,
) {
    let idx = match end {
        End::Bottom => 0,
        End::Top => points.len() - 1,
    };
    let p = points[idx];
    let radius = p.x;
    if radius <= EPSILON {
        tracing::debug!(end = end.name(), "end lies on the axis, cap suppressed");
        return;
    }

    let face_normal = end.face_normal();
    let planar_uv = |r: f64, angle: f64| {
        Point2::new(
            0.5 + 0.5 * (r / radius) * angle.cos(),
            0.5 + 0.5 * (r / radius) * angle.sin(),
        )
    };
    let on_circle = |r: f64, angle: f64| Point2::new(r * angle.cos(), r * angle.sin());

    let (cap_radius, cap_height) = match &corner {
        Some(c) => {
            mesh.set_material(2);
            let inner = radius - c.size;
            let side = normals[idx];
            for r in 0..radial {
                let a = [r, r + 1].map(|k| ring_frame(k, radial, 0.0).0);
                let side_normals = a.map(|angle| {
                    let (sin, cos) = angle.sin_cos();
                    Vector3::new(cos * side.x, side.y, sin * side.x)
                });
                let edge = RoundingEdge {
                    outer: a.map(|angle| on_circle(radius, angle)),
                    inner: a.map(|angle| on_circle(inner, angle)),
                    outer_depth: p.y,
                    inner_depth: c.cap_height,
                    outer_uv: a.map(|angle| planar_uv(radius, angle)),
                    inner_uv: a.map(|angle| planar_uv(inner, angle)),
                    side_normals,
                    face_normal,
                    segments: c.segments,
                    profile: RoundingProfile::Convex,
                    axis: DepthAxis::Y,
                    flip: end == End::Bottom,
                };
                emit_rounding(&edge, mesh);
            }
            (inner, c.cap_height)
        }
        None => (radius, p.y),
    };

    mesh.set_material(0);
    let center = mesh.add_vertex(
        Point3::new(0.0, cap_height, 0.0),
        Point2::new(0.5, 0.5),
        face_normal,
    );
    let rim: Vec<u32> = (0..radial)
        .map(|r| {
            let angle = ring_frame(r, radial, 0.0).0;
            let q = on_circle(cap_radius, angle);
            mesh.add_vertex(
                Point3::new(q.x, cap_height, q.y),
                planar_uv(cap_radius, angle),
                face_normal,
            )
        })
        .collect();

    for r in 0..rim.len() {
        let (a, b) = (rim[r], rim[(r + 1) % rim.len()]);
        match end {
            End::Top => mesh.add_triangle(center, b, a),
            End::Bottom => mesh.add_triangle(center, a, b),
        }
    }
}

/// Cap across the swept cross-section at the start or end of a spiral
fn emit_sweep_cap(
    mesh: &mut Mesh,
    triangulator: &dyn Triangulator,
    points: &[Point2<f64>],
    closed: bool,
    angle: f64,
    lift: f64,
    at_end: bool,
) -> Result<()> {
    let (cap_points, triangles) = if closed {
        (points.to_vec(), triangulate_polygon(triangulator, points, &[])?)
    } else {
        fan_around_centroid(points)
    };

    if triangles.is_empty() {
        tracing::debug!(at_end, "profile encloses no area, sweep cap skipped");
        return Ok(());
    }

    let (sin, cos) = angle.sin_cos();
    let along = Vector3::new(-sin, 0.0, cos);
    let normal = if at_end { along } else { -along };

    let (min, max) = contour_bounds(&cap_points).unwrap_or((Point2::origin(), Point2::origin()));
    let size = Vector2::new((max.x - min.x).max(EPSILON), (max.y - min.y).max(EPSILON));

    mesh.set_material(0);
    let ids: Vec<u32> = cap_points
        .iter()
        .map(|p| {
            mesh.add_vertex(
                Point3::new(cos * p.x, p.y + lift, sin * p.x),
                Point2::new((p.x - min.x) / size.x, (p.y - min.y) / size.y),
                normal,
            )
        })
        .collect();

    // Counter-clockwise in the profile plane faces along the sweep
    for [a, b, c] in triangles {
        if at_end {
            mesh.add_triangle(ids[a], ids[b], ids[c]);
        } else {
            mesh.add_triangle(ids[a], ids[c], ids[b]);
        }
    }
    Ok(())
}

/// Fan an open polyline (closed by its last edge) around its centroid
///
/// The centroid is appended as the last point. Triangles come back
/// counter-clockwise; degenerate ones are dropped.
fn fan_around_centroid(points: &[Point2<f64>]) -> (Vec<Point2<f64>>, Vec<[usize; 3]>) {
    let n = points.len();
    let mut all = points.to_vec();
    all.push(centroid_2d(points));

    let (min, max) = contour_bounds(points).unwrap_or((Point2::origin(), Point2::origin()));
    let extent = (max.x - min.x).max(max.y - min.y);
    let min_area = EPSILON * extent * extent;

    let triangles = (0..n)
        .filter_map(|i| {
            let j = (i + 1) % n;
            let area = triangle_area(&all[n], &all[i], &all[j]);
            if area.abs() <= min_area {
                None
            } else if area > 0.0 {
                Some([n, i, j])
            } else {
                Some([n, j, i])
            }
        })
        .collect();

    (all, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cylinder_profile() -> Profile {
        Profile::open(vec![Point2::new(1.0, 0.0), Point2::new(1.0, 2.0)])
    }

    #[test]
    fn test_ring_frame_closes_exactly() {
        let (a0, _) = ring_frame(0, 16, 0.0);
        let (a16, _) = ring_frame(16, 16, 0.0);
        assert_eq!(a0, a16);

        let (_, lift) = ring_frame(24, 12, 0.5);
        assert_relative_eq!(lift, 1.0);
    }

    #[test]
    fn test_arc_length_params() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(3.0, 1.0)];
        let v = arc_length_params(&pts, false);
        assert_relative_eq!(v[1], 0.75);
        assert_relative_eq!(v[2], 1.0);
    }

    #[test]
    fn test_cylinder_counts() {
        let params = RevolutionParams {
            radial_segments: 8,
            ..RevolutionParams::new(cylinder_profile())
        };
        let mesh = generate_revolution(&params).unwrap();
        assert_eq!(mesh.vertex_count(), 2 * 9);
        assert_eq!(mesh.face_count(), 8);
    }

    #[test]
    fn test_cylinder_normals_point_outward() {
        let params = RevolutionParams {
            radial_segments: 12,
            ..RevolutionParams::new(cylinder_profile())
        };
        let mesh = generate_revolution(&params).unwrap();
        for v in &mesh.vertices {
            let radial = Vector3::new(v.position.x, 0.0, v.position.z).normalize();
            assert_relative_eq!(v.normal, radial, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_caps_add_fans() {
        let params = RevolutionParams {
            radial_segments: 10,
            close_top: true,
            close_bottom: true,
            ..RevolutionParams::new(cylinder_profile())
        };
        let mesh = generate_revolution(&params).unwrap();
        // 10 side quads plus two fans of 10 triangles
        assert_eq!(mesh.face_count(), 30);
        let top_center = mesh
            .vertices
            .iter()
            .find(|v| v.position == Point3::new(0.0, 2.0, 0.0))
            .unwrap();
        assert_eq!(top_center.normal, Vector3::y());
    }

    #[test]
    fn test_cap_suppressed_on_axis() {
        let profile = Profile::open(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        let params = RevolutionParams {
            radial_segments: 6,
            close_bottom: true,
            ..RevolutionParams::new(profile)
        };
        let mesh = generate_revolution(&params).unwrap();
        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn test_fan_around_centroid_orientation() {
        let pts = vec![Point2::new(2.0, 0.0), Point2::new(3.0, 1.0), Point2::new(2.0, 2.0)];
        let (all, tris) = fan_around_centroid(&pts);
        assert_eq!(all.len(), 4);
        assert_eq!(tris.len(), 3);
        for t in tris {
            assert!(triangle_area(&all[t[0]], &all[t[1]], &all[t[2]]) > 0.0);
        }
    }

    #[test]
    fn test_rounding_moves_end_points() {
        let params = RevolutionParams {
            radial_segments: 8,
            close_top: true,
            top_rounding: EdgeTreatment::round(3, 0.25, Default::default()),
            ..RevolutionParams::new(cylinder_profile())
        };
        let mesh = generate_revolution(&params).unwrap();

        let (_, max) = mesh.bounds();
        assert_relative_eq!(max.y, 2.0);
        // Wall stops below the rounded rim
        let wall_top = mesh.vertices[1].position.y;
        assert_relative_eq!(wall_top, 1.75);
    }

    #[test]
    fn test_rounding_rejects_oversize() {
        let params = RevolutionParams {
            close_bottom: true,
            bottom_rounding: EdgeTreatment::bevel(1.5),
            ..RevolutionParams::new(cylinder_profile())
        };
        assert!(matches!(
            generate_revolution(&params),
            Err(Error::InvalidEdgeTreatment(_))
        ));
    }

    #[test]
    fn test_spiral_step_overflow_rejected() {
        let params = RevolutionParams {
            radial_segments: 1 << 16,
            spiral: Some(SpiralParams {
                turns: 1 << 16,
                pitch: 1.0,
            }),
            ..RevolutionParams::new(cylinder_profile())
        };
        assert!(matches!(
            generate_revolution(&params),
            Err(Error::InvalidParameters(_))
        ));
    }
}
