// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge and corner rounding
//!
//! A rounded edge is a strip of quads joining an *outer* contour pair at one
//! depth to an *inner* contour pair at another depth. Row `k` of the strip
//! sits at angle `k / segments * 90°` along a quarter circle:
//!
//! - [`RoundingProfile::Convex`] bulges outward: the planar offset follows
//!   `1 - cos` and the depth follows `sin`, with normals turning from the
//!   side wall to the face.
//! - [`RoundingProfile::Concave`] is a cove: the planar offset follows `sin`
//!   and the depth follows `1 - cos`, with normals turning from the reversed
//!   face to the side wall.
//!
//! A single segment is a flat bevel with one averaged normal.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Point2, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::primitives::{lerp_2d, slerp_normal, EPSILON};

/// Which side of the corner the treatment removes material from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgeMode {
    /// The face shrinks and the edge is rounded over
    #[default]
    Inward,
    /// The wall steps in and the edge is hollowed into a cove
    Outward,
}

impl EdgeMode {
    #[inline]
    pub fn profile(self) -> RoundingProfile {
        match self {
            EdgeMode::Inward => RoundingProfile::Convex,
            EdgeMode::Outward => RoundingProfile::Concave,
        }
    }
}

/// Bevel or round applied to the edges of a face
///
/// `segments == 0` or `size == 0` means no treatment; one segment is a flat
/// bevel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EdgeTreatment {
    pub segments: u32,
    pub size: f64,
    pub mode: EdgeMode,
}

impl EdgeTreatment {
    pub const NONE: EdgeTreatment = EdgeTreatment {
        segments: 0,
        size: 0.0,
        mode: EdgeMode::Inward,
    };

    /// Flat 45° bevel
    pub fn bevel(size: f64) -> Self {
        Self {
            segments: 1,
            size,
            mode: EdgeMode::Inward,
        }
    }

    pub fn round(segments: u32, size: f64, mode: EdgeMode) -> Self {
        Self {
            segments,
            size,
            mode,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.segments > 0 && self.size > 0.0
    }

    /// Size actually consumed along the depth axis
    #[inline]
    pub fn depth(&self) -> f64 {
        if self.is_active() {
            self.size
        } else {
            0.0
        }
    }

    pub fn validate(&self, what: &str) -> Result<()> {
        if !self.size.is_finite() || self.size < 0.0 {
            return Err(Error::InvalidEdgeTreatment(format!(
                "{} size must be finite and non-negative, got {}",
                what, self.size
            )));
        }
        Ok(())
    }
}

/// Shape of the quarter-circle blend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingProfile {
    Convex,
    Concave,
}

impl RoundingProfile {
    /// `(planar, depth)` blend factors at parameter `t` in `[0, 1]`
    ///
    /// Both are exactly 0 at `t = 0` and exactly 1 at `t = 1`.
    pub fn blend(self, t: f64) -> (f64, f64) {
        if t <= 0.0 {
            return (0.0, 0.0);
        }
        if t >= 1.0 {
            return (1.0, 1.0);
        }
        let angle = t * FRAC_PI_2;
        match self {
            RoundingProfile::Convex => (1.0 - angle.cos(), angle.sin()),
            RoundingProfile::Concave => (angle.sin(), 1.0 - angle.cos()),
        }
    }
}

/// Axis the depth of a rounding strip runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthAxis {
    /// Contours in XY, depth along Z (extrusions)
    #[default]
    Z,
    /// Contours in XZ, depth along Y (revolution caps)
    Y,
}

impl DepthAxis {
    #[inline]
    pub fn lift(self, p: &Point2<f64>, depth: f64) -> Point3<f64> {
        match self {
            DepthAxis::Z => Point3::new(p.x, p.y, depth),
            DepthAxis::Y => Point3::new(p.x, depth, p.y),
        }
    }

    /// True when the lift swaps handedness
    #[inline]
    fn mirrors(self) -> bool {
        matches!(self, DepthAxis::Y)
    }
}

/// One edge of a contour to be rounded
#[derive(Debug, Clone, PartialEq)]
pub struct RoundingEdge {
    /// Edge endpoints on the original contour
    pub outer: [Point2<f64>; 2],
    /// Matching endpoints on the offset contour
    pub inner: [Point2<f64>; 2],
    pub outer_depth: f64,
    pub inner_depth: f64,
    pub outer_uv: [Point2<f64>; 2],
    pub inner_uv: [Point2<f64>; 2],
    /// Wall normals at the two endpoints
    pub side_normals: [Vector3<f64>; 2],
    pub face_normal: Vector3<f64>,
    pub segments: u32,
    pub profile: RoundingProfile,
    pub axis: DepthAxis,
    /// Reverse quad winding
    pub flip: bool,
}

/// A row of the rounding strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundingRow {
    pub points: [Point3<f64>; 2],
    pub uvs: [Point2<f64>; 2],
    pub normals: [Vector3<f64>; 2],
}

/// Compute the `segments + 1` rows of a rounding strip
///
/// Row 0 lies exactly on the outer pair at `outer_depth`, the last row
/// exactly on the inner pair at `inner_depth`.
///
/// Concave normals start from `-face_normal`: the cove begins under the lip
/// of the face and turns to the side normal where it meets the wall.
pub fn rounding_rows(edge: &RoundingEdge) -> Vec<RoundingRow> {
    if edge.segments == 0 {
        return Vec::new();
    }

    let (start, end): ([Vector3<f64>; 2], [Vector3<f64>; 2]) = match edge.profile {
        RoundingProfile::Convex => (edge.side_normals, [edge.face_normal; 2]),
        RoundingProfile::Concave => ([-edge.face_normal; 2], edge.side_normals),
    };

    let bevel_normals = if edge.segments == 1 {
        Some([0, 1].map(|j| {
            (start[j] + end[j])
                .try_normalize(EPSILON)
                .unwrap_or(edge.face_normal)
        }))
    } else {
        None
    };

    (0..=edge.segments)
        .map(|k| {
            let t = k as f64 / edge.segments as f64;
            let (planar, depth_t) = edge.profile.blend(t);
            let depth = edge.outer_depth * (1.0 - depth_t) + edge.inner_depth * depth_t;

            let points = [0, 1].map(|j| {
                edge.axis
                    .lift(&lerp_2d(&edge.outer[j], &edge.inner[j], planar), depth)
            });
            let uvs = [0, 1].map(|j| lerp_2d(&edge.outer_uv[j], &edge.inner_uv[j], t));
            let normals = match bevel_normals {
                Some(n) => n,
                None => [0, 1].map(|j| slerp_normal(&start[j], &end[j], t)),
            };

            RoundingRow {
                points,
                uvs,
                normals,
            }
        })
        .collect()
}

/// Emit the strip for `edge` into `mesh` under the current material slot
pub fn emit_rounding(edge: &RoundingEdge, mesh: &mut Mesh) {
    let flip = edge.flip != edge.axis.mirrors();
    let mut prev: Option<[u32; 2]> = None;

    for row in rounding_rows(edge) {
        let ids = [0, 1].map(|j| mesh.add_vertex(row.points[j], row.uvs[j], row.normals[j]));
        if let Some(p) = prev {
            if flip {
                mesh.add_quad(p[0], ids[0], ids[1], p[1]);
            } else {
                mesh.add_quad(p[0], p[1], ids[1], ids[0]);
            }
        }
        prev = Some(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Top edge of a wall along +x: outer at y = 0 (depth 0), inner at y = 1 (depth 1)
    fn edge(segments: u32, profile: RoundingProfile) -> RoundingEdge {
        RoundingEdge {
            outer: [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            inner: [Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)],
            outer_depth: 0.0,
            inner_depth: 1.0,
            outer_uv: [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            inner_uv: [Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)],
            side_normals: [-Vector3::y(); 2],
            face_normal: Vector3::z(),
            segments,
            profile,
            axis: DepthAxis::Z,
            flip: false,
        }
    }

    #[test]
    fn test_rows_hit_both_contours_exactly() {
        for profile in [RoundingProfile::Convex, RoundingProfile::Concave] {
            let e = edge(6, profile);
            let rows = rounding_rows(&e);
            assert_eq!(rows.len(), 7);

            assert_eq!(rows[0].points[0], Point3::new(0.0, 0.0, 0.0));
            assert_eq!(rows[0].points[1], Point3::new(1.0, 0.0, 0.0));
            assert_eq!(rows[6].points[0], Point3::new(0.0, 1.0, 1.0));
            assert_eq!(rows[6].points[1], Point3::new(1.0, 1.0, 1.0));
        }
    }

    #[test]
    fn test_convex_normals_turn_side_to_face() {
        let rows = rounding_rows(&edge(4, RoundingProfile::Convex));
        assert_relative_eq!(rows[0].normals[0], -Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(rows[4].normals[1], Vector3::z(), epsilon = 1e-12);
        let mid = rows[2].normals[0];
        assert_relative_eq!(mid, Vector3::new(0.0, -1.0, 1.0).normalize(), epsilon = 1e-12);
    }

    #[test]
    fn test_concave_starts_against_face() {
        let rows = rounding_rows(&edge(4, RoundingProfile::Concave));
        assert_relative_eq!(rows[0].normals[0], -Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(rows[4].normals[0], -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_convex_bulges_outside_chord() {
        // At 45° the convex arc lies on the wall side of the straight chord
        let rows = rounding_rows(&edge(2, RoundingProfile::Convex));
        let p = rows[1].points[0];
        assert!(p.z > p.y);

        let rows = rounding_rows(&edge(2, RoundingProfile::Concave));
        let p = rows[1].points[0];
        assert!(p.y > p.z);
    }

    #[test]
    fn test_single_segment_is_flat_bevel() {
        let rows = rounding_rows(&edge(1, RoundingProfile::Convex));
        assert_eq!(rows.len(), 2);
        let expected = Vector3::new(0.0, -1.0, 1.0).normalize();
        for row in &rows {
            assert_relative_eq!(row.normals[0], expected, epsilon = 1e-12);
            assert_relative_eq!(row.normals[1], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_emit_winding_matches_normals() {
        for flip in [false, true] {
            let mut e = edge(3, RoundingProfile::Convex);
            e.flip = flip;
            let mut mesh = Mesh::new();
            emit_rounding(&e, &mut mesh);

            assert_eq!(mesh.face_count(), 3);
            for face in &mesh.faces {
                let geometric = mesh.face_normal(face);
                let stored: Vector3<f64> = face
                    .indices
                    .iter()
                    .map(|&i| mesh.vertices[i as usize].normal)
                    .sum();
                // Unflipped order faces -y/+z here
                assert_eq!(geometric.dot(&stored) > 0.0, !flip);
            }
        }
    }

    #[test]
    fn test_zero_segments_emits_nothing() {
        let mut mesh = Mesh::new();
        emit_rounding(&edge(0, RoundingProfile::Convex), &mut mesh);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_treatment_activity() {
        assert!(!EdgeTreatment::NONE.is_active());
        assert!(!EdgeTreatment::round(4, 0.0, EdgeMode::Inward).is_active());
        assert!(EdgeTreatment::bevel(0.1).is_active());
        assert_eq!(EdgeTreatment::round(0, 0.2, EdgeMode::Outward).depth(), 0.0);
        assert!(EdgeTreatment::bevel(-1.0).validate("front").is_err());
    }
}
