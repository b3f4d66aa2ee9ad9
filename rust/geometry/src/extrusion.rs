// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D loop sets to 3D solids
//!
//! The front face sits at `z = -thickness / 2` facing `-Z`, the back face at
//! `z = +thickness / 2` facing `+Z`. Side walls join the two, and an edge
//! treatment on either face inserts a rounding strip between the face and
//! the wall.

use nalgebra::{Point2, Point3, Vector2, Vector3};
use polyforge_core::LoopRole;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::offset::{offset_contour, validate_offsets};
use crate::primitives::{contour_bounds, ensure_ccw, polygon_normal, EPSILON};
use crate::profile::Loop2D;
use crate::rounding::{emit_rounding, DepthAxis, EdgeMode, EdgeTreatment, RoundingEdge};
use crate::triangulation::{triangulate_polygon, validate_polygon, EarcutTriangulator, Triangulator};

/// Material slot of the flat faces
pub const MATERIAL_FACE: u32 = 0;
/// Material slot of the side walls
pub const MATERIAL_WALL: u32 = 1;
/// Material slot of bevels and rounds
pub const MATERIAL_EDGE: u32 = 2;

/// Loop-extrusion generator input
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrusionParams {
    pub loops: Vec<Loop2D>,
    #[cfg_attr(feature = "serde", serde(default = "unit_scale"))]
    pub scale: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset: Vector2<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flip_y: bool,
    pub thickness: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub front: EdgeTreatment,
    #[cfg_attr(feature = "serde", serde(default))]
    pub back: EdgeTreatment,
}

impl ExtrusionParams {
    pub fn new(loops: Vec<Loop2D>, thickness: f64) -> Self {
        Self {
            loops,
            scale: 1.0,
            offset: Vector2::zeros(),
            flip_y: false,
            thickness,
            front: EdgeTreatment::NONE,
            back: EdgeTreatment::NONE,
        }
    }
}

/// Legacy patch input: one flat bevel of `bevel` size on both faces
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatchParams {
    pub loops: Vec<Loop2D>,
    #[cfg_attr(feature = "serde", serde(default = "unit_scale"))]
    pub scale: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset: Vector2<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flip_y: bool,
    pub thickness: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bevel: f64,
}

#[cfg(feature = "serde")]
fn unit_scale() -> f64 {
    1.0
}

/// How offset contours pick their direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetConvention {
    /// Outer loop shrinks, holes grow
    RoleAware,
    /// Left of each loop's given travel direction
    TravelLeft,
}

/// A transformed loop stored counter-clockwise
#[derive(Debug, Clone)]
struct PreparedLoop {
    points: Vec<Point2<f64>>,
    role: LoopRole,
    /// True when the input ran clockwise
    reversed: bool,
}

/// Maps face points into `[0, 1]` over the outer loop's bounding box
#[derive(Debug, Clone, Copy)]
struct UvFrame {
    min: Point2<f64>,
    size: Vector2<f64>,
}

impl UvFrame {
    fn new(outer: &[Point2<f64>]) -> Self {
        let (min, max) = contour_bounds(outer).unwrap_or((Point2::origin(), Point2::origin()));
        Self {
            min,
            size: Vector2::new((max.x - min.x).max(EPSILON), (max.y - min.y).max(EPSILON)),
        }
    }

    #[inline]
    fn map(&self, p: &Point2<f64>) -> Point2<f64> {
        Point2::new((p.x - self.min.x) / self.size.x, (p.y - self.min.y) / self.size.y)
    }
}

/// One face of the solid and its edge treatment
struct Side {
    is_front: bool,
    face_depth: f64,
    treatment: EdgeTreatment,
    /// Offset contour per loop when the treatment is active
    offset: Option<Vec<Vec<Point2<f64>>>>,
}

impl Side {
    fn new(
        is_front: bool,
        face_depth: f64,
        treatment: EdgeTreatment,
        loops: &[PreparedLoop],
        convention: OffsetConvention,
    ) -> Result<Self> {
        let offset = if treatment.is_active() {
            let contours: Vec<Vec<Point2<f64>>> = loops
                .iter()
                .map(|l| {
                    let sign = match convention {
                        OffsetConvention::RoleAware => l.role.sign(),
                        OffsetConvention::TravelLeft if l.reversed => -1.0,
                        OffsetConvention::TravelLeft => 1.0,
                    };
                    offset_contour(&l.points, treatment.size * sign)
                })
                .collect();
            let raw: Vec<&[Point2<f64>]> = loops.iter().map(|l| l.points.as_slice()).collect();
            validate_offsets(&raw, &contours, treatment.size)?;
            Some(contours)
        } else {
            None
        };

        Ok(Self {
            is_front,
            face_depth,
            treatment,
            offset,
        })
    }

    fn normal(&self) -> Vector3<f64> {
        if self.is_front {
            -Vector3::z()
        } else {
            Vector3::z()
        }
    }

    /// Depth at which the side wall starts
    fn wall_depth(&self) -> f64 {
        let inward = if self.is_front { 1.0 } else { -1.0 };
        self.face_depth + inward * self.treatment.depth()
    }

    fn face_contour<'a>(&'a self, loops: &'a [PreparedLoop], k: usize) -> &'a [Point2<f64>] {
        match (&self.offset, self.treatment.mode) {
            (Some(offset), EdgeMode::Inward) => offset[k].as_slice(),
            _ => loops[k].points.as_slice(),
        }
    }

    fn wall_contour<'a>(&'a self, loops: &'a [PreparedLoop], k: usize) -> &'a [Point2<f64>] {
        match (&self.offset, self.treatment.mode) {
            (Some(offset), EdgeMode::Outward) => offset[k].as_slice(),
            _ => loops[k].points.as_slice(),
        }
    }
}

/// Extrude a loop set into a solid with optional edge treatments
pub fn generate_loop_extrusion(params: &ExtrusionParams) -> Result<Mesh> {
    generate_loop_extrusion_with(params, &EarcutTriangulator::default())
}

/// [`generate_loop_extrusion`] with a caller-supplied triangulator
pub fn generate_loop_extrusion_with(
    params: &ExtrusionParams,
    triangulator: &dyn Triangulator,
) -> Result<Mesh> {
    params.front.validate("front treatment")?;
    params.back.validate("back treatment")?;

    let loops = prepare_loops(&params.loops, params.scale, &params.offset, params.flip_y)?;
    build_solid(
        &loops,
        params.thickness,
        params.front,
        params.back,
        OffsetConvention::RoleAware,
        triangulator,
    )
}

/// Extrude a loop set with a flat bevel on both faces
///
/// Each loop is offset to the left of the direction it was given in, so
/// conventionally wound input (outer counter-clockwise, holes clockwise)
/// matches [`generate_loop_extrusion`] with an inward bevel.
pub fn generate_patch(params: &PatchParams) -> Result<Mesh> {
    generate_patch_with(params, &EarcutTriangulator::default())
}

/// [`generate_patch`] with a caller-supplied triangulator
pub fn generate_patch_with(params: &PatchParams, triangulator: &dyn Triangulator) -> Result<Mesh> {
    let bevel = EdgeTreatment::bevel(params.bevel);
    bevel.validate("bevel")?;

    let loops = prepare_loops(&params.loops, params.scale, &params.offset, params.flip_y)?;
    build_solid(
        &loops,
        params.thickness,
        bevel,
        bevel,
        OffsetConvention::TravelLeft,
        triangulator,
    )
}

/// Transform, validate and orient the input loops; outer loop first
fn prepare_loops(
    loops: &[Loop2D],
    scale: f64,
    offset: &Vector2<f64>,
    flip_y: bool,
) -> Result<Vec<PreparedLoop>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::InvalidParameters(format!(
            "scale must be positive, got {}",
            scale
        )));
    }
    if !offset.x.is_finite() || !offset.y.is_finite() {
        return Err(Error::InvalidParameters("offset must be finite".to_string()));
    }

    let outer_count = loops.iter().filter(|l| l.role == LoopRole::Outer).count();
    match outer_count {
        0 => return Err(Error::InvalidLoopSet("no outer loop".to_string())),
        1 => {}
        n => {
            return Err(Error::InvalidLoopSet(format!(
                "expected one outer loop, found {}",
                n
            )))
        }
    }

    let mut prepared = Vec::with_capacity(loops.len());
    for (k, l) in loops.iter().enumerate() {
        if l.points.len() < 3 {
            return Err(Error::InvalidLoopSet(format!(
                "loop {} has {} points, needs at least 3",
                k,
                l.points.len()
            )));
        }
        if l.points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidLoopSet(format!("loop {} has a non-finite point", k)));
        }

        let transformed: Vec<Point2<f64>> = l
            .points
            .iter()
            .map(|p| {
                let y = if flip_y { -p.y } else { p.y };
                Point2::new(p.x * scale + offset.x, y * scale + offset.y)
            })
            .collect();

        let (points, reversed) = ensure_ccw(&transformed);
        prepared.push(PreparedLoop {
            points,
            role: l.role,
            reversed,
        });
    }

    // Outer loop first, holes keep their relative order
    prepared.sort_by_key(|l| l.role.is_hole());
    Ok(prepared)
}

fn build_solid(
    loops: &[PreparedLoop],
    thickness: f64,
    front: EdgeTreatment,
    back: EdgeTreatment,
    convention: OffsetConvention,
    triangulator: &dyn Triangulator,
) -> Result<Mesh> {
    if !thickness.is_finite() || thickness < 0.0 {
        return Err(Error::InvalidParameters(format!(
            "thickness must be finite and non-negative, got {}",
            thickness
        )));
    }

    // Degenerate loops fail here, before any offset is attempted
    let holes: Vec<&[Point2<f64>]> = loops[1..].iter().map(|l| l.points.as_slice()).collect();
    validate_polygon(&loops[0].points, &holes)?;

    let uv = UvFrame::new(&loops[0].points);
    let mut mesh = Mesh::new();

    if thickness == 0.0 {
        if front.is_active() || back.is_active() {
            tracing::debug!("edge treatments ignored for a flat extrusion");
        }
        let contours: Vec<&[Point2<f64>]> = loops.iter().map(|l| l.points.as_slice()).collect();
        emit_face(&mut mesh, triangulator, &contours, 0.0, -Vector3::z(), true, &uv)?;
        return Ok(mesh);
    }

    if front.depth() + back.depth() > thickness + EPSILON {
        return Err(Error::InvalidEdgeTreatment(format!(
            "front ({}) and back ({}) treatments exceed thickness {}",
            front.depth(),
            back.depth(),
            thickness
        )));
    }

    let half = thickness / 2.0;
    let front_side = Side::new(true, -half, front, loops, convention)?;
    let back_side = Side::new(false, half, back, loops, convention)?;

    mesh.set_material(MATERIAL_FACE);
    for side in [&front_side, &back_side] {
        let contours: Vec<&[Point2<f64>]> =
            (0..loops.len()).map(|k| side.face_contour(loops, k)).collect();
        emit_face(
            &mut mesh,
            triangulator,
            &contours,
            side.face_depth,
            side.normal(),
            side.is_front,
            &uv,
        )?;
    }

    mesh.set_material(MATERIAL_WALL);
    for k in 0..loops.len() {
        emit_walls(&mut mesh, loops, k, &front_side, &back_side, thickness);
    }

    mesh.set_material(MATERIAL_EDGE);
    for side in [&front_side, &back_side] {
        for k in 0..loops.len() {
            emit_treatment(&mut mesh, loops, k, side, &uv);
        }
    }

    tracing::debug!(
        loops = loops.len(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loop extrusion generated"
    );

    Ok(mesh)
}

/// Triangulate and emit a flat face; `reverse` flips the counter-clockwise
/// triangles to face `-Z`
fn emit_face(
    mesh: &mut Mesh,
    triangulator: &dyn Triangulator,
    contours: &[&[Point2<f64>]],
    depth: f64,
    normal: Vector3<f64>,
    reverse: bool,
    uv: &UvFrame,
) -> Result<()> {
    let (outer, holes) = contours
        .split_first()
        .ok_or_else(|| Error::InvalidLoopSet("no loops".to_string()))?;
    let triangles = triangulate_polygon(triangulator, outer, holes)?;

    let ids: Vec<u32> = contours
        .iter()
        .flat_map(|c| c.iter())
        .map(|p| mesh.add_vertex(Point3::new(p.x, p.y, depth), uv.map(p), normal))
        .collect();

    for [a, b, c] in triangles {
        if reverse {
            mesh.add_triangle(ids[a], ids[c], ids[b]);
        } else {
            mesh.add_triangle(ids[a], ids[b], ids[c]);
        }
    }
    Ok(())
}

/// Cumulative arc length along a closed loop, normalized; `n + 1` entries
fn loop_arc_params(points: &[Point2<f64>]) -> Vec<f64> {
    let n = points.len();
    let mut params = Vec::with_capacity(n + 1);
    let mut acc = 0.0;
    params.push(0.0);
    for i in 0..n {
        acc += (points[(i + 1) % n] - points[i]).norm();
        params.push(acc);
    }
    if acc > EPSILON {
        params.iter_mut().for_each(|u| *u /= acc);
    }
    params
}

fn emit_walls(
    mesh: &mut Mesh,
    loops: &[PreparedLoop],
    k: usize,
    front: &Side,
    back: &Side,
    thickness: f64,
) {
    let (zf, zb) = (front.wall_depth(), back.wall_depth());
    if zb - zf <= EPSILON {
        return;
    }

    let raw = &loops[k].points;
    let fw = front.wall_contour(loops, k);
    let bw = back.wall_contour(loops, k);
    let us = loop_arc_params(raw);
    let half = thickness / 2.0;
    let (vf, vb) = ((zf + half) / thickness, (zb + half) / thickness);
    let hole = loops[k].role.is_hole();

    let n = raw.len();
    for i in 0..n {
        let j = (i + 1) % n;
        if (raw[j] - raw[i]).norm() <= EPSILON {
            continue;
        }

        let corners = [
            (Point3::new(fw[i].x, fw[i].y, zf), Point2::new(us[i], vf)),
            (Point3::new(fw[j].x, fw[j].y, zf), Point2::new(us[i + 1], vf)),
            (Point3::new(bw[j].x, bw[j].y, zb), Point2::new(us[i + 1], vb)),
            (Point3::new(bw[i].x, bw[i].y, zb), Point2::new(us[i], vb)),
        ];
        let order: [usize; 4] = if hole { [0, 3, 2, 1] } else { [0, 1, 2, 3] };

        let normal = polygon_normal(&order.map(|o| corners[o].0));
        let ids = order.map(|o| mesh.add_vertex(corners[o].0, corners[o].1, normal));
        mesh.add_quad(ids[0], ids[1], ids[2], ids[3]);
    }
}

fn emit_treatment(mesh: &mut Mesh, loops: &[PreparedLoop], k: usize, side: &Side, uv: &UvFrame) {
    let offset = match &side.offset {
        Some(offset) => &offset[k],
        None => return,
    };

    let lp = &loops[k];
    let raw = &lp.points;
    let wall = side.wall_contour(loops, k);
    let profile = side.treatment.mode.profile();
    let concave = side.treatment.mode == EdgeMode::Outward;

    let (outer_depth, inner_depth) = if concave {
        (side.face_depth, side.wall_depth())
    } else {
        (side.wall_depth(), side.face_depth)
    };
    let flip = (side.is_front != concave) != lp.role.is_hole();
    let face_normal = side.normal();

    let n = raw.len();
    for i in 0..n {
        let j = (i + 1) % n;
        if (raw[j] - raw[i]).norm() <= EPSILON {
            continue;
        }

        let e = wall[j] - wall[i];
        let side_normal = Vector3::new(e.y, -e.x, 0.0)
            .try_normalize(EPSILON)
            .map(|v| v * lp.role.sign())
            .unwrap_or(face_normal);

        let edge = RoundingEdge {
            outer: [raw[i], raw[j]],
            inner: [offset[i], offset[j]],
            outer_depth,
            inner_depth,
            outer_uv: [uv.map(&raw[i]), uv.map(&raw[j])],
            inner_uv: [uv.map(&offset[i]), uv.map(&offset[j])],
            side_normals: [side_normal; 2],
            face_normal,
            segments: side.treatment.segments,
            profile,
            axis: DepthAxis::Z,
            flip,
        };
        emit_rounding(&edge, mesh);
    }
}
