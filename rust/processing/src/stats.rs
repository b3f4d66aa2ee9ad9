// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh statistics reported to callers.

use std::collections::BTreeMap;

use polyforge_geometry::Mesh;
use serde::{Deserialize, Serialize};

/// Summary of a generated mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of faces (triangles and quads).
    pub faces: usize,
    /// Number of triangles after splitting quads.
    pub triangles: usize,
    /// Length of the flattened index buffer.
    pub indices: usize,
    /// Face count per material slot.
    pub materials: BTreeMap<u32, usize>,
    /// Minimum corner of the bounding box.
    pub bounds_min: [f64; 3],
    /// Maximum corner of the bounding box.
    pub bounds_max: [f64; 3],
    /// Surface area summed over all triangles.
    pub surface_area: f64,
}

impl MeshStats {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut materials = BTreeMap::new();
        for face in &mesh.faces {
            *materials.entry(face.material).or_insert(0) += 1;
        }

        let surface_area = mesh
            .triangles()
            .map(|tri| {
                let [a, b, c] = tri.map(|i| mesh.vertices[i as usize].position);
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum();

        let (min, max) = mesh.bounds();

        Self {
            vertices: mesh.vertex_count(),
            faces: mesh.face_count(),
            triangles: mesh.triangle_count(),
            indices: mesh.to_buffers().indices.len(),
            materials,
            bounds_min: [min.x, min.y, min.z],
            bounds_max: [max.x, max.y, max.z],
            surface_area,
        }
    }
}
