// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! An indexed polygon mesh with per-vertex UV and normal. Faces are
//! triangles or quads, wound counter-clockwise when viewed from the side
//! their normal points to.

use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::primitives::{try_polygon_normal, EPSILON};

/// A single mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub uv: Point2<f64>,
    pub normal: Vector3<f64>,
}

/// A triangle or quad referencing mesh vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: SmallVec<[u32; 4]>,
    /// Material slot the face was emitted under
    pub material: u32,
}

impl Face {
    #[inline]
    pub fn is_quad(&self) -> bool {
        self.indices.len() == 4
    }

    /// Split into triangles: quads become `(0,1,2)` and `(0,2,3)`
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let idx = &self.indices;
        (1..idx.len().saturating_sub(1)).map(move |i| [idx[0], idx[i], idx[i + 1]])
    }
}

/// Flattened render buffers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Texture coordinates (u, v)
    pub uvs: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

/// Indexed polygon mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    material: u32,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            material: 0,
        }
    }

    /// Select the material slot for subsequently added faces
    #[inline]
    pub fn set_material(&mut self, slot: u32) {
        self.material = slot;
    }

    #[inline]
    pub fn material(&self) -> u32 {
        self.material
    }

    /// Add a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, uv: Point2<f64>, normal: Vector3<f64>) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position,
            uv,
            normal,
        });
        index
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.push_face(smallvec![i0, i1, i2]);
    }

    /// Add a quad
    #[inline]
    pub fn add_quad(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.push_face(smallvec![i0, i1, i2, i3]);
    }

    fn push_face(&mut self, indices: SmallVec<[u32; 4]>) {
        debug_assert!(
            indices.iter().all(|&i| (i as usize) < self.vertices.len()),
            "face references a vertex that was not added"
        );
        self.faces.push(Face {
            indices,
            material: self.material,
        });
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get face count (triangles and quads)
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get triangle count after quad splitting
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|f| f.indices.len().saturating_sub(2))
            .sum()
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// All faces as triangles
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces.iter().flat_map(|f| f.triangles())
    }

    /// Geometric normal of a face from its vertex positions
    pub fn face_normal(&self, face: &Face) -> Vector3<f64> {
        let points: SmallVec<[Point3<f64>; 4]> = face
            .indices
            .iter()
            .map(|&i| self.vertices[i as usize].position)
            .collect();
        crate::primitives::polygon_normal(&points)
    }

    /// Replace every normal with the average of the adjacent face normals
    ///
    /// Vertices are grouped by exact position, so seams that duplicate
    /// vertices are smoothed across. Degenerate faces contribute nothing.
    pub fn recalculate_smooth_normals(&mut self) {
        let mut sums: FxHashMap<[u64; 3], Vector3<f64>> = FxHashMap::default();

        for face in &self.faces {
            let points: SmallVec<[Point3<f64>; 4]> = face
                .indices
                .iter()
                .map(|&i| self.vertices[i as usize].position)
                .collect();
            let normal = match try_polygon_normal(&points) {
                Some(n) => n,
                None => continue,
            };

            // Count each position once per face
            let mut seen: SmallVec<[[u64; 3]; 4]> = SmallVec::new();
            for p in &points {
                let key = position_key(p);
                if !seen.contains(&key) {
                    seen.push(key);
                    *sums.entry(key).or_insert_with(Vector3::zeros) += normal;
                }
            }
        }

        for vertex in &mut self.vertices {
            vertex.normal = sums
                .get(&position_key(&vertex.position))
                .and_then(|n| n.try_normalize(EPSILON))
                .unwrap_or_else(Vector3::z);
        }
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for v in &self.vertices {
            let p = &v.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }

    /// Merge another mesh into this one, keeping its material slots
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertices.len() as u32;

        self.vertices.reserve(other.vertices.len());
        self.faces.reserve(other.faces.len());

        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(other.faces.iter().map(|f| Face {
            indices: f.indices.iter().map(|&i| i + vertex_offset).collect(),
            material: f.material,
        }));
    }

    /// Flatten into f32 render buffers with triangulated indices
    pub fn to_buffers(&self) -> MeshBuffers {
        let mut buffers = MeshBuffers {
            positions: Vec::with_capacity(self.vertices.len() * 3),
            normals: Vec::with_capacity(self.vertices.len() * 3),
            uvs: Vec::with_capacity(self.vertices.len() * 2),
            indices: Vec::with_capacity(self.triangle_count() * 3),
        };

        for v in &self.vertices {
            buffers
                .positions
                .extend([v.position.x as f32, v.position.y as f32, v.position.z as f32]);
            buffers
                .normals
                .extend([v.normal.x as f32, v.normal.y as f32, v.normal.z as f32]);
            buffers.uvs.extend([v.uv.x as f32, v.uv.y as f32]);
        }
        buffers.indices.extend(self.triangles().flatten());

        buffers
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.material = 0;
    }
}

/// Hash key for exact position matches; `-0.0` and `0.0` collapse
#[inline]
fn position_key(p: &Point3<f64>) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}
