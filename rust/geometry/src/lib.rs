// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyforge Geometry
//!
//! Procedural solid construction using earcutr triangulation and nalgebra
//! math. Every generator is a pure function from parameters to a fresh
//! [`Mesh`]:
//!
//! - [`generate_revolution`]: sweep a `(radius, height)` profile around the
//!   Y axis, optionally as a spiral, with capped and rounded ends
//! - [`generate_loop_extrusion`]: extrude an outer loop with holes, with
//!   bevels or rounds on either face
//! - [`generate_patch`]: the flat-bevel patch variant of the extrusion
//!
//! ```rust
//! use polyforge_geometry::{generate_loop_extrusion, ExtrusionParams, Loop2D, Point2};
//!
//! let square = vec![
//!     Point2::new(-1.0, -1.0),
//!     Point2::new(1.0, -1.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(-1.0, 1.0),
//! ];
//! let mesh = generate_loop_extrusion(&ExtrusionParams::new(vec![Loop2D::outer(square)], 0.5)).unwrap();
//! assert_eq!(mesh.faces.iter().filter(|f| f.material == 1).count(), 4);
//! ```

pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod offset;
pub mod primitives;
pub mod profile;
pub mod revolution;
pub mod rounding;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
pub use polyforge_core::LoopRole;

pub use error::{Error, Result};
pub use extrusion::{
    generate_loop_extrusion, generate_loop_extrusion_with, generate_patch, generate_patch_with,
    ExtrusionParams, PatchParams, MATERIAL_EDGE, MATERIAL_FACE, MATERIAL_WALL,
};
pub use mesh::{Face, Mesh, MeshBuffers, Vertex};
pub use profile::{Loop2D, Profile, ProfileKind};
pub use revolution::{generate_revolution, generate_revolution_with, RevolutionParams, SpiralParams};
pub use rounding::{EdgeMode, EdgeTreatment};
pub use triangulation::{triangulate_polygon, EarcutTriangulator, JitterSettings, Triangulator};
