// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Polyforge Core
//!
//! Plain-text interchange for the shape kernel, parsed with
//! [nom](https://docs.rs/nom) and [fast-float](https://docs.rs/fast-float).
//!
//! ## Overview
//!
//! - **Loops**: blocks of `x,y` pairs tagged `#OUTER` / `#HOLE`, used by the
//!   loop-extrusion generator
//! - **Profiles**: a single block of `(radius, height)` pairs, used by the
//!   revolution generator
//!
//! ## Quick Start
//!
//! ```rust
//! use polyforge_core::{parse_loops, LoopRole};
//!
//! let text = "# OUTER\n-1,-1\n1,-1\n1,1\n-1,1\n\n# HOLE\n0,0\n0.5,0\n0.5,0.5\n";
//! let loops = parse_loops(text).unwrap();
//!
//! assert_eq!(loops[0].role, LoopRole::Outer);
//! assert_eq!(loops[1].role, LoopRole::Hole);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for parsed data

pub mod error;
pub mod loops;
pub mod parser;

pub use error::{Error, Result};
pub use loops::{LoopRole, ParsedLoop, ParsedProfile};
pub use parser::{parse_loops, parse_profile, CLOSING_TOLERANCE};
