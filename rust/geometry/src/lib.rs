// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan Geometry Processing
//!
//! Procedural building geometry from 2D plan contours: polygon booleans and
//! offsets via i_overlay, earcutr triangulation, nalgebra for transforms, and
//! a straight skeleton for pitched roofs.
//!
//! The pipeline runs leaf-first:
//!
//! 1. [`contour`] normalizes rings on a [`WorkingPlane`]
//! 2. [`footprint::assemble`] merges rooms, derives inner/outer rings and
//!    builds every wall through [`wall::build_wall`]
//! 3. [`roof::build_roof`] covers the resulting footprint

pub mod bool2d;
pub mod contour;
pub mod dimensions;
pub mod error;
pub mod extrusion;
pub mod footprint;
pub mod mesh;
pub mod offset;
pub mod opening;
pub mod polygon;
pub mod roof;
pub mod skeleton;
pub mod triangulation;
pub mod wall;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use bool2d::{difference, union};
pub use contour::{is_degenerate, normalize_winding, Contour, WorkingPlane};
pub use error::{Error, Result};
pub use dimensions::Dimensions;
pub use footprint::{assemble, FootprintBuild, Room};
pub use mesh::Mesh;
pub use offset::offset;
pub use opening::{Opening, OpeningKind, OpeningSpec, PlanOpening};
pub use polygon::PolygonWithHoles;
pub use roof::{build_roof, RoofConfig, RoofKind};
pub use skeleton::{straight_skeleton, StraightSkeleton};
pub use triangulation::{tessellate, tessellate_contours, Tessellation};
pub use wall::{build_wall, WallBuild, WallFacing, WallSegment};
