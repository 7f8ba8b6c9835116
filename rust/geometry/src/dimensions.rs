// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimensional constants passed into every build

use crate::contour::WorkingPlane;
use crate::offset::DEFAULT_MITER_LIMIT;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Building-wide dimensions, in world units (metres by convention)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Dimensions {
    /// Wall height above the base elevation
    pub wall_height: f64,
    /// Door hole height when an opening does not carry its own
    pub door_height: f64,
    /// Full thickness of a wall shared by two rooms
    pub interior_thickness: f64,
    /// Thickness of the exterior shell
    pub exterior_thickness: f64,
    /// Width of the frame band around door and window holes
    pub frame_width: f64,
    /// Depth of opening frames and bars
    pub frame_thickness: f64,
    /// Width of window subdivision bars
    pub bar_width: f64,
    /// Max plan distance between an opening and the wall edge it belongs to
    pub association_tolerance: f64,
    /// Offset corners with a longer miter are beveled
    pub miter_limit: f64,
    /// World size of one texture tile (u, v)
    pub uv_tile: (f64, f64),
    /// Plane the plan contours live in
    pub plane: WorkingPlane,
    /// Elevation of the floor
    pub base_elevation: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            wall_height: 2.7,
            door_height: 2.1,
            interior_thickness: 0.2,
            exterior_thickness: 0.1,
            frame_width: 0.06,
            frame_thickness: 0.08,
            bar_width: 0.04,
            association_tolerance: 0.25,
            miter_limit: DEFAULT_MITER_LIMIT,
            uv_tile: (1.0, 1.0),
            plane: WorkingPlane::XZ,
            base_elevation: 0.0,
        }
    }
}

impl Dimensions {
    /// Elevation of the wall tops
    #[inline]
    pub fn top_elevation(&self) -> f64 {
        self.base_elevation + self.wall_height
    }
}
