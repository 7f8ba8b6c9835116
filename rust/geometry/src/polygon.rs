// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon with holes

use crate::contour::{
    compute_signed_area, ensure_ccw, ensure_cw, is_degenerate, normalize_winding,
    point_in_contour, Contour,
};
use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One outer ring plus zero or more hole rings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonWithHoles {
    /// Outer boundary (counter-clockwise)
    pub outer: Contour,
    /// Holes (clockwise)
    pub holes: Vec<Contour>,
}

impl PolygonWithHoles {
    /// Create a polygon without holes
    pub fn new(outer: Contour) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Create a polygon with holes
    pub fn with_holes(outer: Contour, holes: Vec<Contour>) -> Self {
        Self { outer, holes }
    }

    /// Add a hole to the polygon
    pub fn add_hole(&mut self, hole: Contour) {
        self.holes.push(hole);
    }

    /// Canonical winding: outer counter-clockwise, holes clockwise
    pub fn normalized(&self) -> Self {
        Self {
            outer: normalize_winding(&self.outer),
            holes: self
                .holes
                .iter()
                .map(|h| ensure_cw(&normalize_winding(h)))
                .filter(|h| h.len() >= 3)
                .collect(),
        }
    }

    /// Outer area minus hole areas
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| compute_signed_area(h).abs()).sum();
        compute_signed_area(&self.outer).abs() - holes
    }

    /// True when the outer ring cannot produce geometry
    pub fn is_degenerate(&self) -> bool {
        is_degenerate(&self.outer)
    }

    /// Total number of vertices over all rings
    pub fn vertex_count(&self) -> usize {
        self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>()
    }
}

/// Axis-aligned rectangle ring, counter-clockwise from `min`
#[inline]
pub fn rectangle(min: Point2<f64>, max: Point2<f64>) -> Contour {
    vec![
        Point2::new(min.x, min.y),
        Point2::new(max.x, min.y),
        Point2::new(max.x, max.y),
        Point2::new(min.x, max.y),
    ]
}

/// Sort a flat list of rings into polygons with holes by containment depth
///
/// A ring nested inside an even number of other rings is an outer boundary;
/// an odd nesting depth makes it a hole of its innermost container. Winding
/// of the input is ignored.
pub fn group_contours(contours: &[Contour]) -> Vec<PolygonWithHoles> {
    let rings: Vec<Contour> = contours
        .iter()
        .map(|c| normalize_winding(c))
        .filter(|c| !is_degenerate(c))
        .collect();

    let areas: Vec<f64> = rings.iter().map(|r| compute_signed_area(r).abs()).collect();

    // Containers of each ring, tested at one of its vertices
    let containers: Vec<Vec<usize>> = rings
        .iter()
        .enumerate()
        .map(|(i, ring)| {
            (0..rings.len())
                .filter(|&j| j != i && areas[j] > areas[i])
                .filter(|&j| point_in_contour(&ring[0], &rings[j]))
                .collect()
        })
        .collect();

    let mut polygons: Vec<PolygonWithHoles> = Vec::new();
    let mut outer_slot = vec![usize::MAX; rings.len()];

    for (i, ring) in rings.iter().enumerate() {
        if containers[i].len() % 2 == 0 {
            outer_slot[i] = polygons.len();
            polygons.push(PolygonWithHoles::new(ensure_ccw(ring)));
        }
    }

    for (i, ring) in rings.iter().enumerate() {
        if containers[i].len() % 2 == 1 {
            // Innermost container is the one with the smallest area
            let parent = containers[i]
                .iter()
                .copied()
                .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
            if let Some(parent) = parent {
                let slot = outer_slot[parent];
                if let Some(polygon) = polygons.get_mut(slot) {
                    polygon.add_hole(ensure_cw(ring));
                }
            }
        }
    }

    polygons
}
