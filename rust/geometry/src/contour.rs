// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contour utilities
//!
//! Plane projection, winding normalization, degeneracy tests and planar UV
//! generation. Every other module assumes contours went through
//! [`normalize_winding`] first: counter-clockwise, no repeated points, no
//! closing duplicate.

use nalgebra::{Point2, Point3, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered closed ring of 2D points (the closing edge is implicit)
pub type Contour = Vec<Point2<f64>>;

/// Epsilon for floating point comparisons in 2D operations
pub const EPSILON_2D: f64 = 1e-9;

/// Minimum area threshold - polygons smaller than this are considered degenerate
pub const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Maximum distance of a point from a line for it to count as collinear
pub const COLLINEAR_TOLERANCE: f64 = 1e-7;

/// The 2D plane contours live in, and how it maps into world space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WorkingPlane {
    /// Plan (x, y) maps to world (x, elevation, y); world Y is up
    #[default]
    XZ,
    /// Plan (x, y) maps to world (x, y, elevation); world Z is up
    XY,
}

impl WorkingPlane {
    /// Drop the up axis of a world point
    #[inline]
    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        match self {
            Self::XZ => Point2::new(point.x, point.z),
            Self::XY => Point2::new(point.x, point.y),
        }
    }

    /// Lift a plan point to world space at the given elevation
    #[inline]
    pub fn unproject(&self, point: &Point2<f64>, elevation: f64) -> Point3<f64> {
        match self {
            Self::XZ => Point3::new(point.x, elevation, point.y),
            Self::XY => Point3::new(point.x, point.y, elevation),
        }
    }

    /// Lift a plan direction to a horizontal world direction
    #[inline]
    pub fn unproject_vector(&self, v: &Vector2<f64>) -> Vector3<f64> {
        match self {
            Self::XZ => Vector3::new(v.x, 0.0, v.y),
            Self::XY => Vector3::new(v.x, v.y, 0.0),
        }
    }

    /// Elevation of a world point above the plane
    #[inline]
    pub fn elevation_of(&self, point: &Point3<f64>) -> f64 {
        match self {
            Self::XZ => point.y,
            Self::XY => point.z,
        }
    }

    /// World up direction
    #[inline]
    pub fn up(&self) -> Vector3<f64> {
        match self {
            Self::XZ => Vector3::y(),
            Self::XY => Vector3::z(),
        }
    }

    /// World normal of a triangle that is counter-clockwise in plan
    ///
    /// For XZ this points down, which is why every cap goes through
    /// orientation fixing instead of assuming plan winding.
    #[inline]
    pub fn ccw_normal(&self) -> Vector3<f64> {
        let u = self.unproject_vector(&Vector2::x());
        let v = self.unproject_vector(&Vector2::y());
        u.cross(&v)
    }
}

/// Project world points onto the working plane
pub fn project_contour(points: &[Point3<f64>], plane: WorkingPlane) -> Contour {
    points.iter().map(|p| plane.project(p)).collect()
}

/// Lift plan points into world space at a fixed elevation
pub fn unproject_contour(
    contour: &[Point2<f64>],
    plane: WorkingPlane,
    elevation: f64,
) -> Vec<Point3<f64>> {
    contour.iter().map(|p| plane.unproject(p, elevation)).collect()
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Contour {
    if compute_signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Contour {
    if compute_signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Remove consecutive duplicates and a closing duplicate
pub fn dedup_points(contour: &[Point2<f64>]) -> Contour {
    let mut result: Contour = Vec::with_capacity(contour.len());
    for p in contour {
        match result.last() {
            Some(last) if (p - last).norm() <= EPSILON_2D => {}
            _ => result.push(*p),
        }
    }
    while result.len() > 1 {
        let first = result[0];
        match result.last() {
            Some(last) if (first - last).norm() <= EPSILON_2D => {
                result.pop();
            }
            _ => break,
        }
    }
    result
}

/// Return the canonical form of a ring: deduplicated and counter-clockwise
pub fn normalize_winding(contour: &[Point2<f64>]) -> Contour {
    ensure_ccw(&dedup_points(contour))
}

/// True when a contour cannot produce geometry
///
/// Fewer than three distinct points, or every point within
/// [`COLLINEAR_TOLERANCE`] of the line through the first two distinct points.
pub fn is_degenerate(contour: &[Point2<f64>]) -> bool {
    let points = dedup_points(contour);
    if points.len() < 3 {
        return true;
    }

    let origin = points[0];
    let Some(axis) = points
        .iter()
        .map(|p| p - origin)
        .find(|v| v.norm() > EPSILON_2D)
    else {
        return true;
    };
    let axis_len = axis.norm();

    points.iter().all(|p| {
        let v = p - origin;
        (axis.x * v.y - axis.y * v.x).abs() / axis_len <= COLLINEAR_TOLERANCE
    })
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    !is_degenerate(contour) && compute_signed_area(contour).abs() > MIN_AREA_THRESHOLD
}

/// Simplify a contour by removing collinear points
pub fn simplify_contour(contour: &[Point2<f64>], epsilon: f64) -> Contour {
    if contour.len() <= 3 {
        return contour.to_vec();
    }

    let mut result = Vec::with_capacity(contour.len());
    let n = contour.len();

    for i in 0..n {
        let prev = &contour[(i + n - 1) % n];
        let curr = &contour[i];
        let next = &contour[(i + 1) % n];

        let cross = (curr.x - prev.x) * (next.y - prev.y) - (curr.y - prev.y) * (next.x - prev.x);

        if cross.abs() > epsilon {
            result.push(*curr);
        }
    }

    if result.len() < 3 {
        return contour.to_vec();
    }

    result
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Winding number of a ring around a point (counter-clockwise is positive)
pub fn winding_number(point: &Point2<f64>, contour: &[Point2<f64>]) -> i32 {
    let n = contour.len();
    let mut winding = 0;

    for i in 0..n {
        let a = &contour[i];
        let b = &contour[(i + 1) % n];
        let side = orient(a, b, point);
        if a.y <= point.y {
            if b.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && side < 0.0 {
            winding -= 1;
        }
    }

    winding
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = contour.first()?;
    let mut min = *first;
    let mut max = *first;

    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Projection of `point` onto segment `a`-`b`
///
/// Returns the unclamped parameter along the segment and the perpendicular
/// distance to the segment's supporting line.
pub fn project_onto_segment(
    point: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Option<(f64, f64)> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= EPSILON_2D * EPSILON_2D {
        return None;
    }
    let ap = point - a;
    let t = ap.dot(&ab) / len_sq;
    let distance = (ab.x * ap.y - ab.y * ap.x).abs() / len_sq.sqrt();
    Some((t, distance))
}

/// Proper or touching intersection test for segments `p1`-`p2` and `q1`-`q2`
pub fn segments_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);

    if ((d1 > EPSILON_2D && d2 < -EPSILON_2D) || (d1 < -EPSILON_2D && d2 > EPSILON_2D))
        && ((d3 > EPSILON_2D && d4 < -EPSILON_2D) || (d3 < -EPSILON_2D && d4 > EPSILON_2D))
    {
        return true;
    }

    (d1.abs() <= EPSILON_2D && on_segment(q1, q2, p1))
        || (d2.abs() <= EPSILON_2D && on_segment(q1, q2, p2))
        || (d3.abs() <= EPSILON_2D && on_segment(p1, p2, q1))
        || (d4.abs() <= EPSILON_2D && on_segment(p1, p2, q2))
}

/// True when any two non-adjacent edges of the ring touch or cross
pub fn has_self_intersections(contour: &[Point2<f64>]) -> bool {
    let n = contour.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a1 = &contour[i];
        let a2 = &contour[(i + 1) % n];
        for j in (i + 2)..n {
            // Edges i and j share a vertex when j is the edge before i (cyclically)
            if i == 0 && j == n - 1 {
                continue;
            }
            let b1 = &contour[j];
            let b2 = &contour[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

#[inline]
fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[inline]
fn on_segment(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    p.x >= a.x.min(b.x) - EPSILON_2D
        && p.x <= a.x.max(b.x) + EPSILON_2D
        && p.y >= a.y.min(b.y) - EPSILON_2D
        && p.y <= a.y.max(b.y) + EPSILON_2D
}

/// Planar UV for a world position
///
/// The projection axis is picked from the dominant component of `normal`
/// (box mapping), then scaled by the tile size so one tile spans `tile`
/// world units.
#[inline]
pub fn planar_uv(position: &Point3<f64>, normal: &Vector3<f64>, tile: (f64, f64)) -> Point2<f64> {
    let (tile_u, tile_v) = (tile.0.max(EPSILON_2D), tile.1.max(EPSILON_2D));
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());

    let (u, v) = if ax >= ay && ax >= az {
        (position.z, position.y)
    } else if ay >= az {
        (position.x, position.z)
    } else {
        (position.x, position.y)
    };

    Point2::new(u / tile_u, v / tile_v)
}

/// Generate UVs for a batch of world vertices sharing one normal
pub fn generate_uv(
    positions: &[Point3<f64>],
    normal: &Vector3<f64>,
    tile: (f64, f64),
) -> Vec<Point2<f64>> {
    positions.iter().map(|p| planar_uv(p, normal, tile)).collect()
}
