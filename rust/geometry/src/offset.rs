// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring offsetting
//!
//! Positive distances grow a ring outward (exterior shell, roof overhang),
//! negative distances shrink it (interior wall gap). Corners are mitered;
//! corners whose miter would reach further than `miter_limit * |distance|`
//! are beveled, which adds a vertex. A raw offset that folds over itself is
//! cleaned up through the boolean engine, so the vertex count of the result
//! can differ from the input. [`match_ring_lengths`] restores a 1:1 pairing
//! where wall strips need one.

use crate::bool2d::resolve_ring;
use crate::contour::{
    compute_signed_area, has_self_intersections, is_degenerate, normalize_winding,
    point_in_contour, Contour, EPSILON_2D,
};
use crate::error::{Error, Result};
use crate::triangulation::interior_point;
use nalgebra::{Point2, Vector2};

/// Miter limit used by [`offset`]
pub const DEFAULT_MITER_LIMIT: f64 = 4.0;

/// Offset a ring by `distance` with the default miter limit
///
/// `offset(c, 0.0)` is `normalize_winding(c)`.
#[inline]
pub fn offset(contour: &[Point2<f64>], distance: f64) -> Result<Contour> {
    offset_with_miter_limit(contour, distance, DEFAULT_MITER_LIMIT)
}

/// Offset a ring by `distance`, beveling corners beyond `miter_limit`
pub fn offset_with_miter_limit(
    contour: &[Point2<f64>],
    distance: f64,
    miter_limit: f64,
) -> Result<Contour> {
    let ring = normalize_winding(contour);
    if is_degenerate(&ring) {
        return Err(Error::DegenerateInput(format!(
            "Cannot offset ring with {} usable vertices",
            ring.len()
        )));
    }

    if distance.abs() <= EPSILON_2D {
        return Ok(ring);
    }

    let raw = raw_offset(&ring, distance, miter_limit.max(1.0));
    if raw.valid {
        return Ok(raw.points);
    }

    tracing::debug!(
        vertices = ring.len(),
        distance,
        "Offset ring folded over itself, resolving"
    );
    cleanup(&ring, &raw.points, distance)
}

struct RawOffset {
    points: Contour,
    valid: bool,
}

fn raw_offset(ring: &[Point2<f64>], distance: f64, miter_limit: f64) -> RawOffset {
    let n = ring.len();

    // Outward unit normal of edge i (ring[i] -> ring[i + 1]) of a ccw ring
    let normals: Vec<Vector2<f64>> = (0..n)
        .map(|i| {
            let edge = ring[(i + 1) % n] - ring[i];
            Vector2::new(edge.y, -edge.x)
                .try_normalize(EPSILON_2D)
                .unwrap_or_else(Vector2::zeros)
        })
        .collect();

    let mut points = Vec::with_capacity(n + n / 2);
    // Output index range produced by each input vertex
    let mut spans = Vec::with_capacity(n);

    for i in 0..n {
        let p = ring[i];
        let n0 = normals[(i + n - 1) % n];
        let n1 = normals[i];
        let dot = n0.dot(&n1);
        let cross = n0.x * n1.y - n0.y * n1.x;
        let first = points.len();

        let denom = 1.0 + dot;
        // Corners that open up away from the offset direction get the long miter
        let spiking = cross * distance > 0.0;
        let ratio = if denom > EPSILON_2D {
            (2.0 / denom).sqrt()
        } else {
            f64::INFINITY
        };

        if spiking && ratio > miter_limit {
            points.push(p + n0 * distance);
            points.push(p + n1 * distance);
        } else if denom <= EPSILON_2D {
            points.push(p + n0 * distance);
        } else {
            points.push(p + (n0 + n1) * (distance / denom));
        }

        spans.push((first, points.len() - 1));
    }

    let area = compute_signed_area(&points);
    let mut valid = area > 0.0 && !has_self_intersections(&points);

    // An offset edge that runs against its source edge has collapsed
    if valid {
        for i in 0..n {
            let j = (i + 1) % n;
            let edge = ring[j] - ring[i];
            let moved = points[spans[j].0] - points[spans[i].1];
            if moved.dot(&edge) <= 0.0 {
                valid = false;
                break;
            }
        }
    }

    RawOffset { points, valid }
}

fn cleanup(ring: &[Point2<f64>], raw: &[Point2<f64>], distance: f64) -> Result<Contour> {
    let min_clearance = distance.abs() * (1.0 - 1e-6) - EPSILON_2D;

    let best = resolve_ring(raw)?
        .into_iter()
        .filter(|shape| {
            if distance > 0.0 {
                return true;
            }
            // Inset regions lie inside the source and at least |distance| from its boundary
            interior_point(shape)
                .map(|p| point_in_contour(&p, ring) && distance_to_ring(&p, ring) >= min_clearance)
                .unwrap_or(false)
        })
        .max_by(|a, b| a.area().total_cmp(&b.area()));

    let Some(best) = best else {
        return Err(Error::ClipFailure(format!(
            "Offset by {} collapsed the ring",
            distance
        )));
    };

    let outer = best.outer;
    let anchor = raw.first().copied().unwrap_or_else(Point2::origin);
    let start = outer
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - anchor).norm_squared().total_cmp(&(b.1 - anchor).norm_squared()))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut rotated = outer;
    rotated.rotate_left(start);
    Ok(rotated)
}

fn distance_to_ring(point: &Point2<f64>, ring: &[Point2<f64>]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            let ab = b - a;
            let len_sq = ab.norm_squared();
            let t = if len_sq > 0.0 {
                ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            (point - (a + ab * t)).norm()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Reduce a ring to `target` vertices by merging close neighbours
///
/// Repeatedly replaces the closest consecutive pair (wrapping around) with
/// its midpoint. Ties go to the lowest index. Never reduces below 3.
pub fn merge_to_length(ring: &[Point2<f64>], target: usize) -> Contour {
    let target = target.max(3);
    let mut ring = ring.to_vec();

    while ring.len() > target {
        let n = ring.len();
        let mut closest = 0;
        let mut closest_dist = f64::INFINITY;
        for i in 0..n {
            let d = (ring[(i + 1) % n] - ring[i]).norm_squared();
            if d < closest_dist {
                closest_dist = d;
                closest = i;
            }
        }

        let next = (closest + 1) % n;
        ring[closest] = nalgebra::center(&ring[closest], &ring[next]);
        ring.remove(next);
    }

    ring
}

/// Pair two rings vertex for vertex
///
/// When the counts differ the longer ring goes through [`merge_to_length`]
/// and a warning is logged; the mismatch is never fatal.
pub fn match_ring_lengths(a: &[Point2<f64>], b: &[Point2<f64>]) -> (Contour, Contour) {
    if a.len() == b.len() {
        return (a.to_vec(), b.to_vec());
    }

    tracing::warn!(
        first = a.len(),
        second = b.len(),
        "Ring length mismatch, merging closest points of the longer ring"
    );

    if a.len() > b.len() {
        (merge_to_length(a, b.len()), b.to_vec())
    } else {
        (a.to_vec(), merge_to_length(b, a.len()))
    }
}
