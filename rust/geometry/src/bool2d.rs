// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations
//!
//! Union and difference of plan rings using the i_overlay crate. Room
//! footprints are merged with [`union`], opening cut-outs and ceiling caps go
//! through [`difference`]. All inputs are normalized to counter-clockwise
//! before being handed to i_overlay so the non-zero fill rule treats
//! overlapping inputs as one solid.

use crate::contour::{
    ensure_ccw, ensure_cw, is_valid_contour, normalize_winding, winding_number, Contour,
};
use crate::error::{Error, Result};
use crate::polygon::PolygonWithHoles;
use crate::triangulation::interior_point;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

type Path = Vec<[f64; 2]>;
type Shapes = Vec<Vec<Path>>;

/// Merge overlapping or touching rings
///
/// Returns the outer boundaries of the merged shapes. Room footprints are
/// solid, so holes of the merged result (a courtyard enclosed by rooms) are
/// not reported here; use [`union_shapes`] when they matter.
pub fn union(contours: &[Contour]) -> Result<Vec<Contour>> {
    Ok(union_shapes(contours)?
        .into_iter()
        .map(|shape| shape.outer)
        .collect())
}

/// Merge overlapping or touching rings, keeping holes
pub fn union_shapes(contours: &[Contour]) -> Result<Vec<PolygonWithHoles>> {
    let valid: Vec<Contour> = contours
        .iter()
        .map(|c| normalize_winding(c))
        .filter(|c| is_valid_contour(c))
        .collect();

    if valid.is_empty() {
        return Ok(Vec::new());
    }

    if valid.len() == 1 {
        return Ok(vec![PolygonWithHoles::new(valid[0].clone())]);
    }

    // Start with first contour as subject, all others as clip
    let subject: Vec<Path> = vec![contour_to_path(&valid[0])];
    let clip: Vec<Path> = valid.iter().skip(1).map(|c| contour_to_path(c)).collect();

    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);

    shapes_to_polygons(&result)
}

/// Subtract clip rings from a subject polygon
///
/// An empty clip list returns the subject unchanged. An empty result (clips
/// cover the subject entirely) is `Ok(vec![])`, not an error.
pub fn difference(subject: &PolygonWithHoles, clips: &[Contour]) -> Result<Vec<PolygonWithHoles>> {
    let valid_clips: Vec<Path> = clips
        .iter()
        .map(|c| normalize_winding(c))
        .filter(|c| is_valid_contour(c))
        .map(|c| contour_to_path(&c))
        .collect();

    if valid_clips.is_empty() {
        return Ok(vec![subject.clone()]);
    }

    if !is_valid_contour(&subject.outer) {
        return Err(Error::DegenerateInput(
            "Difference subject has no area".to_string(),
        ));
    }

    let paths = polygon_to_paths(subject);
    let result = paths.overlay(&valid_clips, OverlayRule::Difference, FillRule::NonZero);

    shapes_to_polygons(&result)
}

/// Subtract clip rings from several subjects at once
pub fn difference_all(
    subjects: &[PolygonWithHoles],
    clips: &[Contour],
) -> Result<Vec<PolygonWithHoles>> {
    let mut result = Vec::new();
    for subject in subjects {
        result.extend(difference(subject, clips)?);
    }
    Ok(result)
}

/// Resolve self-intersections of a single ring
///
/// Regions enclosed with negative winding are discarded: those are the
/// inverted loops a raw offset produces at tight concave corners.
pub(crate) fn resolve_ring(contour: &[Point2<f64>]) -> Result<Vec<PolygonWithHoles>> {
    if contour.len() < 3 {
        return Err(Error::DegenerateInput(
            "Ring must have at least 3 vertices".to_string(),
        ));
    }

    let subject: Vec<Path> = vec![contour_to_path(contour)];
    let clip: Vec<Path> = Vec::new();
    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);

    Ok(shapes_to_polygons(&result)?
        .into_iter()
        .filter(|shape| {
            interior_point(shape)
                .map(|p| winding_number(&p, contour) > 0)
                .unwrap_or(false)
        })
        .collect())
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a polygon to i_overlay path format (outer ccw, holes cw)
fn polygon_to_paths(polygon: &PolygonWithHoles) -> Vec<Path> {
    let mut paths = Vec::with_capacity(1 + polygon.holes.len());
    paths.push(contour_to_path(&ensure_ccw(&polygon.outer)));
    for hole in &polygon.holes {
        paths.push(contour_to_path(&ensure_cw(hole)));
    }
    paths
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Path {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Contour {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes back to polygons
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_polygons(shapes: &Shapes) -> Result<Vec<PolygonWithHoles>> {
    let mut polygons = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let Some(outer_path) = shape.first() else {
            continue;
        };
        let outer = path_to_contour(outer_path);
        if outer.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::ClipFailure(
                "Boolean operation produced non-finite coordinates".to_string(),
            ));
        }
        let outer = normalize_winding(&outer);
        if !is_valid_contour(&outer) {
            continue;
        }

        let holes = shape
            .iter()
            .skip(1)
            .map(|path| normalize_winding(&path_to_contour(path)))
            .filter(|hole| is_valid_contour(hole))
            .map(|hole| ensure_cw(&hole))
            .collect();

        polygons.push(PolygonWithHoles::with_holes(outer, holes));
    }

    Ok(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::compute_signed_area;
    use crate::polygon::rectangle;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Contour {
        rectangle(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn test_difference_with_no_clips_is_identity() {
        let subject = PolygonWithHoles::new(rect(0.0, 0.0, 4.0, 3.0));
        let result = difference(&subject, &[]).unwrap();
        assert_eq!(result, vec![subject]);
    }

    #[test]
    fn test_difference_center_hole() {
        let subject = PolygonWithHoles::new(rect(0.0, 0.0, 10.0, 10.0));
        let result = difference(&subject, &[rect(4.0, 4.0, 6.0, 6.0)]).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 1);
        assert_eq!(result[0].outer.len(), 4);
        assert!((result[0].area() - 96.0).abs() < 1e-6);
    }

    #[test]
    fn test_difference_notch_from_edge() {
        // A door-like cut touching the bottom edge becomes a notch, not a hole
        let subject = PolygonWithHoles::new(rect(0.0, 0.0, 10.0, 3.0));
        let result = difference(&subject, &[rect(4.0, 0.0, 5.0, 2.0)]).unwrap();

        assert_eq!(result.len(), 1);
        assert!(result[0].holes.is_empty());
        assert!((result[0].area() - 28.0).abs() < 1e-6);
    }

    #[test]
    fn test_difference_full_cover_is_empty() {
        let subject = PolygonWithHoles::new(rect(0.0, 0.0, 2.0, 2.0));
        let result = difference(&subject, &[rect(-1.0, -1.0, 3.0, 3.0)]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_union_disjoint_rectangles() {
        let result = union(&[rect(0.0, 0.0, 2.0, 2.0), rect(5.0, 0.0, 7.0, 2.0)]).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_union_overlapping_rectangles() {
        let result = union(&[rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 1.0, 3.0, 3.0)]).unwrap();
        assert_eq!(result.len(), 1);
        assert!((compute_signed_area(&result[0]) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_touching_rooms_merge() {
        let result = union(&[rect(0.0, 0.0, 4.0, 4.0), rect(4.0, 0.0, 8.0, 4.0)]).unwrap();
        assert_eq!(result.len(), 1);
        assert!((compute_signed_area(&result[0]) - 32.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_ignores_winding() {
        let cw: Contour = rect(1.0, 1.0, 3.0, 3.0).into_iter().rev().collect();
        let result = union(&[rect(0.0, 0.0, 2.0, 2.0), cw]).unwrap();
        assert_eq!(result.len(), 1);
        assert!((compute_signed_area(&result[0]) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_ring_drops_inverted_loop() {
        // Figure-eight: a ccw square lobe and a cw triangular lobe
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(4.0, 4.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let resolved = resolve_ring(&ring).unwrap();
        let total: f64 = resolved.iter().map(|p| p.area()).sum();
        assert!((total - 4.0).abs() < 1e-6);
    }
}
