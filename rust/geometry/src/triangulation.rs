// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for 2D polygon triangulation, plus the
//! validation and orientation layer the builders rely on.

use crate::contour::{
    compute_signed_area, has_self_intersections, is_degenerate, Contour, WorkingPlane,
    MIN_AREA_THRESHOLD,
};
use crate::polygon::{group_contours, PolygonWithHoles};
use crate::{Error, Point2, Result, Vector3};

/// Relative tolerance between triangle area sum and polygon area
const AREA_TOLERANCE: f64 = 1e-6;

/// Triangulated plan shapes
#[derive(Debug, Clone, Default)]
pub struct Tessellation {
    /// All vertices (every outer ring, then its holes, shape by shape)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

impl Tessellation {
    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if no triangles were produced
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Sum of unsigned triangle areas
    pub fn area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| triangle_area(&self.points[t[0]], &self.points[t[1]], &self.points[t[2]]).abs())
            .sum()
    }
}

/// Signed area of a plan triangle (positive = counter-clockwise)
#[inline]
pub fn triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x))
}

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon - use fan triangulation
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Triangulate a polygon with holes
/// Returns triangle indices into the combined vertex array (outer + all holes)
#[inline]
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Contour],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    // FAST PATH: No holes - use optimized simple triangulation
    let valid_holes: Vec<&Contour> = holes.iter().filter(|h| h.len() >= 3).collect();

    if valid_holes.is_empty() {
        return triangulate_polygon(outer);
    }

    let total_points: usize = outer.len() + valid_holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);

    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(valid_holes.len());
    for hole in valid_holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Tessellate one or more polygons with holes in a single call
///
/// Every input vertex is kept. Triangles are oriented so that, lifted into
/// world space through `plane`, they face along `normal`. Zero-area,
/// self-intersecting input, or an earcut result whose area does not match
/// the polygon, is reported as [`Error::TriangulationError`]; callers fall
/// back to a coarser shape.
pub fn tessellate(
    shapes: &[PolygonWithHoles],
    plane: WorkingPlane,
    normal: &Vector3<f64>,
) -> Result<Tessellation> {
    let flip = plane.ccw_normal().dot(normal) < 0.0;
    let mut result = Tessellation::default();

    for shape in shapes {
        let shape = shape.normalized();
        validate_shape(&shape)?;

        let indices = triangulate_polygon_with_holes(&shape.outer, &shape.holes)?;

        let base = result.points.len();
        result.points.extend(shape.outer.iter().copied());
        for hole in &shape.holes {
            result.points.extend(hole.iter().copied());
        }

        let mut covered = 0.0;
        for tri in indices.chunks_exact(3) {
            let (i0, mut i1, mut i2) = (base + tri[0], base + tri[1], base + tri[2]);
            let area = triangle_area(&result.points[i0], &result.points[i1], &result.points[i2]);
            if area < 0.0 {
                std::mem::swap(&mut i1, &mut i2);
            }
            covered += area.abs();
            if flip {
                std::mem::swap(&mut i1, &mut i2);
            }
            result.indices.extend_from_slice(&[i0, i1, i2]);
        }

        let expected = shape.area();
        if (covered - expected).abs() > AREA_TOLERANCE * expected.max(1.0) {
            return Err(Error::TriangulationError(format!(
                "Triangle area {:.6} does not match polygon area {:.6}",
                covered, expected
            )));
        }
    }

    Ok(result)
}

/// Tessellate a flat list of rings, sorting outers and holes by nesting
pub fn tessellate_contours(
    contours: &[Contour],
    plane: WorkingPlane,
    normal: &Vector3<f64>,
) -> Result<Tessellation> {
    tessellate(&group_contours(contours), plane, normal)
}

fn validate_shape(shape: &PolygonWithHoles) -> Result<()> {
    if is_degenerate(&shape.outer) || compute_signed_area(&shape.outer).abs() <= MIN_AREA_THRESHOLD
    {
        return Err(Error::TriangulationError(
            "Outer boundary has zero area".to_string(),
        ));
    }
    if has_self_intersections(&shape.outer) || shape.holes.iter().any(|h| has_self_intersections(h))
    {
        return Err(Error::TriangulationError(
            "Polygon is self-intersecting".to_string(),
        ));
    }
    Ok(())
}

/// A point strictly inside the polygon: centroid of its largest triangle
pub fn interior_point(polygon: &PolygonWithHoles) -> Option<Point2<f64>> {
    let polygon = polygon.normalized();
    let indices = triangulate_polygon_with_holes(&polygon.outer, &polygon.holes).ok()?;

    let mut points: Vec<Point2<f64>> = polygon.outer.clone();
    for hole in &polygon.holes {
        points.extend(hole.iter().copied());
    }

    indices
        .chunks_exact(3)
        .map(|t| (points[t[0]], points[t[1]], points[t[2]]))
        .max_by(|a, b| {
            triangle_area(&a.0, &a.1, &a.2)
                .abs()
                .total_cmp(&triangle_area(&b.0, &b.1, &b.2).abs())
        })
        .map(|(a, b, c)| Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::rectangle;

    #[test]
    fn test_triangulate_square() {
        let points = rectangle(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_polygon(&points).is_err());
    }

    #[test]
    fn test_triangulate_square_with_hole() {
        let outer = rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let hole = rectangle(Point2::new(3.0, 3.0), Point2::new(7.0, 7.0));

        let indices = triangulate_polygon_with_holes(&outer, &[hole]).unwrap();

        assert!(indices.len() > 6);
        assert_eq!(indices.len() % 3, 0);
    }

    #[test]
    fn test_tessellate_area_matches_shoelace() {
        // L-shaped room
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(6.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 5.0),
            Point2::new(0.0, 5.0),
        ];
        let expected = compute_signed_area(&outer);

        let tess = tessellate(
            &[PolygonWithHoles::new(outer)],
            WorkingPlane::XY,
            &Vector3::z(),
        )
        .unwrap();

        assert_eq!(tess.points.len(), 6);
        assert!((tess.area() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_tessellate_orients_to_normal() {
        let shape = PolygonWithHoles::new(rectangle(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)));

        for normal in [Vector3::y(), -Vector3::y()] {
            let tess = tessellate(std::slice::from_ref(&shape), WorkingPlane::XZ, &normal).unwrap();
            for t in tess.indices.chunks_exact(3) {
                let a = WorkingPlane::XZ.unproject(&tess.points[t[0]], 0.0);
                let b = WorkingPlane::XZ.unproject(&tess.points[t[1]], 0.0);
                let c = WorkingPlane::XZ.unproject(&tess.points[t[2]], 0.0);
                assert!((b - a).cross(&(c - a)).dot(&normal) > 0.0);
            }
        }
    }

    #[test]
    fn test_tessellate_multiple_outers_and_holes() {
        let mut first = PolygonWithHoles::new(rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0)));
        first.add_hole(rectangle(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)));
        let second = PolygonWithHoles::new(rectangle(Point2::new(10.0, 0.0), Point2::new(12.0, 3.0)));

        let tess = tessellate(&[first, second], WorkingPlane::XY, &Vector3::z()).unwrap();

        assert_eq!(tess.points.len(), 12);
        assert!((tess.area() - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_ceiling_from_loose_rings() {
        // Two rooms and a courtyard ring, in no particular order
        let rings = vec![
            rectangle(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)),
            rectangle(Point2::new(10.0, 0.0), Point2::new(12.0, 3.0)),
            rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0)),
        ];
        let down = -WorkingPlane::XZ.up();

        let tess = tessellate_contours(&rings, WorkingPlane::XZ, &down).unwrap();

        assert!((tess.area() - 21.0).abs() < 1e-9);
        for t in tess.indices.chunks_exact(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| WorkingPlane::XZ.unproject(&tess.points[i], 3.0));
            assert!((b - a).cross(&(c - a)).dot(&down) > 0.0);
        }
    }

    #[test]
    fn test_tessellate_rejects_self_intersection() {
        let bowtie = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        let result = tessellate(&[PolygonWithHoles::new(bowtie)], WorkingPlane::XY, &Vector3::z());
        assert!(matches!(result, Err(Error::TriangulationError(_))));
    }

    #[test]
    fn test_tessellate_rejects_zero_area() {
        let flat = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        let result = tessellate(&[PolygonWithHoles::new(flat)], WorkingPlane::XY, &Vector3::z());
        assert!(result.is_err());
    }

    #[test]
    fn test_interior_point_avoids_hole() {
        let mut polygon =
            PolygonWithHoles::new(rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)));
        polygon.add_hole(rectangle(Point2::new(1.0, 1.0), Point2::new(9.0, 9.0)));

        let p = interior_point(&polygon).unwrap();
        let in_hole = p.x > 1.0 && p.x < 9.0 && p.y > 1.0 && p.y < 9.0;
        assert!(!in_hole);
    }
}
