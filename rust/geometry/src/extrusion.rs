// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - lifting plan shapes into 3D meshes
//!
//! Caps are tessellations laid flat at an elevation, side walls are vertical
//! bands along a ring. Both take the working plane so the same code serves
//! plan-space geometry (XZ, Y up) and wall-local geometry (XY, Z out of the
//! wall face).

use crate::contour::{planar_uv, WorkingPlane};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::polygon::PolygonWithHoles;
use crate::triangulation::{tessellate, Tessellation};
use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

/// Extrude a plan polygon between two elevations
///
/// Produces a closed solid: bottom cap facing down, top cap facing up and
/// side walls along the outer ring and every hole.
pub fn extrude_profile(
    polygon: &PolygonWithHoles,
    plane: WorkingPlane,
    bottom: f64,
    top: f64,
    tile: (f64, f64),
) -> Result<Mesh> {
    if top - bottom <= 0.0 {
        return Err(Error::DegenerateInput(
            "Extrusion depth must be positive".to_string(),
        ));
    }

    let up = plane.up();
    let shapes = std::slice::from_ref(polygon);
    let bottom_tess = tessellate(shapes, plane, &-up)?;
    let top_tess = tessellate(shapes, plane, &up)?;

    let mut mesh = Mesh::with_capacity(
        bottom_tess.points.len() * 2 + polygon.vertex_count() * 4,
        bottom_tess.indices.len() * 2 + polygon.vertex_count() * 6,
    );

    create_cap_mesh(&bottom_tess, plane, bottom, -up, tile, &mut mesh);
    create_cap_mesh(&top_tess, plane, top, up, tile, &mut mesh);

    create_side_walls(&polygon.outer, plane, bottom, top, tile, &mut mesh);
    for hole in &polygon.holes {
        create_side_walls(hole, plane, bottom, top, tile, &mut mesh);
    }

    Ok(mesh)
}

/// Lay a tessellation flat at `elevation`
///
/// The tessellation must already be oriented towards `normal` (see
/// [`tessellate`]); this only lifts the vertices.
pub fn create_cap_mesh(
    tessellation: &Tessellation,
    plane: WorkingPlane,
    elevation: f64,
    normal: Vector3<f64>,
    tile: (f64, f64),
    mesh: &mut Mesh,
) {
    let base_index = mesh.vertex_count() as u32;

    for point in &tessellation.points {
        let position = plane.unproject(point, elevation);
        mesh.add_vertex(position, normal, planar_uv(&position, &normal, tile));
    }

    for tri in tessellation.indices.chunks_exact(3) {
        mesh.add_triangle(
            base_index + tri[0] as u32,
            base_index + tri[1] as u32,
            base_index + tri[2] as u32,
        );
    }
}

/// Create vertical side walls along every edge of a ring
///
/// Faces point to the right of the walking direction: outward for a
/// counter-clockwise outer ring, into the opening for a clockwise hole.
#[inline]
pub fn create_side_walls(
    boundary: &[Point2<f64>],
    plane: WorkingPlane,
    bottom: f64,
    top: f64,
    tile: (f64, f64),
    mesh: &mut Mesh,
) {
    create_side_walls_where(boundary, plane, bottom, top, tile, mesh, |_, _| true);
}

/// Side walls for the edges accepted by `keep`
pub fn create_side_walls_where<F>(
    boundary: &[Point2<f64>],
    plane: WorkingPlane,
    bottom: f64,
    top: f64,
    tile: (f64, f64),
    mesh: &mut Mesh,
    keep: F,
) where
    F: Fn(&Point2<f64>, &Point2<f64>) -> bool,
{
    let n = boundary.len();
    if n < 2 {
        return;
    }
    let (tile_u, tile_v) = (tile.0.max(1e-9), tile.1.max(1e-9));
    let mut run = 0.0;

    for i in 0..n {
        let p0 = &boundary[i];
        let p1 = &boundary[(i + 1) % n];
        let edge = p1 - p0;
        let length = edge.norm();

        // Skip degenerate edge (duplicate points in ring)
        let normal = match plane
            .unproject_vector(&Vector2::new(edge.y, -edge.x))
            .try_normalize(1e-10)
        {
            Some(normal) => normal,
            None => continue,
        };

        if keep(p0, p1) {
            let corners = [
                plane.unproject(p0, bottom),
                plane.unproject(p1, bottom),
                plane.unproject(p1, top),
                plane.unproject(p0, top),
            ];
            let (u0, u1) = (run / tile_u, (run + length) / tile_u);
            let (v0, v1) = (bottom / tile_v, top / tile_v);
            let uvs = [
                Point2::new(u0, v0),
                Point2::new(u1, v0),
                Point2::new(u1, v1),
                Point2::new(u0, v1),
            ];
            mesh.add_facing_quad(corners, uvs, normal);
        }

        run += length;
    }
}

/// Apply transformation matrix to mesh
///
/// Mirroring transforms reverse the triangle winding so faces keep pointing
/// along their normals.
#[inline]
pub fn apply_transform(mesh: &mut Mesh, transform: &Matrix4<f64>) {
    // Transform positions using chunk-based iteration for cache locality
    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = transform.transform_point(&point);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    // Transform normals (use inverse transpose for correct normal transformation)
    let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

    mesh.normals.chunks_exact_mut(3).for_each(|chunk| {
        let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = (normal_matrix * normal.to_homogeneous()).xyz();
        let transformed = transformed.try_normalize(1e-12).unwrap_or(transformed);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    if transform.fixed_view::<3, 3>(0, 0).determinant() < 0.0 {
        mesh.flip_winding();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::rectangle;

    const TILE: (f64, f64) = (1.0, 1.0);

    fn rect_profile(w: f64, h: f64) -> PolygonWithHoles {
        PolygonWithHoles::new(rectangle(
            Point2::new(-w / 2.0, -h / 2.0),
            Point2::new(w / 2.0, h / 2.0),
        ))
    }

    /// Every triangle's winding agrees with its stored vertex normal
    fn assert_faces_follow_normals(mesh: &Mesh) {
        for tri in mesh.indices.chunks_exact(3) {
            let a = mesh.position(tri[0] as usize);
            let b = mesh.position(tri[1] as usize);
            let c = mesh.position(tri[2] as usize);
            let face = (b - a).cross(&(c - a));
            let i = tri[0] as usize * 3;
            let n = Vector3::new(
                mesh.normals[i] as f64,
                mesh.normals[i + 1] as f64,
                mesh.normals[i + 2] as f64,
            );
            assert!(face.dot(&n) > 0.0, "triangle faces away from its normal");
        }
    }

    #[test]
    fn test_extrude_rectangle() {
        let profile = rect_profile(10.0, 5.0);
        let mesh = extrude_profile(&profile, WorkingPlane::XY, 0.0, 20.0, TILE).unwrap();

        assert!(mesh.vertex_count() > 0);
        assert_eq!(mesh.triangle_count(), 2 + 2 + 8);

        let (min, max) = mesh.bounds();
        assert!((min.x - -5.0).abs() < 0.01);
        assert!((max.x - 5.0).abs() < 0.01);
        assert!((min.y - -2.5).abs() < 0.01);
        assert!((max.y - 2.5).abs() < 0.01);
        assert!((min.z - 0.0).abs() < 0.01);
        assert!((max.z - 20.0).abs() < 0.01);

        // 2 * (10 * 5) + 2 * (10 + 5) * 20
        assert!((mesh.surface_area() - 700.0).abs() < 1e-3);
        assert_faces_follow_normals(&mesh);
    }

    #[test]
    fn test_extrude_in_xz_plane_is_vertical() {
        let profile = rect_profile(2.0, 2.0);
        let mesh = extrude_profile(&profile, WorkingPlane::XZ, 1.0, 3.0, TILE).unwrap();

        let (min, max) = mesh.bounds();
        assert!((min.y - 1.0).abs() < 1e-6);
        assert!((max.y - 3.0).abs() < 1e-6);
        assert_faces_follow_normals(&mesh);
    }

    #[test]
    fn test_hole_walls_face_into_hole() {
        let mut profile = rect_profile(10.0, 10.0);
        profile.add_hole(rectangle(Point2::new(-1.0, -1.0), Point2::new(1.0, 1.0)));
        let profile = profile.normalized();

        let mut mesh = Mesh::new();
        create_side_walls(&profile.holes[0], WorkingPlane::XY, 0.0, 1.0, TILE, &mut mesh);

        // Wall on the hole's left edge (x = -1) must face +X, towards the hole center
        let left = (0..mesh.vertex_count())
            .find(|&i| (mesh.positions[i * 3] + 1.0).abs() < 1e-6 && mesh.normals[i * 3].abs() > 0.5)
            .unwrap();
        assert!(mesh.normals[left * 3] > 0.0);
        assert_faces_follow_normals(&mesh);
    }

    #[test]
    fn test_side_walls_filter() {
        let ring = rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 1.0));
        let mut mesh = Mesh::new();
        create_side_walls_where(&ring, WorkingPlane::XY, 0.0, 1.0, TILE, &mut mesh, |a, b| {
            (a.y - b.y).abs() < 1e-9
        });
        assert_eq!(mesh.triangle_count(), 4);
        assert!((mesh.surface_area() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_extrude_with_transform() {
        let profile = rect_profile(10.0, 5.0);
        let mut mesh = extrude_profile(&profile, WorkingPlane::XY, 0.0, 20.0, TILE).unwrap();

        apply_transform(
            &mut mesh,
            &Matrix4::new_translation(&Vector3::new(100.0, 200.0, 300.0)),
        );

        let (min, max) = mesh.bounds();
        assert!((min.x - 95.0).abs() < 0.01);
        assert!((max.x - 105.0).abs() < 0.01);
        assert!((min.y - 197.5).abs() < 0.01);
        assert!((max.y - 202.5).abs() < 0.01);
        assert!((min.z - 300.0).abs() < 0.01);
        assert!((max.z - 320.0).abs() < 0.01);
    }

    #[test]
    fn test_mirror_transform_keeps_faces_outward() {
        let profile = rect_profile(2.0, 1.0);
        let mut mesh = extrude_profile(&profile, WorkingPlane::XY, 0.0, 1.0, TILE).unwrap();
        apply_transform(&mut mesh, &Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0)));
        assert_faces_follow_normals(&mesh);
    }

    #[test]
    fn test_invalid_depth() {
        let profile = rect_profile(10.0, 5.0);
        let result = extrude_profile(&profile, WorkingPlane::XY, 0.0, -1.0, TILE);
        assert!(matches!(result, Err(Error::DegenerateInput(_))));
    }
}
