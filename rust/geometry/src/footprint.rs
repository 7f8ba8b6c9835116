// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint assembly
//!
//! Turns room contours into the building's rings and walls:
//!
//! - the union of all rooms is the building's *normal* contour
//! - the normal contour grown by the exterior thickness is the *outer* ring,
//!   paired vertex for vertex with the normal contour
//! - each room shrunk by half the interior thickness is its *inner* ring; the
//!   union of inner rings is the void under the ceiling
//!
//! Exterior walls run along the outer ring facing out, room walls along each
//! inner ring facing in. Floor, ceiling and wall-top caps close the shell.
//! Every element fails on its own: a broken wall or cap is logged and left
//! empty, the rest of the building is still produced.

use crate::bool2d::{difference_all, union, union_shapes};
use crate::contour::{is_degenerate, normalize_winding, Contour};
use crate::dimensions::Dimensions;
use crate::extrusion::create_cap_mesh;
use crate::mesh::Mesh;
use crate::offset::{match_ring_lengths, offset_with_miter_limit};
use crate::opening::{associate_openings, Opening, PlanOpening};
use crate::polygon::PolygonWithHoles;
use crate::triangulation::tessellate;
use crate::wall::{build_wall, WallBuild, WallFacing, WallSegment};
use nalgebra::{Point2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A room outline in plan
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Room {
    pub contour: Contour,
}

impl Room {
    pub fn new(contour: Contour) -> Self {
        Self { contour }
    }
}

/// A room's normalized outline and its inner (wall face) ring
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRings {
    pub contour: Contour,
    pub inner: Contour,
}

/// Everything derived from the room contours
#[derive(Debug, Clone, Default)]
pub struct FootprintBuild {
    /// Union of all rooms
    pub normal_contours: Vec<Contour>,
    /// Normal contours grown by the exterior thickness, index-aligned with
    /// `normal_contours` and equal in length to their partner
    pub outer_contours: Vec<Contour>,
    /// Union of the room inner rings
    pub inner_void: Vec<PolygonWithHoles>,
    pub rooms: Vec<RoomRings>,
    /// Exterior segments first, then room segments room by room
    pub wall_segments: Vec<WallSegment>,
    /// One build per entry of `wall_segments`; failed walls are empty
    pub walls: Vec<WallBuild>,
    pub merged_walls: Mesh,
    pub frames: Mesh,
    pub floor: Mesh,
    pub ceiling: Mesh,
    pub wall_tops: Mesh,
}

impl FootprintBuild {
    /// Number of exterior segments at the front of `wall_segments`
    pub fn exterior_wall_count(&self) -> usize {
        self.wall_segments
            .iter()
            .take_while(|s| s.facing == WallFacing::Outward)
            .count()
    }
}

/// Assemble rings, walls and caps for a set of rooms
///
/// Degenerate room contours are silently excluded. Openings are placed on
/// the wall edges they sit on, within `dims.association_tolerance`.
pub fn assemble(rooms: &[Room], openings: &[PlanOpening], dims: &Dimensions) -> FootprintBuild {
    let contours: Vec<Contour> = rooms
        .iter()
        .map(|r| normalize_winding(&r.contour))
        .filter(|c| !is_degenerate(c))
        .collect();

    if contours.len() < rooms.len() {
        tracing::debug!(
            excluded = rooms.len() - contours.len(),
            "Excluded degenerate room contours"
        );
    }

    let mut build = FootprintBuild::default();
    if contours.is_empty() {
        return build;
    }

    build.rooms = room_rings(&contours, dims);
    let normal_shapes = merge_rooms(&contours);
    build.normal_contours = normal_shapes.iter().map(|s| s.outer.clone()).collect();
    build.inner_void = merge_inner_rings(&build.rooms);

    // Exterior shell
    let (normals, outers) = outer_rings(&build.normal_contours, dims);
    build.normal_contours = normals;
    build.outer_contours = outers;

    for (normal, outer) in build.normal_contours.iter().zip(&build.outer_contours) {
        build.wall_segments.extend(ring_walls(
            outer,
            normal,
            openings,
            dims.exterior_thickness,
            WallFacing::Outward,
            dims,
        ));
    }
    let exterior_count = build.wall_segments.len();

    for room in &build.rooms {
        build.wall_segments.extend(ring_walls(
            &room.inner,
            &room.contour,
            openings,
            dims.interior_thickness / 2.0,
            WallFacing::Inward,
            dims,
        ));
    }

    build.walls = build
        .wall_segments
        .iter()
        .map(|segment| {
            build_wall(segment, dims).unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    start_x = segment.start.x,
                    start_y = segment.start.y,
                    "Wall build failed, skipping segment"
                );
                WallBuild::default()
            })
        })
        .collect();

    let wall_meshes: Vec<Mesh> = build.walls.iter().map(|w| w.mesh.clone()).collect();
    build.merged_walls.merge_all(&wall_meshes);

    // Room walls carry the frames; exterior walls would duplicate them
    for wall in build.walls.iter().skip(exterior_count) {
        build.frames.merge(&wall.frames);
    }

    // Caps
    let up = dims.plane.up();
    build.floor = cap_mesh(&normal_shapes, dims, dims.base_elevation, up, "floor");
    build.ceiling = cap_mesh(&build.inner_void, dims, dims.top_elevation(), -up, "ceiling");

    let shell: Vec<PolygonWithHoles> = build
        .outer_contours
        .iter()
        .map(|c| PolygonWithHoles::new(c.clone()))
        .collect();
    let inner_rings: Vec<Contour> = build.rooms.iter().map(|r| r.inner.clone()).collect();
    match difference_all(&shell, &inner_rings) {
        Ok(tops) => {
            build.wall_tops = cap_mesh(&tops, dims, dims.top_elevation(), up, "wall tops");
        }
        Err(e) => tracing::warn!(error = %e, "Wall-top difference failed, skipping cap"),
    }

    tracing::debug!(
        rooms = build.rooms.len(),
        contours = build.normal_contours.len(),
        walls = build.walls.len(),
        triangles = build.merged_walls.triangle_count(),
        "Assembled footprint"
    );

    build
}

/// Inner ring of every room; rooms too thin to shrink keep no inner ring
fn room_rings(contours: &[Contour], dims: &Dimensions) -> Vec<RoomRings> {
    let inset = -dims.interior_thickness / 2.0;
    contours
        .iter()
        .filter_map(|contour| match offset_with_miter_limit(contour, inset, dims.miter_limit) {
            Ok(inner) => {
                let (inner, contour) = match_ring_lengths(&inner, contour);
                Some(RoomRings { contour, inner })
            }
            Err(e) => {
                tracing::warn!(error = %e, vertices = contour.len(), "Room inner ring failed, skipping room walls");
                None
            }
        })
        .collect()
}

/// Union of the room outlines; zero or one room skips the boolean
fn merge_rooms(contours: &[Contour]) -> Vec<PolygonWithHoles> {
    if contours.len() == 1 {
        return vec![PolygonWithHoles::new(contours[0].clone())];
    }

    match union(contours) {
        Ok(merged) if !merged.is_empty() => merged.into_iter().map(PolygonWithHoles::new).collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Room union failed, using rooms as separate footprints");
            contours.iter().cloned().map(PolygonWithHoles::new).collect()
        }
    }
}

fn merge_inner_rings(rooms: &[RoomRings]) -> Vec<PolygonWithHoles> {
    let inners: Vec<Contour> = rooms.iter().map(|r| r.inner.clone()).collect();
    if inners.len() <= 1 {
        return inners.into_iter().map(PolygonWithHoles::new).collect();
    }

    union_shapes(&inners).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Inner ring union failed, using rings separately");
        inners.into_iter().map(PolygonWithHoles::new).collect()
    })
}

/// Grow every normal contour and pair it with its outer ring
fn outer_rings(normals: &[Contour], dims: &Dimensions) -> (Vec<Contour>, Vec<Contour>) {
    let mut paired_normals = Vec::with_capacity(normals.len());
    let mut outers = Vec::with_capacity(normals.len());

    for normal in normals {
        match offset_with_miter_limit(normal, dims.exterior_thickness, dims.miter_limit) {
            Ok(outer) => {
                let (outer, normal) = match_ring_lengths(&outer, normal);
                paired_normals.push(normal);
                outers.push(outer);
            }
            Err(e) => {
                // Fall back to the bare contour as its own shell
                tracing::warn!(error = %e, "Exterior offset failed, using normal contour");
                paired_normals.push(normal.clone());
                outers.push(normal.clone());
            }
        }
    }

    (paired_normals, outers)
}

/// One wall per edge of `ring`, with openings found along the paired edge of `reference`
fn ring_walls(
    ring: &[Point2<f64>],
    reference: &[Point2<f64>],
    openings: &[PlanOpening],
    thickness: f64,
    facing: WallFacing,
    dims: &Dimensions,
) -> Vec<WallSegment> {
    let n = ring.len();
    let per_edge = associate_openings(openings, reference, dims.association_tolerance);

    (0..n)
        .map(|i| {
            let start = ring[i];
            let end = ring[(i + 1) % n];
            let placed = per_edge
                .get(i)
                .map(|list| transfer_openings(list, &reference[i], &reference[(i + 1) % n], &start, &end))
                .unwrap_or_default();
            WallSegment::new(start, end, thickness, facing).with_openings(placed)
        })
        .collect()
}

/// Re-measure opening offsets from one edge onto its paired edge
fn transfer_openings(
    openings: &[Opening],
    from_start: &Point2<f64>,
    from_end: &Point2<f64>,
    to_start: &Point2<f64>,
    to_end: &Point2<f64>,
) -> Vec<Opening> {
    let Some(from_dir) = (from_end - from_start).try_normalize(1e-12) else {
        return Vec::new();
    };
    let Some(to_dir) = (to_end - to_start).try_normalize(1e-12) else {
        return Vec::new();
    };

    openings
        .iter()
        .map(|o| {
            let center = from_start + from_dir * o.offset;
            Opening::new((center - to_start).dot(&to_dir), o.spec)
        })
        .collect()
}

/// Tessellate shapes into a cap, retrying shape by shape on failure
fn cap_mesh(
    shapes: &[PolygonWithHoles],
    dims: &Dimensions,
    elevation: f64,
    normal: Vector3<f64>,
    what: &str,
) -> Mesh {
    let mut mesh = Mesh::new();

    match tessellate(shapes, dims.plane, &normal) {
        Ok(tess) => create_cap_mesh(&tess, dims.plane, elevation, normal, dims.uv_tile, &mut mesh),
        Err(e) => {
            tracing::warn!(error = %e, cap = what, "Cap tessellation failed, retrying per shape");
            for shape in shapes {
                match tessellate(std::slice::from_ref(shape), dims.plane, &normal) {
                    Ok(tess) => {
                        create_cap_mesh(&tess, dims.plane, elevation, normal, dims.uv_tile, &mut mesh)
                    }
                    Err(e) => tracing::warn!(error = %e, cap = what, "Skipping cap shape"),
                }
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opening::OpeningSpec;
    use crate::polygon::rectangle;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Room {
        Room::new(rectangle(Point2::new(x0, y0), Point2::new(x1, y1)))
    }

    fn dims() -> Dimensions {
        Dimensions {
            interior_thickness: 0.2,
            exterior_thickness: 0.1,
            ..Dimensions::default()
        }
    }

    #[test]
    fn test_single_square_room() {
        let build = assemble(&[rect(0.0, 0.0, 10.0, 10.0)], &[], &dims());

        assert_eq!(build.normal_contours.len(), 1);
        assert_eq!(build.outer_contours.len(), 1);
        let outer = &build.outer_contours[0];
        let expected = [(-0.1, -0.1), (10.1, -0.1), (10.1, 10.1), (-0.1, 10.1)];
        assert_eq!(outer.len(), 4);
        for (p, (x, y)) in outer.iter().zip(expected) {
            assert_relative_eq!(p.x, x, epsilon = 1e-9);
            assert_relative_eq!(p.y, y, epsilon = 1e-9);
        }

        assert_eq!(build.rooms.len(), 1);
        assert_relative_eq!(build.rooms[0].inner[0].x, 0.1, epsilon = 1e-9);

        assert_eq!(build.wall_segments.len(), 8);
        assert_eq!(build.exterior_wall_count(), 4);
        assert_eq!(build.walls.len(), 8);
        assert!(build.walls.iter().all(|w| !w.mesh.is_empty()));

        assert_relative_eq!(build.floor.surface_area(), 100.0, epsilon = 1e-3);
        assert_relative_eq!(build.ceiling.surface_area(), 9.8 * 9.8, epsilon = 1e-3);
        assert_relative_eq!(build.wall_tops.surface_area(), 10.2 * 10.2 - 9.8 * 9.8, epsilon = 1e-3);
    }

    #[test]
    fn test_caps_face_the_right_way() {
        let build = assemble(&[rect(0.0, 0.0, 4.0, 4.0)], &[], &dims());

        // XZ plane: world Y is up
        assert_eq!(build.floor.normals[1], 1.0);
        assert_eq!(build.ceiling.normals[1], -1.0);

        let tri = &build.ceiling.indices[0..3];
        let a = build.ceiling.position(tri[0] as usize);
        let b = build.ceiling.position(tri[1] as usize);
        let c = build.ceiling.position(tri[2] as usize);
        assert!((b - a).cross(&(c - a)).y < 0.0);

        let (min, max) = build.ceiling.bounds();
        assert_relative_eq!(min.y, 2.7, epsilon = 1e-6);
        assert_relative_eq!(max.y, 2.7, epsilon = 1e-6);
    }

    #[test]
    fn test_adjacent_rooms_merge() {
        let build = assemble(
            &[rect(0.0, 0.0, 4.0, 4.0), rect(4.0, 0.0, 8.0, 4.0)],
            &[],
            &dims(),
        );

        assert_eq!(build.normal_contours.len(), 1);
        assert_eq!(build.rooms.len(), 2);
        assert_eq!(build.inner_void.len(), 2);
        assert_relative_eq!(build.floor.surface_area(), 32.0, epsilon = 1e-3);
        assert_relative_eq!(build.ceiling.surface_area(), 2.0 * 3.8 * 3.8, epsilon = 1e-3);
        assert_eq!(build.wall_segments.len(), build.exterior_wall_count() + 8);
    }

    #[test]
    fn test_degenerate_room_is_excluded() {
        let line = Room::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]);
        let build = assemble(&[rect(0.0, 0.0, 10.0, 10.0), line], &[], &dims());
        assert_eq!(build.rooms.len(), 1);
        assert_eq!(build.wall_segments.len(), 8);
    }

    #[test]
    fn test_no_rooms() {
        let build = assemble(&[], &[], &dims());
        assert!(build.walls.is_empty());
        assert!(build.floor.is_empty());
        assert!(build.merged_walls.is_empty());
    }

    #[test]
    fn test_openings_reach_both_sides_of_the_wall() {
        let door = PlanOpening::new(Point2::new(5.0, 0.0), OpeningSpec::door(0.9, 0.0));
        let build = assemble(&[rect(0.0, 0.0, 10.0, 10.0)], &[door], &dims());

        let exterior = &build.wall_segments[0];
        assert_eq!(exterior.facing, WallFacing::Outward);
        assert_eq!(exterior.openings.len(), 1);
        assert_relative_eq!(exterior.openings[0].offset, 5.1, epsilon = 1e-9);

        let room = &build.wall_segments[4];
        assert_eq!(room.facing, WallFacing::Inward);
        assert_eq!(room.openings.len(), 1);
        assert_relative_eq!(room.openings[0].offset, 4.9, epsilon = 1e-9);

        let openings: usize = build.wall_segments.iter().map(|s| s.openings.len()).sum();
        assert_eq!(openings, 2);
        assert!(!build.frames.is_empty());
        assert_eq!(build.walls[0].holes.len(), 1);
    }

    #[test]
    fn test_merged_walls_holds_every_wall() {
        let build = assemble(&[rect(0.0, 0.0, 6.0, 4.0)], &[], &dims());
        let triangles: usize = build.walls.iter().map(|w| w.mesh.triangle_count()).sum();
        assert_eq!(build.merged_walls.triangle_count(), triangles);
    }
}
