// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roofs over a building footprint
//!
//! Every roof starts from the footprint grown by the overhang. A flat roof is
//! a band of the roof thickness capped on top; pitched roofs put the same
//! band (the fascia) under sloped faces taken from the straight skeleton of
//! the overhang ring.
//!
//! Building a roof never fails as a whole: when the skeleton of the building
//! footprint cannot be built, the roof is rebuilt room by room, and a room
//! whose own skeleton fails gets a flat roof.

use crate::bool2d::difference;
use crate::contour::{Contour, WorkingPlane};
use crate::dimensions::Dimensions;
use crate::error::{Error, Result};
use crate::extrusion::{create_cap_mesh, create_side_walls};
use crate::mesh::Mesh;
use crate::offset::{offset, offset_with_miter_limit};
use crate::polygon::PolygonWithHoles;
use crate::skeleton::straight_skeleton;
use crate::triangulation::{tessellate, triangulate_polygon};
use nalgebra::{Point2, Point3, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoofKind {
    Flat,
    /// Every footprint edge slopes up to the skeleton
    #[default]
    Hipped,
    /// Like hipped, with triangular end faces turned into vertical gables
    Gabled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoofConfig {
    pub kind: RoofKind,
    /// Height of the fascia band (whole roof height when flat)
    pub thickness: f64,
    /// Distance the roof reaches past the footprint
    pub overhang: f64,
    /// Slope of pitched faces
    pub pitch_degrees: f64,
    /// RGBA, handed through to the roof artifact
    pub color: [f32; 4],
}

impl Default for RoofConfig {
    fn default() -> Self {
        Self {
            kind: RoofKind::Hipped,
            thickness: 0.15,
            overhang: 0.3,
            pitch_degrees: 30.0,
            color: [0.55, 0.27, 0.2, 1.0],
        }
    }
}

impl RoofConfig {
    pub fn flat() -> Self {
        Self {
            kind: RoofKind::Flat,
            ..Self::default()
        }
    }

    /// Rise per unit of horizontal run
    #[inline]
    pub fn slope(&self) -> f64 {
        self.pitch_degrees.to_radians().tan()
    }
}

/// Build the roof over `footprints`, starting at the wall tops
///
/// `rooms` are the per-room footprints used when a building footprint
/// cannot carry a pitched roof. The result may be empty when nothing in the
/// input can hold a roof at all.
pub fn build_roof(
    footprints: &[Contour],
    rooms: &[Contour],
    config: &RoofConfig,
    dims: &Dimensions,
) -> Mesh {
    let base = dims.top_elevation();

    let drafts: Result<Vec<Mesh>> = footprints
        .iter()
        .map(|f| roof_draft(f, config, dims, base))
        .collect();

    let mut roof = Mesh::new();
    match drafts {
        Ok(drafts) => roof.merge_all(&drafts),
        Err(e) => {
            tracing::warn!(
                error = %e,
                rooms = rooms.len(),
                "Building roof failed, retrying per room"
            );
            for room in rooms {
                roof.merge(&room_roof(room, config, dims, base));
            }
        }
    }

    tracing::debug!(
        kind = ?config.kind,
        footprints = footprints.len(),
        triangles = roof.triangle_count(),
        "Built roof"
    );

    roof
}

/// Roof over a single room: its own kind first, flat as the last resort
fn room_roof(room: &[Point2<f64>], config: &RoofConfig, dims: &Dimensions, base: f64) -> Mesh {
    let draft = roof_draft(room, config, dims, base).or_else(|e| {
        if config.kind == RoofKind::Flat {
            return Err(e);
        }
        tracing::warn!(error = %e, "Room roof failed, falling back to flat");
        flat_roof(room, config, dims, base)
    });

    draft.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Room cannot carry a roof, skipping");
        Mesh::new()
    })
}

fn roof_draft(footprint: &[Point2<f64>], config: &RoofConfig, dims: &Dimensions, base: f64) -> Result<Mesh> {
    match config.kind {
        RoofKind::Flat => flat_roof(footprint, config, dims, base),
        RoofKind::Hipped => pitched_roof(footprint, config, dims, base, false),
        RoofKind::Gabled => pitched_roof(footprint, config, dims, base, true),
    }
}

fn overhang_ring(footprint: &[Point2<f64>], config: &RoofConfig, dims: &Dimensions) -> Result<Contour> {
    offset_with_miter_limit(footprint, config.overhang, dims.miter_limit)
}

fn flat_roof(footprint: &[Point2<f64>], config: &RoofConfig, dims: &Dimensions, base: f64) -> Result<Mesh> {
    let ring = overhang_ring(footprint, config, dims)?;
    let cap = offset(footprint, 0.0)?;

    let mut mesh = Mesh::new();
    let top = eave_band(&ring, config, dims, base, &mut mesh)?;

    // Footprint cap, plus the overhang annulus out to the band
    let mut shapes = vec![PolygonWithHoles::new(cap.clone())];
    if config.overhang > 0.0 {
        shapes.extend(difference(&PolygonWithHoles::new(ring), &[cap])?);
    }
    let up = dims.plane.up();
    let tess = tessellate(&shapes, dims.plane, &up)?;
    create_cap_mesh(&tess, dims.plane, top, up, dims.uv_tile, &mut mesh);

    Ok(mesh)
}

/// Fascia band and soffit along the overhang ring; returns the eave elevation
fn eave_band(
    ring: &[Point2<f64>],
    config: &RoofConfig,
    dims: &Dimensions,
    base: f64,
    mesh: &mut Mesh,
) -> Result<f64> {
    if config.thickness <= 0.0 {
        return Ok(base);
    }
    let top = base + config.thickness;
    create_side_walls(ring, dims.plane, base, top, dims.uv_tile, mesh);

    let down = -dims.plane.up();
    let shapes = [PolygonWithHoles::new(ring.to_vec())];
    let soffit = tessellate(&shapes, dims.plane, &down)?;
    create_cap_mesh(&soffit, dims.plane, base, down, dims.uv_tile, mesh);

    Ok(top)
}

fn pitched_roof(
    footprint: &[Point2<f64>],
    config: &RoofConfig,
    dims: &Dimensions,
    base: f64,
    gabled: bool,
) -> Result<Mesh> {
    let ring = overhang_ring(footprint, config, dims)?;
    let skeleton = straight_skeleton(&ring)?;

    let mut mesh = Mesh::new();
    let eave = eave_band(&skeleton.polygon, config, dims, base, &mut mesh)?;

    let slope = config.slope();
    let n = skeleton.polygon.len();

    for i in 0..n {
        let edge = RoofEdge::new(skeleton.polygon[i], skeleton.polygon[(i + 1) % n]);
        let face = skeleton.face_polygon(i);

        if gabled && face.len() == 3 {
            gable_face(&edge, face[2], slope, eave, dims, &mut mesh);
        } else {
            sloped_face(&edge, &face, slope, eave, dims, &mut mesh)?;
        }
    }

    Ok(mesh)
}

/// Footprint edge a roof face rises from
struct RoofEdge {
    start: Point2<f64>,
    end: Point2<f64>,
    /// Inward unit normal
    normal: Vector2<f64>,
}

impl RoofEdge {
    fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        let d = end - start;
        let normal = Vector2::new(-d.y, d.x)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector2::zeros);
        Self { start, end, normal }
    }

    /// Perpendicular distance from the edge's line
    fn distance(&self, p: &Point2<f64>) -> f64 {
        self.normal.dot(&(p - self.start)).abs()
    }

    /// Normal of a face rising from this edge at `slope`
    fn face_normal(&self, slope: f64, plane: WorkingPlane) -> Vector3<f64> {
        let outward = plane.unproject_vector(&-self.normal);
        (plane.up() + outward * slope).normalize()
    }
}

fn sloped_face(
    edge: &RoofEdge,
    face: &[Point2<f64>],
    slope: f64,
    eave: f64,
    dims: &Dimensions,
    mesh: &mut Mesh,
) -> Result<()> {
    let plane = dims.plane;
    let normal = edge.face_normal(slope, plane);
    let corners: Vec<Point3<f64>> = face
        .iter()
        .map(|p| plane.unproject(p, eave + slope * edge.distance(p)))
        .collect();

    let indices = triangulate_polygon(face).map_err(|e| {
        Error::SkeletonFailure(format!("Roof face cannot be triangulated: {}", e))
    })?;
    for tri in indices.chunks_exact(3) {
        mesh.add_facing_triangle(
            [corners[tri[0]], corners[tri[1]], corners[tri[2]]],
            normal,
            dims.uv_tile,
        );
    }

    Ok(())
}

/// End face of a gabled roof: a vertical triangle up to the ridge height
/// plus two slopes joining it to the ridge end
fn gable_face(edge: &RoofEdge, apex: Point2<f64>, slope: f64, eave: f64, dims: &Dimensions, mesh: &mut Mesh) {
    let plane = dims.plane;
    let d = edge.end - edge.start;
    let t = (apex - edge.start).dot(&d) / d.norm_squared().max(1e-18);
    let foot = edge.start + d * t;
    let ridge = eave + slope * edge.distance(&apex);

    let a = plane.unproject(&edge.start, eave);
    let b = plane.unproject(&edge.end, eave);
    let m = plane.unproject(&foot, ridge);
    let p = plane.unproject(&apex, ridge);

    let outward = plane.unproject_vector(&-edge.normal);
    mesh.add_facing_triangle([a, b, m], outward, dims.uv_tile);

    let up = plane.up();
    for corners in [[a, m, p], [m, b, p]] {
        let normal = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        let Some(normal) = normal.try_normalize(1e-12) else {
            continue;
        };
        let normal = if normal.dot(&up) < 0.0 { -normal } else { normal };
        mesh.add_facing_triangle(corners, normal, dims.uv_tile);
    }
}
