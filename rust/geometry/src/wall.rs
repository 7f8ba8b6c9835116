// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall panels with opening cut-outs
//!
//! A wall is built in its own local space: X runs along the wall from its
//! start point, Y is up and Z points out of the visible face. The panel
//! `[0, length] x [0, height]` has every opening's hole subtracted, the
//! remainder is tessellated facing +Z, and each hole boundary gets a reveal
//! band running back through the wall thickness. Door and window frames are
//! extruded separately. Finally the local-to-world matrix puts the panel on
//! its plan segment.

use crate::bool2d::{difference, union_shapes};
use crate::contour::{Contour, WorkingPlane, EPSILON_2D};
use crate::dimensions::Dimensions;
use crate::error::{Error, Result};
use crate::extrusion::{apply_transform, create_cap_mesh, create_side_walls_where, extrude_profile};
use crate::mesh::Mesh;
use crate::opening::{Opening, OpeningKind};
use crate::polygon::{rectangle, PolygonWithHoles};
use crate::triangulation::tessellate;
use nalgebra::{Matrix4, Point2, Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Local wall space is a vertical XY plane with Z out of the face
const LOCAL: WorkingPlane = WorkingPlane::XY;

/// Which side of the segment the visible face looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WallFacing {
    /// Left of start -> end: into the room of a counter-clockwise ring
    #[default]
    Inward,
    /// Right of start -> end: away from a counter-clockwise ring
    Outward,
}

/// One straight wall in plan
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallSegment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    /// Depth of the reveals behind the visible face
    pub thickness: f64,
    pub facing: WallFacing,
    #[cfg_attr(feature = "serde", serde(default))]
    pub openings: Vec<Opening>,
}

impl WallSegment {
    pub fn new(start: Point2<f64>, end: Point2<f64>, thickness: f64, facing: WallFacing) -> Self {
        Self {
            start,
            end,
            thickness,
            facing,
            openings: Vec::new(),
        }
    }

    pub fn with_openings(mut self, openings: Vec<Opening>) -> Self {
        self.openings = openings;
        self
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Plan unit normal of the visible face
    pub fn face_normal(&self) -> Option<Vector2<f64>> {
        let dir = (self.end - self.start).try_normalize(EPSILON_2D)?;
        Some(match self.facing {
            WallFacing::Inward => Vector2::new(-dir.y, dir.x),
            WallFacing::Outward => Vector2::new(dir.y, -dir.x),
        })
    }

    /// Matrix taking wall-local coordinates to world space
    pub fn local_to_world(&self, plane: WorkingPlane, base_elevation: f64) -> Option<Matrix4<f64>> {
        let dir = (self.end - self.start).try_normalize(EPSILON_2D)?;
        let normal = self.face_normal()?;

        let x = plane.unproject_vector(&dir);
        let y = plane.up();
        let z = plane.unproject_vector(&normal);
        let o = plane.unproject(&self.start, base_elevation);

        #[rustfmt::skip]
        let matrix = Matrix4::new(
            x.x, y.x, z.x, o.x,
            x.y, y.y, z.y, o.y,
            x.z, y.z, z.z, o.z,
            0.0, 0.0, 0.0, 1.0,
        );
        Some(matrix)
    }
}

/// Everything built for one wall segment
#[derive(Debug, Clone, Default)]
pub struct WallBuild {
    /// Panel minus holes, in wall-local space
    pub remainder: Vec<PolygonWithHoles>,
    /// Clamped hole rings, in wall-local space
    pub holes: Vec<Contour>,
    /// Panel face and reveals, in world space
    pub mesh: Mesh,
    /// Opening frames and window bars, in world space
    pub frames: Mesh,
}

/// Build the panel, reveals and frames of one wall
///
/// An opening covering the whole panel leaves an empty mesh; that is not an
/// error. Zero-length segments and non-positive height or thickness are
/// [`Error::InvalidWall`].
pub fn build_wall(segment: &WallSegment, dims: &Dimensions) -> Result<WallBuild> {
    let length = segment.length();
    let height = dims.wall_height;
    let thickness = segment.thickness;

    if !(height > 0.0) {
        return Err(Error::InvalidWall(format!("Wall height {} must be positive", height)));
    }
    if !(thickness > 0.0) {
        return Err(Error::InvalidWall(format!(
            "Wall thickness {} must be positive",
            thickness
        )));
    }
    let Some(transform) = segment.local_to_world(dims.plane, dims.base_elevation) else {
        return Err(Error::InvalidWall(format!("Wall length {} is too short", length)));
    };

    let panel = PolygonWithHoles::new(rectangle(Point2::origin(), Point2::new(length, height)));
    let holes: Vec<Contour> = segment
        .openings
        .iter()
        .filter_map(|o| o.hole(length, height, dims.door_height))
        .collect();

    // Overlapping holes merge inside the boolean
    let remainder = difference(&panel, &holes)?;

    let mut mesh = build_panel(&remainder, &panel, length, height, thickness, dims.uv_tile);
    let mut frames = build_frames(&segment.openings, length, thickness, dims)?;

    apply_transform(&mut mesh, &transform);
    apply_transform(&mut frames, &transform);

    tracing::trace!(
        length,
        openings = segment.openings.len(),
        holes = holes.len(),
        triangles = mesh.triangle_count(),
        "Built wall"
    );

    Ok(WallBuild {
        remainder,
        holes,
        mesh,
        frames,
    })
}

fn build_panel(
    remainder: &[PolygonWithHoles],
    panel: &PolygonWithHoles,
    length: f64,
    height: f64,
    thickness: f64,
    tile: (f64, f64),
) -> Mesh {
    let mut mesh = Mesh::new();
    if remainder.is_empty() {
        return mesh;
    }

    let face = Vector3::z();
    let (tess, shapes) = match tessellate(remainder, LOCAL, &face) {
        Ok(tess) => (tess, remainder),
        Err(e) => {
            tracing::warn!(error = %e, "Wall remainder tessellation failed, using plain panel");
            match tessellate(std::slice::from_ref(panel), LOCAL, &face) {
                Ok(tess) => (tess, std::slice::from_ref(panel)),
                Err(_) => return mesh,
            }
        }
    };

    create_cap_mesh(&tess, LOCAL, 0.0, face, tile, &mut mesh);

    // Reveals along hole boundaries only; the panel border is covered by the
    // neighbouring walls and the wall-top cap
    for shape in shapes {
        for ring in std::iter::once(&shape.outer).chain(shape.holes.iter()) {
            create_side_walls_where(ring, LOCAL, -thickness, 0.0, tile, &mut mesh, |a, b| {
                !on_panel_border(a, b, length, height)
            });
        }
    }

    mesh
}

#[inline]
fn on_panel_border(a: &Point2<f64>, b: &Point2<f64>, length: f64, height: f64) -> bool {
    let eps = 1e-9 * length.max(height).max(1.0);
    let on = |u: f64, v: f64, line: f64| (u - line).abs() <= eps && (v - line).abs() <= eps;
    on(a.x, b.x, 0.0) || on(a.x, b.x, length) || on(a.y, b.y, 0.0) || on(a.y, b.y, height)
}

/// Frame bands around door and window holes, plus window bars
fn build_frames(openings: &[Opening], length: f64, thickness: f64, dims: &Dimensions) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    let fw = dims.frame_width;
    if !(fw > 0.0) || !(dims.frame_thickness > 0.0) {
        return Ok(mesh);
    }

    // Frames sit in the middle of the wall depth
    let z_mid = -thickness / 2.0;
    let z0 = z_mid - dims.frame_thickness / 2.0;
    let z1 = z_mid + dims.frame_thickness / 2.0;

    for opening in openings {
        let kind = opening.spec.kind;
        if kind == OpeningKind::Generic {
            continue;
        }
        let Some((min, max)) = opening.hole_rect(length, dims.wall_height, dims.door_height) else {
            continue;
        };

        // Doors have no sill
        let inner_min = Point2::new(
            min.x + fw,
            if kind == OpeningKind::Door { min.y } else { min.y + fw },
        );
        let inner_max = Point2::new(max.x - fw, max.y - fw);
        if inner_max.x - inner_min.x <= EPSILON_2D || inner_max.y - inner_min.y <= EPSILON_2D {
            tracing::debug!(width = max.x - min.x, "Opening too small for a frame");
            continue;
        }

        let outer = PolygonWithHoles::new(rectangle(min, max));
        let mut profiles = difference(&outer, &[rectangle(inner_min, inner_max)])?;

        if kind == OpeningKind::Window {
            let bars = window_bars(inner_min, inner_max, opening.spec.columns, opening.spec.rows, dims.bar_width);
            profiles.extend(union_shapes(&bars)?);
        }

        for profile in &profiles {
            mesh.merge(&extrude_profile(profile, LOCAL, z0, z1, dims.uv_tile)?);
        }
    }

    Ok(mesh)
}

/// Vertical and horizontal bars splitting a window into panes
fn window_bars(
    min: Point2<f64>,
    max: Point2<f64>,
    columns: u32,
    rows: u32,
    bar_width: f64,
) -> Vec<Contour> {
    let half = bar_width.max(0.0) / 2.0;
    if half <= 0.0 {
        return Vec::new();
    }
    let (w, h) = (max.x - min.x, max.y - min.y);
    let mut bars = Vec::new();

    for k in 1..columns.max(1) {
        let x = min.x + w * k as f64 / columns as f64;
        bars.push(rectangle(Point2::new(x - half, min.y), Point2::new(x + half, max.y)));
    }
    for k in 1..rows.max(1) {
        let y = min.y + h * k as f64 / rows as f64;
        bars.push(rectangle(Point2::new(min.x, y - half), Point2::new(max.x, y + half)));
    }

    bars
}
