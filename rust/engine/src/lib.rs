// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorplan Engine
//!
//! One explicit rebuild pass over a floor plan: the footprint (rooms, walls,
//! floor, ceiling) is assembled first, then the roof is built over it, and
//! every artifact comes back together.
//!
//! ```rust,ignore
//! use floorplan_engine::{build_building, BuildConfig, BuildingInput};
//! use floorplan_geometry::{Point2, Room};
//!
//! let input = BuildingInput {
//!     rooms: vec![Room::new(vec![
//!         Point2::new(0.0, 0.0),
//!         Point2::new(5.0, 0.0),
//!         Point2::new(5.0, 4.0),
//!         Point2::new(0.0, 4.0),
//!     ])],
//!     openings: vec![],
//! };
//! let artifacts = build_building(&input, &BuildConfig::default());
//! ```
//!
//! [`BuildingEngine`] puts the [`RebuildScheduler`] in front of that pass for
//! hosts that fire rebuilds on every edit.

pub mod config;
pub mod scheduler;

pub use config::BuildConfig;
pub use scheduler::RebuildScheduler;

use floorplan_geometry::{assemble, build_roof, Contour, Mesh, PlanOpening, Room};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Plan input of one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingInput {
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub openings: Vec<PlanOpening>,
}

/// Meshes of one rebuild, owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct BuildingArtifacts {
    /// One mesh per wall segment, exterior walls first
    pub walls: Vec<Mesh>,
    pub merged_walls: Mesh,
    /// Door and window frames with their bars
    pub frames: Mesh,
    pub floor: Mesh,
    pub ceiling: Mesh,
    pub wall_tops: Mesh,
    pub roof: Mesh,
    pub roof_color: [f32; 4],
    /// Building outline, one ring per disjoint part
    pub normal_contours: Vec<Contour>,
    /// Exterior face of the shell, paired with `normal_contours`
    pub outer_contours: Vec<Contour>,
}

impl BuildingArtifacts {
    pub fn triangle_count(&self) -> usize {
        [
            &self.merged_walls,
            &self.frames,
            &self.floor,
            &self.ceiling,
            &self.wall_tops,
            &self.roof,
        ]
        .iter()
        .map(|m| m.triangle_count())
        .sum()
    }
}

/// Run the full pipeline: footprint, walls and caps, then the roof.
pub fn build_building(input: &BuildingInput, config: &BuildConfig) -> BuildingArtifacts {
    let dims = &config.dimensions;
    let footprint = assemble(&input.rooms, &input.openings, dims);

    let room_footprints: Vec<Contour> = footprint.rooms.iter().map(|r| r.contour.clone()).collect();
    let roof = build_roof(&footprint.outer_contours, &room_footprints, &config.roof, dims);

    let artifacts = BuildingArtifacts {
        walls: footprint.walls.into_iter().map(|w| w.mesh).collect(),
        merged_walls: footprint.merged_walls,
        frames: footprint.frames,
        floor: footprint.floor,
        ceiling: footprint.ceiling,
        wall_tops: footprint.wall_tops,
        roof,
        roof_color: config.roof.color,
        normal_contours: footprint.normal_contours,
        outer_contours: footprint.outer_contours,
    };

    tracing::info!(
        rooms = input.rooms.len(),
        openings = input.openings.len(),
        walls = artifacts.walls.len(),
        triangles = artifacts.triangle_count(),
        "Rebuilt building"
    );

    artifacts
}

/// Rebuild front end that coalesces bursts of edits.
pub struct BuildingEngine {
    config: BuildConfig,
    scheduler: RebuildScheduler<BuildingInput>,
}

impl BuildingEngine {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            scheduler: RebuildScheduler::new(config.cooldown()),
            config,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Request a rebuild; runs it right away unless inside the cooldown.
    pub fn request_rebuild(&mut self, input: BuildingInput, now: Instant) -> Option<BuildingArtifacts> {
        let input = self.scheduler.request(input, now)?;
        Some(self.run(&input, now))
    }

    /// Run the parked rebuild if its cooldown has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<BuildingArtifacts> {
        let input = self.scheduler.poll(now)?;
        Some(self.run(&input, now))
    }

    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    fn run(&mut self, input: &BuildingInput, now: Instant) -> BuildingArtifacts {
        let artifacts = build_building(input, &self.config);
        self.scheduler.complete(now);
        artifacts
    }
}

impl Default for BuildingEngine {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}
