// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Doors, windows and their placement on walls

use crate::contour::{project_onto_segment, Contour};
use crate::polygon::rectangle;
use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Holes thinner than this are dropped
const MIN_OPENING_SIZE: f64 = 1e-4;

/// Slack on the segment parameter when associating openings to edges
const SEGMENT_SLACK: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OpeningKind {
    /// Always starts at floor level
    Door,
    /// Honors its vertical offset
    Window,
    /// Unframed cut-out at its vertical offset
    Generic,
}

/// Size and shape of an opening, independent of where it sits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpeningSpec {
    pub kind: OpeningKind,
    pub width: f64,
    /// Non-positive door heights fall back to the configured door height
    pub height: f64,
    /// Vertical offset of the bottom edge; ignored for doors
    #[cfg_attr(feature = "serde", serde(default))]
    pub elevation: f64,
    /// Window panes across
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub columns: u32,
    /// Window panes down
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub rows: u32,
}

#[cfg(feature = "serde")]
fn one() -> u32 {
    1
}

impl OpeningSpec {
    pub fn door(width: f64, height: f64) -> Self {
        Self {
            kind: OpeningKind::Door,
            width,
            height,
            elevation: 0.0,
            columns: 1,
            rows: 1,
        }
    }

    pub fn window(width: f64, height: f64, elevation: f64) -> Self {
        Self {
            kind: OpeningKind::Window,
            width,
            height,
            elevation,
            columns: 1,
            rows: 1,
        }
    }

    pub fn generic(width: f64, height: f64, elevation: f64) -> Self {
        Self {
            kind: OpeningKind::Generic,
            ..Self::window(width, height, elevation)
        }
    }

    /// Split a window into `columns` x `rows` panes
    pub fn with_panes(mut self, columns: u32, rows: u32) -> Self {
        self.columns = columns.max(1);
        self.rows = rows.max(1);
        self
    }
}

/// An opening placed on a wall
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Opening {
    /// Distance of the opening's center from the wall start
    pub offset: f64,
    pub spec: OpeningSpec,
}

impl Opening {
    pub fn new(offset: f64, spec: OpeningSpec) -> Self {
        Self { offset, spec }
    }

    /// Hole rectangle in wall-local space, clamped to `[0, length] x [0, height]`
    ///
    /// Returns `None` when nothing of the opening is left after clamping.
    pub fn hole_rect(&self, length: f64, height: f64, door_height: f64) -> Option<(Point2<f64>, Point2<f64>)> {
        let half = self.spec.width.max(0.0) / 2.0;
        let x0 = (self.offset - half).clamp(0.0, length);
        let x1 = (self.offset + half).clamp(0.0, length);

        let (y0, y1) = match self.spec.kind {
            OpeningKind::Door => {
                let h = if self.spec.height > 0.0 {
                    self.spec.height
                } else {
                    door_height
                };
                (0.0, h.clamp(0.0, height))
            }
            OpeningKind::Window | OpeningKind::Generic => {
                let bottom = self.spec.elevation;
                let top = bottom + self.spec.height.max(0.0);
                (bottom.clamp(0.0, height), top.clamp(0.0, height))
            }
        };

        if x1 - x0 <= MIN_OPENING_SIZE || y1 - y0 <= MIN_OPENING_SIZE {
            return None;
        }

        Some((Point2::new(x0, y0), Point2::new(x1, y1)))
    }

    /// Hole ring in wall-local space
    pub fn hole(&self, length: f64, height: f64, door_height: f64) -> Option<Contour> {
        self.hole_rect(length, height, door_height)
            .map(|(min, max)| rectangle(min, max))
    }
}

/// An opening positioned in plan, not yet assigned to a wall
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanOpening {
    /// Plan position of the opening's center
    pub position: Point2<f64>,
    pub spec: OpeningSpec,
}

impl PlanOpening {
    pub fn new(position: Point2<f64>, spec: OpeningSpec) -> Self {
        Self { position, spec }
    }
}

/// Assign plan openings to the edges of a ring
///
/// Each opening lands on the nearest edge whose segment it projects onto
/// within `tolerance`; the result holds one list per edge (edge `i` runs
/// from `ring[i]` to `ring[i + 1]`). Openings near no edge are dropped.
pub fn associate_openings(
    openings: &[PlanOpening],
    ring: &[Point2<f64>],
    tolerance: f64,
) -> Vec<Vec<Opening>> {
    let n = ring.len();
    let mut per_edge: Vec<Vec<Opening>> = vec![Vec::new(); n];

    for opening in openings {
        let best = (0..n)
            .filter_map(|i| {
                let a = &ring[i];
                let b = &ring[(i + 1) % n];
                let (t, distance) = project_onto_segment(&opening.position, a, b)?;
                if !(-SEGMENT_SLACK..=1.0 + SEGMENT_SLACK).contains(&t) || distance > tolerance {
                    return None;
                }
                Some((i, t.clamp(0.0, 1.0) * (b - a).norm(), distance))
            })
            .min_by(|x, y| x.2.total_cmp(&y.2));

        match best {
            Some((edge, offset, _)) => per_edge[edge].push(Opening::new(offset, opening.spec)),
            None => tracing::debug!(
                x = opening.position.x,
                y = opening.position.y,
                "Opening is not near any wall, skipping"
            ),
        }
    }

    per_edge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_is_clamped_to_floor() {
        let mut spec = OpeningSpec::door(1.0, 2.0);
        spec.elevation = 0.5;
        let (min, max) = Opening::new(2.0, spec).hole_rect(4.0, 2.7, 2.1).unwrap();
        assert_eq!(min, Point2::new(1.5, 0.0));
        assert_eq!(max, Point2::new(2.5, 2.0));
    }

    #[test]
    fn test_door_without_height_uses_door_height() {
        let (_, max) = Opening::new(2.0, OpeningSpec::door(1.0, 0.0))
            .hole_rect(4.0, 2.7, 2.1)
            .unwrap();
        assert_eq!(max.y, 2.1);
    }

    #[test]
    fn test_window_keeps_elevation_and_clamps_top() {
        let (min, max) = Opening::new(1.0, OpeningSpec::window(1.0, 2.0, 1.2))
            .hole_rect(4.0, 2.7, 2.1)
            .unwrap();
        assert_eq!(min.y, 1.2);
        assert_eq!(max.y, 2.7);
    }

    #[test]
    fn test_opening_past_wall_end_is_clamped() {
        let (min, max) = Opening::new(3.8, OpeningSpec::window(1.0, 1.0, 1.0))
            .hole_rect(4.0, 2.7, 2.1)
            .unwrap();
        assert!((min.x - 3.3).abs() < 1e-12);
        assert_eq!(max.x, 4.0);

        assert!(Opening::new(9.0, OpeningSpec::window(1.0, 1.0, 1.0))
            .hole_rect(4.0, 2.7, 2.1)
            .is_none());
    }

    #[test]
    fn test_associate_picks_nearest_edge() {
        let ring = rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let openings = [
            PlanOpening::new(Point2::new(3.0, 0.05), OpeningSpec::door(0.9, 2.0)),
            PlanOpening::new(Point2::new(10.1, 6.0), OpeningSpec::window(1.2, 1.0, 1.0)),
            PlanOpening::new(Point2::new(5.0, 5.0), OpeningSpec::window(1.2, 1.0, 1.0)),
        ];

        let per_edge = associate_openings(&openings, &ring, 0.2);

        assert_eq!(per_edge.len(), 4);
        assert_eq!(per_edge[0].len(), 1);
        assert!((per_edge[0][0].offset - 3.0).abs() < 1e-12);
        assert_eq!(per_edge[1].len(), 1);
        assert!((per_edge[1][0].offset - 6.0).abs() < 1e-12);
        assert!(per_edge[2].is_empty());
        assert!(per_edge[3].is_empty());
    }
}
