// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight skeleton of a simple polygon
//!
//! Wavefront simulation: every edge moves inward at unit speed, every
//! wavefront vertex slides along the bisector of its two edges. Two kinds of
//! events change the wavefront topology:
//!
//! - **edge event**: an edge shrinks to zero length and its two vertices merge
//! - **split event**: a reflex vertex runs into a non-adjacent edge and splits
//!   its wavefront loop in two
//!
//! Events are found by brute force after every step (O(n²) per step), which
//! is plenty for building footprints. Each node's height is the offset time
//! at which it was created, i.e. its distance to the edges meeting there.
//!
//! The result is checked: the faces (one per polygon edge) must tile the
//! polygon. Anything else is reported as [`Error::SkeletonFailure`].

use crate::contour::{
    compute_signed_area, contour_bounds, is_degenerate, normalize_winding, simplify_contour,
    Contour, COLLINEAR_TOLERANCE,
};
use crate::error::{Error, Result};
use nalgebra::{Point2, Vector2};
use rustc_hash::FxHashSet;
use std::f64::consts::TAU;

/// Relative tolerance for node merging and event coincidence
const RELATIVE_TOLERANCE: f64 = 1e-7;

/// Relative tolerance between face area sum and polygon area
const AREA_TOLERANCE: f64 = 1e-6;

/// A skeleton node: polygon vertex (height 0) or wavefront event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonNode {
    pub position: Point2<f64>,
    /// Offset distance at which the node was reached
    pub height: f64,
}

/// Straight skeleton of a polygon
#[derive(Debug, Clone)]
pub struct StraightSkeleton {
    /// The polygon the skeleton was built for (normalized, collinear points removed)
    pub polygon: Contour,
    /// Polygon vertices first (same indices as `polygon`), then interior nodes
    pub nodes: Vec<SkeletonNode>,
    /// Skeleton arcs as node index pairs
    pub arcs: Vec<(usize, usize)>,
    /// Face of polygon edge `i`, as a counter-clockwise node loop starting
    /// with the edge's endpoints `i`, `i + 1`
    pub faces: Vec<Vec<usize>>,
}

impl StraightSkeleton {
    /// Plan polygon of face `i`
    pub fn face_polygon(&self, i: usize) -> Contour {
        self.faces
            .get(i)
            .map(|face| face.iter().map(|&n| self.nodes[n].position).collect())
            .unwrap_or_default()
    }

    /// Arcs between two interior nodes
    pub fn ridges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let boundary = self.polygon.len();
        self.arcs
            .iter()
            .copied()
            .filter(move |&(a, b)| a >= boundary && b >= boundary)
    }

    /// Largest node height
    pub fn max_height(&self) -> f64 {
        self.nodes.iter().map(|n| n.height).fold(0.0, f64::max)
    }
}

/// Compute the straight skeleton of a simple polygon
pub fn straight_skeleton(contour: &[Point2<f64>]) -> Result<StraightSkeleton> {
    let ring = normalize_winding(contour);
    let polygon = simplify_contour(&ring, COLLINEAR_TOLERANCE);
    if is_degenerate(&polygon) {
        return Err(Error::DegenerateInput(
            "Skeleton needs at least 3 non-collinear vertices".to_string(),
        ));
    }

    let mut wavefront = Wavefront::new(&polygon);
    wavefront.run()?;

    let faces = wavefront.extract_faces()?;
    let skeleton = StraightSkeleton {
        polygon,
        nodes: wavefront.nodes,
        arcs: wavefront.arcs.into_iter().collect(),
        faces,
    };
    validate(&skeleton)?;

    tracing::trace!(
        vertices = skeleton.polygon.len(),
        nodes = skeleton.nodes.len(),
        arcs = skeleton.arcs.len(),
        "Built straight skeleton"
    );

    Ok(skeleton)
}

struct Edge {
    start: Point2<f64>,
    dir: Vector2<f64>,
    /// Inward unit normal
    normal: Vector2<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    origin: Point2<f64>,
    t0: f64,
    velocity: Vector2<f64>,
    /// Edge arriving at this vertex
    left: usize,
    /// Edge leaving this vertex
    right: usize,
    node: usize,
}

impl Vertex {
    #[inline]
    fn at(&self, time: f64) -> Point2<f64> {
        self.origin + self.velocity * (time - self.t0)
    }
}

#[derive(Debug, Clone, Copy)]
enum EventKind {
    /// Edge from `lav[index]` to the next vertex collapses
    Edge { lav: usize, index: usize },
    /// `lav[vertex]` hits the edge leaving `lav[edge]`
    Split { lav: usize, vertex: usize, edge: usize },
}

#[derive(Debug, Clone, Copy)]
struct Event {
    time: f64,
    point: Point2<f64>,
    kind: EventKind,
}

struct Wavefront {
    edges: Vec<Edge>,
    /// Active wavefront loops, counter-clockwise
    lavs: Vec<Vec<Vertex>>,
    nodes: Vec<SkeletonNode>,
    arcs: FxHashSet<(usize, usize)>,
    boundary: usize,
    /// Diagonal of the polygon bounds
    scale: f64,
    tol: f64,
}

impl Wavefront {
    fn new(polygon: &[Point2<f64>]) -> Self {
        let n = polygon.len();
        let edges: Vec<Edge> = (0..n)
            .map(|i| {
                let start = polygon[i];
                let dir = (polygon[(i + 1) % n] - start).normalize();
                Edge {
                    start,
                    dir,
                    normal: Vector2::new(-dir.y, dir.x),
                }
            })
            .collect();

        let scale = contour_bounds(polygon)
            .map(|(min, max)| (max - min).norm())
            .unwrap_or(1.0)
            .max(1.0);

        let nodes = polygon
            .iter()
            .map(|&position| SkeletonNode {
                position,
                height: 0.0,
            })
            .collect();

        let mut wavefront = Self {
            edges,
            lavs: Vec::new(),
            nodes,
            arcs: FxHashSet::default(),
            boundary: n,
            scale,
            tol: RELATIVE_TOLERANCE * scale,
        };

        let lav: Vec<Vertex> = (0..n)
            .map(|i| wavefront.vertex(polygon[i], 0.0, (i + n - 1) % n, i, i))
            .collect();
        wavefront.lavs.push(lav);
        wavefront
    }

    fn vertex(&self, origin: Point2<f64>, t0: f64, left: usize, right: usize, node: usize) -> Vertex {
        Vertex {
            origin,
            t0,
            velocity: self.velocity(left, right),
            left,
            right,
            node,
        }
    }

    /// Velocity keeping a vertex on both edges' offset lines: n_l.v = n_r.v = 1
    fn velocity(&self, left: usize, right: usize) -> Vector2<f64> {
        let nl = self.edges[left].normal;
        let nr = self.edges[right].normal;
        let det = nl.x * nr.y - nl.y * nr.x;

        if det.abs() < 1e-12 {
            // Collinear edges keep moving together, opposite edges have met
            return if nl.dot(&nr) > 0.0 { nl } else { Vector2::zeros() };
        }

        Vector2::new((nr.y - nl.y) / det, (nl.x - nr.x) / det)
    }

    fn is_reflex(&self, v: &Vertex) -> bool {
        let a = self.edges[v.left].dir;
        let b = self.edges[v.right].dir;
        a.x * b.y - a.y * b.x < -1e-9
    }

    fn node_at(&mut self, position: Point2<f64>, height: f64) -> usize {
        if let Some(i) = self
            .nodes
            .iter()
            .position(|n| (n.position - position).norm() <= self.tol * 10.0)
        {
            return i;
        }
        self.nodes.push(SkeletonNode { position, height });
        self.nodes.len() - 1
    }

    fn add_arc(&mut self, a: usize, b: usize) {
        if a != b {
            self.arcs.insert((a.min(b), a.max(b)));
        }
    }

    fn run(&mut self) -> Result<()> {
        let n = self.boundary;
        let limit = 8 * n * n + 64;
        let mut now = 0.0;

        for _ in 0..limit {
            if self.lavs.is_empty() {
                return Ok(());
            }
            let Some(event) = self.next_event(now) else {
                return Err(Error::SkeletonFailure(format!(
                    "Wavefront stalled at offset {:.6} with {} loops left",
                    now,
                    self.lavs.len()
                )));
            };
            now = event.time;
            match event.kind {
                EventKind::Edge { lav, index } => self.apply_edge(lav, index, event.time, event.point),
                EventKind::Split { lav, vertex, edge } => {
                    self.apply_split(lav, vertex, edge, event.time, event.point)
                }
            }
            self.collapse_flat_loops(now);
        }

        Err(Error::SkeletonFailure(format!(
            "Wavefront did not collapse after {} events",
            limit
        )))
    }

    fn next_event(&self, now: f64) -> Option<Event> {
        let mut best: Option<Event> = None;
        let mut consider = |event: Event| {
            let replace = match &best {
                None => true,
                Some(current) => {
                    if (event.time - current.time).abs() <= self.tol {
                        // Simultaneous: edge events go first
                        matches!(event.kind, EventKind::Edge { .. })
                            && matches!(current.kind, EventKind::Split { .. })
                    } else {
                        event.time < current.time
                    }
                }
            };
            if replace {
                best = Some(event);
            }
        };

        for (li, lav) in self.lavs.iter().enumerate() {
            let n = lav.len();

            for i in 0..n {
                let a = &lav[i];
                let b = &lav[(i + 1) % n];
                let edge = &self.edges[a.right];
                let (pa, pb) = (a.at(now), b.at(now));
                let length = (pb - pa).dot(&edge.dir);

                let time = if (pb - pa).norm() <= self.tol || length <= self.tol {
                    now
                } else {
                    let rate = (b.velocity - a.velocity).dot(&edge.dir);
                    if rate >= -1e-12 {
                        continue;
                    }
                    now + length / -rate
                };

                consider(Event {
                    time,
                    point: nalgebra::center(&a.at(time), &b.at(time)),
                    kind: EventKind::Edge { lav: li, index: i },
                });
            }

            if n <= 3 {
                continue;
            }

            for (vi, v) in lav.iter().enumerate() {
                if !self.is_reflex(v) {
                    continue;
                }
                let pv = v.at(now);

                for j in 0..n {
                    let next = (j + 1) % n;
                    if j == vi || next == vi {
                        continue;
                    }
                    let e_index = lav[j].right;
                    if e_index == v.left || e_index == v.right {
                        continue;
                    }
                    let edge = &self.edges[e_index];

                    let ahead = edge.normal.dot(&(pv - edge.start)) - now;
                    let closing = 1.0 - edge.normal.dot(&v.velocity);
                    if closing <= 1e-12 || ahead < -self.tol {
                        continue;
                    }

                    let time = now + ahead.max(0.0) / closing;
                    let point = v.at(time);
                    let e1 = lav[j].at(time);
                    let e2 = lav[next].at(time);
                    let along = (point - e1).dot(&edge.dir);
                    let span = (e2 - e1).dot(&edge.dir);
                    if along < -self.tol || along > span + self.tol {
                        continue;
                    }

                    consider(Event {
                        time,
                        point,
                        kind: EventKind::Split {
                            lav: li,
                            vertex: vi,
                            edge: j,
                        },
                    });
                }
            }
        }

        best
    }

    fn apply_edge(&mut self, li: usize, i: usize, time: f64, point: Point2<f64>) {
        let node = self.node_at(point, time);

        if self.lavs[li].len() <= 3 {
            // The whole loop collapses into this event
            let lav = self.lavs.swap_remove(li);
            for v in lav {
                self.add_arc(v.node, node);
            }
            return;
        }

        let n = self.lavs[li].len();
        let j = (i + 1) % n;
        let (a, b) = (self.lavs[li][i], self.lavs[li][j]);
        self.add_arc(a.node, node);
        self.add_arc(b.node, node);

        let merged = self.vertex(point, time, a.left, b.right, node);
        let lav = &mut self.lavs[li];
        lav[i] = merged;
        lav.remove(j);
    }

    fn apply_split(&mut self, li: usize, vi: usize, j: usize, time: f64, point: Point2<f64>) {
        let lav = self.lavs.swap_remove(li);
        let n = lav.len();
        let v = lav[vi];
        let e = lav[j].right;

        let node = self.node_at(point, time);
        self.add_arc(v.node, node);

        // Loop through the vertex's right side, closed by the hit edge's first half
        let mut first = vec![self.vertex(point, time, e, v.right, node)];
        let mut k = (vi + 1) % n;
        loop {
            first.push(lav[k]);
            if k == j {
                break;
            }
            k = (k + 1) % n;
        }

        // Loop through the hit edge's second half back to the vertex's left side
        let mut second = vec![self.vertex(point, time, v.left, e, node)];
        let mut k = (j + 1) % n;
        while k != vi {
            second.push(lav[k]);
            k = (k + 1) % n;
        }

        self.push_lav(first);
        self.push_lav(second);
    }

    fn push_lav(&mut self, lav: Vec<Vertex>) {
        // Loops under three vertices are flat and closed by `collapse_flat_loops`
        if !lav.is_empty() {
            self.lavs.push(lav);
        }
    }

    /// Retire loops whose wavefront has no area left at `time`.
    ///
    /// Two opposite edges meeting (the wing of a T or H) leave such a loop
    /// behind: its vertices sit on a segment or a tree of segments and no
    /// further edge or split event fires. Each vertex is carried to its
    /// current position and the loop's outline becomes skeleton arcs.
    fn collapse_flat_loops(&mut self, time: f64) {
        let mut k = 0;
        while k < self.lavs.len() {
            let points: Vec<Point2<f64>> = self.lavs[k].iter().map(|v| v.at(time)).collect();
            if points.len() >= 3 && compute_signed_area(&points).abs() > self.tol * self.scale {
                k += 1;
                continue;
            }

            let lav = self.lavs.swap_remove(k);
            let mut nodes = Vec::with_capacity(lav.len());
            for (v, &p) in lav.iter().zip(&points) {
                let node = self.node_at(p, time);
                self.add_arc(v.node, node);
                nodes.push(node);
            }
            for i in 0..nodes.len() {
                self.add_path(nodes[i], nodes[(i + 1) % nodes.len()], &nodes);
            }
        }
    }

    /// Arcs from `a` to `b`, broken at any of `stops` lying on the segment
    fn add_path(&mut self, a: usize, b: usize, stops: &[usize]) {
        if a == b {
            return;
        }
        let pa = self.nodes[a].position;
        let ab = self.nodes[b].position - pa;
        let length = ab.norm();

        let mut between: Vec<(f64, usize)> = stops
            .iter()
            .filter(|&&s| s != a && s != b)
            .filter_map(|&s| {
                let ap = self.nodes[s].position - pa;
                let along = ap.dot(&ab) / length;
                let off = (ap.x * ab.y - ap.y * ab.x).abs() / length;
                (along > self.tol && along < length - self.tol && off <= self.tol * 10.0)
                    .then_some((along, s))
            })
            .collect();
        between.sort_by(|x, y| x.0.total_cmp(&y.0));
        between.dedup_by_key(|x| x.1);

        let mut prev = a;
        for (_, s) in between {
            self.add_arc(prev, s);
            prev = s;
        }
        self.add_arc(prev, b);
    }

    /// Walk each edge's face, keeping it on the left
    fn extract_faces(&self) -> Result<Vec<Vec<usize>>> {
        let n = self.boundary;
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for i in 0..n {
            adjacency[i].push((i + 1) % n);
            adjacency[(i + 1) % n].push(i);
        }
        for &(a, b) in &self.arcs {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }

        (0..n)
            .map(|i| {
                let mut face = vec![i, (i + 1) % n];
                let (mut prev, mut cur) = (i, (i + 1) % n);

                for _ in 0..=self.nodes.len() {
                    let next = self.turn(&adjacency, prev, cur)?;
                    if next == i {
                        return Ok(face);
                    }
                    if next < n {
                        return Err(Error::SkeletonFailure(format!(
                            "Face of edge {} reaches polygon vertex {}",
                            i, next
                        )));
                    }
                    face.push(next);
                    prev = cur;
                    cur = next;
                }

                Err(Error::SkeletonFailure(format!("Face of edge {} does not close", i)))
            })
            .collect()
    }

    /// Next node around a face: first clockwise turn from the way back
    fn turn(&self, adjacency: &[Vec<usize>], prev: usize, cur: usize) -> Result<usize> {
        let origin = self.nodes[cur].position;
        let angle = |node: usize| {
            let d = self.nodes[node].position - origin;
            d.y.atan2(d.x)
        };
        let back = angle(prev);

        adjacency[cur]
            .iter()
            .copied()
            .filter(|&c| c != prev)
            .map(|c| {
                let mut turn = (back - angle(c)).rem_euclid(TAU);
                if turn <= 0.0 {
                    turn = TAU;
                }
                (c, turn)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
            .ok_or_else(|| Error::SkeletonFailure(format!("Dead end at skeleton node {}", cur)))
    }
}

fn validate(skeleton: &StraightSkeleton) -> Result<()> {
    let expected = compute_signed_area(&skeleton.polygon);
    let mut total = 0.0;

    for i in 0..skeleton.faces.len() {
        let area = compute_signed_area(&skeleton.face_polygon(i));
        if area < -AREA_TOLERANCE * expected {
            return Err(Error::SkeletonFailure(format!(
                "Face of edge {} is inverted",
                i
            )));
        }
        total += area;
    }

    if (total - expected).abs() > AREA_TOLERANCE * expected.max(1.0) {
        return Err(Error::SkeletonFailure(format!(
            "Faces cover {:.6} of polygon area {:.6}",
            total, expected
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::rectangle;
    use approx::assert_relative_eq;

    fn rect(w: f64, h: f64) -> Contour {
        rectangle(Point2::new(0.0, 0.0), Point2::new(w, h))
    }

    fn face_area_sum(skeleton: &StraightSkeleton) -> f64 {
        (0..skeleton.faces.len())
            .map(|i| compute_signed_area(&skeleton.face_polygon(i)))
            .sum()
    }

    #[test]
    fn test_square_is_a_pyramid() {
        let skeleton = straight_skeleton(&rect(10.0, 10.0)).unwrap();

        assert_eq!(skeleton.nodes.len(), 5);
        assert_eq!(skeleton.arcs.len(), 4);
        assert_relative_eq!(skeleton.nodes[4].position.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.nodes[4].position.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.max_height(), 5.0, epsilon = 1e-9);
        assert!(skeleton.faces.iter().all(|f| f.len() == 3));
    }

    #[test]
    fn test_rectangle_ridge_follows_long_side() {
        let skeleton = straight_skeleton(&rect(10.0, 6.0)).unwrap();

        let ridges: Vec<_> = skeleton.ridges().collect();
        assert_eq!(ridges.len(), 1);
        let (a, b) = ridges[0];
        let (pa, pb) = (skeleton.nodes[a].position, skeleton.nodes[b].position);
        assert_relative_eq!(pa.y, 3.0, epsilon = 1e-9);
        assert_relative_eq!(pb.y, 3.0, epsilon = 1e-9);
        assert_relative_eq!((pa.x - pb.x).abs(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.max_height(), 3.0, epsilon = 1e-9);

        // Long sides get trapezoids, short sides triangles
        assert_eq!(skeleton.faces[0].len(), 4);
        assert_eq!(skeleton.faces[1].len(), 3);
        assert_eq!(skeleton.faces[2].len(), 4);
        assert_eq!(skeleton.faces[3].len(), 3);
    }

    #[test]
    fn test_l_shape() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let skeleton = straight_skeleton(&ring).unwrap();

        assert_eq!(skeleton.faces.len(), 6);
        assert_relative_eq!(face_area_sum(&skeleton), 12.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.max_height(), 1.0, epsilon = 1e-9);
        // The reflex corner connects to the inner corner of the arms
        let reflex_arc = skeleton.arcs.iter().find(|&&(a, b)| a == 3 || b == 3).unwrap();
        let other = if reflex_arc.0 == 3 { reflex_arc.1 } else { reflex_arc.0 };
        assert_relative_eq!(skeleton.nodes[other].position.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.nodes[other].position.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_u_shape_faces_tile_polygon() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(6.0, 4.0),
            Point2::new(4.0, 4.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(0.0, 4.0),
        ];
        let skeleton = straight_skeleton(&ring).unwrap();

        assert_relative_eq!(face_area_sum(&skeleton), 20.0, epsilon = 1e-9);
        // Face under the notch is the trapezoid down to the base ridge
        assert_relative_eq!(compute_signed_area(&skeleton.face_polygon(4)), 3.0, epsilon = 1e-9);
    }

    /// Total length of arcs lying on the segment `a`-`b`
    fn arc_length_along(skeleton: &StraightSkeleton, a: Point2<f64>, b: Point2<f64>) -> f64 {
        let ab = b - a;
        let on = |p: Point2<f64>| {
            let ap = p - a;
            let t = ap.dot(&ab) / ab.norm_squared();
            (ap.x * ab.y - ap.y * ab.x).abs() < 1e-6 && (-1e-9..=1.0 + 1e-9).contains(&t)
        };
        skeleton
            .arcs
            .iter()
            .map(|&(x, y)| (skeleton.nodes[x].position, skeleton.nodes[y].position))
            .filter(|&(px, py)| on(px) && on(py))
            .map(|(px, py)| (py - px).norm())
            .sum()
    }

    fn t_shape(stem: f64, bar: f64) -> Contour {
        let (x0, x1) = (3.0, 3.0 + stem);
        let width = x1 + 3.0;
        vec![
            Point2::new(x0, 0.0),
            Point2::new(x1, 0.0),
            Point2::new(x1, 2.0),
            Point2::new(width, 2.0),
            Point2::new(width, 2.0 + bar),
            Point2::new(0.0, 2.0 + bar),
            Point2::new(0.0, 2.0),
            Point2::new(x0, 2.0),
        ]
    }

    #[test]
    fn test_t_shape_wings_collapse() {
        let ring = t_shape(2.0, 2.0);
        let skeleton = straight_skeleton(&ring).unwrap();

        assert_eq!(skeleton.faces.len(), 8);
        assert_relative_eq!(face_area_sum(&skeleton), 4.0 + 16.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.max_height(), 1.0, epsilon = 1e-9);
        // Stem ridge runs up into the bar ridge
        let stem = arc_length_along(&skeleton, Point2::new(4.0, 1.0), Point2::new(4.0, 3.0));
        assert_relative_eq!(stem, 2.0, epsilon = 1e-9);
        let bar = arc_length_along(&skeleton, Point2::new(1.0, 3.0), Point2::new(7.0, 3.0));
        assert_relative_eq!(bar, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_t_shape_with_thick_bar() {
        let ring = t_shape(3.0, 4.0);
        let skeleton = straight_skeleton(&ring).unwrap();

        assert_relative_eq!(face_area_sum(&skeleton), 6.0 + 36.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.max_height(), 2.0, epsilon = 1e-9);
        let stem = arc_length_along(&skeleton, Point2::new(4.5, 1.5), Point2::new(4.5, 4.0));
        assert_relative_eq!(stem, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_h_shape_faces_tile_polygon() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(4.0, 2.0),
            Point2::new(4.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(6.0, 6.0),
            Point2::new(4.0, 6.0),
            Point2::new(4.0, 4.0),
            Point2::new(2.0, 4.0),
            Point2::new(2.0, 6.0),
            Point2::new(0.0, 6.0),
        ];
        let skeleton = straight_skeleton(&ring).unwrap();

        assert_eq!(skeleton.faces.len(), 12);
        assert_relative_eq!(face_area_sum(&skeleton), 28.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.max_height(), 1.0, epsilon = 1e-9);
        // Crossbar ridge joins the two post ridges
        for (a, b) in [((1.0, 1.0), (1.0, 5.0)), ((5.0, 1.0), (5.0, 5.0)), ((1.0, 3.0), (5.0, 3.0))] {
            let length = arc_length_along(&skeleton, Point2::new(a.0, a.1), Point2::new(b.0, b.1));
            assert_relative_eq!(length, 4.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_triangle_meets_at_incenter() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 3.0),
        ];
        let skeleton = straight_skeleton(&ring).unwrap();

        // Inradius of a 3-4-5 triangle
        assert_eq!(skeleton.nodes.len(), 4);
        assert_relative_eq!(skeleton.nodes[3].height, 1.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.nodes[3].position.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(skeleton.nodes[3].position.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_vertices_are_dropped() {
        let mut ring = rect(10.0, 6.0);
        ring.insert(1, Point2::new(5.0, 0.0));
        let skeleton = straight_skeleton(&ring).unwrap();
        assert_eq!(skeleton.polygon.len(), 4);
        assert_eq!(skeleton.faces.len(), 4);
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)];
        assert!(matches!(straight_skeleton(&line), Err(Error::DegenerateInput(_))));
    }
}
