// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::contour::planar_uv;
use nalgebra::{Point2, Point3, Vector3};

/// Triangle mesh handed back to the host
///
/// Positions, normals and UVs are flat arrays; the host owns the mesh once
/// returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Texture coordinates (u, v)
    pub uvs: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            uvs: Vec::with_capacity(vertex_count * 2),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal and texture coordinate, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>, uv: Point2<f64>) -> u32 {
        let index = self.vertex_count() as u32;

        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);

        self.uvs.push(uv.x as f32);
        self.uvs.push(uv.y as f32);

        index
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Add a flat triangle whose winding faces `normal`
    pub fn add_facing_triangle(
        &mut self,
        corners: [Point3<f64>; 3],
        normal: Vector3<f64>,
        tile: (f64, f64),
    ) {
        let face = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        if face.norm() <= 1e-12 {
            return;
        }
        let [i0, i1, i2] = corners.map(|c| self.add_vertex(c, normal, planar_uv(&c, &normal, tile)));
        if face.dot(&normal) >= 0.0 {
            self.add_triangle(i0, i1, i2);
        } else {
            self.add_triangle(i0, i2, i1);
        }
    }

    /// Add a planar quad (corners in ring order) whose winding faces `normal`
    pub fn add_facing_quad(
        &mut self,
        corners: [Point3<f64>; 4],
        uvs: [Point2<f64>; 4],
        normal: Vector3<f64>,
    ) {
        let face = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        let face = if face.norm() > 1e-12 {
            face
        } else {
            (corners[2] - corners[0]).cross(&(corners[3] - corners[0]))
        };
        if face.norm() <= 1e-12 {
            return;
        }

        let base = self.vertex_count() as u32;
        for (corner, uv) in corners.iter().zip(uvs.iter()) {
            self.add_vertex(*corner, normal, *uv);
        }

        if face.dot(&normal) >= 0.0 {
            self.add_triangle(base, base + 1, base + 2);
            self.add_triangle(base, base + 2, base + 3);
        } else {
            self.add_triangle(base, base + 2, base + 1);
            self.add_triangle(base, base + 3, base + 2);
        }
    }

    /// Reverse the winding of every triangle
    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = (self.positions.len() / 3) as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.uvs.reserve(other.uvs.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);

        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Batch merge multiple meshes at once (more efficient than individual merges)
    #[inline]
    pub fn merge_all(&mut self, meshes: &[Mesh]) {
        let total_positions: usize = meshes.iter().map(|m| m.positions.len()).sum();
        let total_uvs: usize = meshes.iter().map(|m| m.uvs.len()).sum();
        let total_indices: usize = meshes.iter().map(|m| m.indices.len()).sum();

        self.positions.reserve(total_positions);
        self.normals.reserve(total_positions);
        self.uvs.reserve(total_uvs);
        self.indices.reserve(total_indices);

        for mesh in meshes {
            self.merge(mesh);
        }
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of a vertex in f64
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        Point3::new(
            self.positions[index * 3] as f64,
            self.positions[index * 3 + 1] as f64,
            self.positions[index * 3 + 2] as f64,
        )
    }

    /// Sum of triangle areas
    pub fn surface_area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| {
                let a = self.position(t[0] as usize);
                let b = self.position(t[1] as usize);
                let c = self.position(t[2] as usize);
                0.5 * (b - a).cross(&(c - a)).norm()
            })
            .sum()
    }

    /// Calculate bounds (min, max) - optimized with chunk iteration
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Recompute every UV by planar projection of its vertex along its normal
    pub fn generate_uvs(&mut self, tile: (f64, f64)) {
        let count = self.vertex_count();
        self.uvs.clear();
        self.uvs.reserve(count * 2);
        for i in 0..count {
            let position = self.position(i);
            let normal = Vector3::new(
                self.normals[i * 3] as f64,
                self.normals[i * 3 + 1] as f64,
                self.normals[i * 3 + 2] as f64,
            );
            let uv = planar_uv(&position, &normal, tile);
            self.uvs.push(uv.x as f32);
            self.uvs.push(uv.y as f32);
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = Mesh::new();
        let index = mesh.add_vertex(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, 1.0),
            Point2::new(0.5, 0.25),
        );
        assert_eq!(index, 0);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.positions, vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0]);
        assert_eq!(mesh.uvs, vec![0.5, 0.25]);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut mesh1 = Mesh::new();
        mesh1.add_facing_triangle(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            Vector3::z(),
            (1.0, 1.0),
        );

        let mut mesh2 = mesh1.clone();
        mesh2.flip_winding();

        mesh1.merge(&mesh2);
        assert_eq!(mesh1.vertex_count(), 6);
        assert_eq!(mesh1.triangle_count(), 2);
        assert_eq!(&mesh1.indices[3..], &[3, 5, 4]);
        assert_eq!(mesh1.uvs.len(), 12);
    }

    #[test]
    fn test_facing_quad_winding_follows_normal() {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 3.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ];
        let uvs = [Point2::origin(); 4];

        let mut mesh = Mesh::new();
        mesh.add_facing_quad(corners, uvs, -Vector3::z());

        let a = mesh.position(mesh.indices[0] as usize);
        let b = mesh.position(mesh.indices[1] as usize);
        let c = mesh.position(mesh.indices[2] as usize);
        assert!((b - a).cross(&(c - a)).z < 0.0);
        assert!((mesh.surface_area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_generate_uvs() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(4.0, 0.0, 2.0), Vector3::y(), Point2::origin());
        mesh.generate_uvs((2.0, 2.0));
        assert_eq!(mesh.uvs, vec![2.0, 1.0]);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(-1.0, 2.0, 0.0), Vector3::z(), Point2::origin());
        mesh.add_vertex(Point3::new(3.0, -2.0, 5.0), Vector3::z(), Point2::origin());
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3::new(3.0, 2.0, 5.0));
    }
}
