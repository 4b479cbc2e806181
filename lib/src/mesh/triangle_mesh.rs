//! Indexed triangle mesh.
//!
//! A mesh is an ordered vertex list plus a flat index list, three indices
//! per triangle. The mesh is the immutable input to the query index; the
//! index build validates it once and then trusts the invariants.

use crate::geometry::{BoundingBox, Triangle};
use crate::{Coord, Error, Point3, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A triangle mesh represented as an indexed triangle set.
///
/// # Invariants
///
/// - `indices.len()` is a multiple of 3
/// - every index lies in `[0, vertices.len())`
///
/// Both are enforced by [`TriangleMesh::validate`], which
/// [`TriangleMesh::from_parts`] and the index build run. Meshes built
/// incrementally with [`TriangleMesh::add_vertex`] /
/// [`TriangleMesh::add_triangle`] are validated at build time.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    vertices: Vec<Point3>,
    indices: Vec<i32>,
}

impl TriangleMesh {
    /// Create a new empty mesh.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with preallocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(triangle_count * 3),
        }
    }

    /// Create a mesh from vertices and a flat index list, validating the
    /// structural invariants.
    pub fn from_parts(vertices: Vec<Point3>, indices: Vec<i32>) -> Result<Self> {
        let mesh = Self { vertices, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Check the structural invariants: triangle list length and index
    /// range.
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(Error::Mesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        for (i, &idx) in self.indices.iter().enumerate() {
            if idx < 0 || idx as usize >= self.vertices.len() {
                return Err(Error::Mesh(format!(
                    "index {} at position {} is out of range for {} vertices",
                    idx,
                    i,
                    self.vertices.len()
                )));
            }
        }
        Ok(())
    }

    /// Get the vertices of the mesh.
    #[inline]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Get the flat triangle index list.
    #[inline]
    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    /// Get the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, v: Point3) -> i32 {
        let idx = self.vertices.len() as i32;
        self.vertices.push(v);
        idx
    }

    /// Add a triangle from vertex indices.
    pub fn add_triangle(&mut self, v0: i32, v1: i32, v2: i32) {
        self.indices.extend_from_slice(&[v0, v1, v2]);
    }

    /// Get the three vertices of a triangle.
    ///
    /// Assumes a validated mesh; panics on a bad index.
    #[inline]
    pub fn triangle_vertices(&self, tri_idx: usize) -> [Point3; 3] {
        let base = tri_idx * 3;
        [
            self.vertices[self.indices[base] as usize],
            self.vertices[self.indices[base + 1] as usize],
            self.vertices[self.indices[base + 2] as usize],
        ]
    }

    /// Get a triangle by index, in the mesh's winding order.
    #[inline]
    pub fn triangle(&self, tri_idx: usize) -> Triangle {
        let [v0, v1, v2] = self.triangle_vertices(tri_idx);
        Triangle::new(v0, v1, v2)
    }

    /// Iterate over the triangles of the mesh.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(|i| self.triangle(i))
    }

    /// An axis-aligned cube spanning `[0, size]` on every axis, two
    /// triangles per face with outward winding.
    pub fn cube(size: Coord) -> Self {
        let s = size;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(s, 0.0, 0.0),
            Point3::new(s, s, 0.0),
            Point3::new(0.0, s, 0.0),
            Point3::new(0.0, 0.0, s),
            Point3::new(s, 0.0, s),
            Point3::new(s, s, s),
            Point3::new(0.0, s, s),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1,  0, 3, 2, // bottom
            4, 5, 6,  4, 6, 7, // top
            0, 1, 5,  0, 5, 4, // front
            2, 3, 7,  2, 7, 6, // back
            0, 4, 7,  0, 7, 3, // left
            1, 2, 6,  1, 6, 5, // right
        ];
        Self { vertices, indices }
    }

    /// Compute the bounding box of all vertices.
    pub fn compute_bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for v in &self.vertices {
            bb.enlarge(&BoundingBox::from_point(*v));
        }
        bb
    }
}

impl fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TriangleMesh({} vertices, {} triangles)",
            self.vertex_count(),
            self.triangle_count()
        )
    }
}
