//! Closest-point-on-mesh queries.
//!
//! [`ClosestPointQuery`] owns the triangle storage and the R*-tree over
//! the triangle bounding boxes. Build once, query many times; the index
//! is immutable after construction and safe to share across threads.

use crate::geometry::{ClosestCandidate, Triangle};
use crate::mesh::TriangleMesh;
use crate::rtree::{Node, NodeId, RStarTree};
use crate::{Coord, Error, Point3, Result};
use rayon::prelude::*;

/// An immutable closest-point index over a triangle mesh.
///
/// Leaf entries of the tree store indices into the owned triangle
/// buffer, which is reserved to its final size up front and never
/// resized afterwards.
pub struct ClosestPointQuery {
    triangles: Vec<Triangle>,
    tree: RStarTree,
}

impl ClosestPointQuery {
    /// Build the index from a mesh.
    ///
    /// Validates the mesh first; an invalid mesh aborts the build.
    pub fn new(mesh: &TriangleMesh) -> Result<Self> {
        mesh.validate()?;

        let mut triangles = Vec::with_capacity(mesh.triangle_count());
        let mut tree = RStarTree::with_capacity(mesh.triangle_count());
        for triangle in mesh.triangles() {
            let index = triangles.len() as u32;
            tree.insert(triangle.bounding_box(), index);
            triangles.push(triangle);
        }
        Ok(Self { triangles, tree })
    }

    /// Number of triangles in the index.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// The underlying spatial index.
    #[inline]
    pub fn tree(&self) -> &RStarTree {
        &self.tree
    }

    /// Find the closest point on the mesh to `query_point` within
    /// `max_dist`.
    ///
    /// Returns `Ok(Some(p))` iff a surface point within the radius
    /// exists, with `p` the optimal one; `Ok(None)` otherwise (including
    /// on an empty mesh). A negative or NaN `max_dist` or a non-finite
    /// query point is an error.
    pub fn closest_point(&self, query_point: Point3, max_dist: Coord) -> Result<Option<Point3>> {
        if !(max_dist >= 0.0) {
            return Err(Error::Query(format!(
                "max_dist must be non-negative, got {max_dist}"
            )));
        }
        if !query_point.is_finite() {
            return Err(Error::Query(format!(
                "query point must be finite, got {query_point}"
            )));
        }

        let mut best = ClosestCandidate::unset();
        if let Some(root) = self.tree.root() {
            self.visit(root, &query_point, max_dist, &mut best);
        }

        let limit = (max_dist as f64) * (max_dist as f64);
        if best.is_found() && best.distance2 <= limit {
            Ok(Some(best.point))
        } else {
            Ok(None)
        }
    }

    /// Resolve a batch of `(query_point, max_dist)` queries in parallel
    /// over the shared index.
    pub fn closest_points(&self, queries: &[(Point3, Coord)]) -> Result<Vec<Option<Point3>>> {
        queries
            .par_iter()
            .map(|&(query_point, max_dist)| self.closest_point(query_point, max_dist))
            .collect()
    }

    /// Indices of all triangles whose closest point to `query_point`
    /// lies within `max_dist`.
    pub fn triangles_within_distance(
        &self,
        query_point: Point3,
        max_dist: Coord,
    ) -> Result<Vec<u32>> {
        self.validate_radius_query(&query_point, max_dist)?;
        let limit = (max_dist as f64) * (max_dist as f64);
        let mut found = Vec::new();
        self.tree.search_radius(&query_point, max_dist, |index| {
            let mut best = ClosestCandidate::unset();
            self.triangles[index as usize].closest_point_update(&query_point, &mut best);
            if best.distance2 <= limit {
                found.push(index);
            }
            true
        });
        Ok(found)
    }

    /// True when any triangle lies within `max_dist` of `query_point`.
    /// Stops at the first hit.
    pub fn any_triangle_within_distance(
        &self,
        query_point: Point3,
        max_dist: Coord,
    ) -> Result<bool> {
        self.validate_radius_query(&query_point, max_dist)?;
        let limit = (max_dist as f64) * (max_dist as f64);
        let completed = self.tree.search_radius(&query_point, max_dist, |index| {
            let mut best = ClosestCandidate::unset();
            self.triangles[index as usize].closest_point_update(&query_point, &mut best);
            best.distance2 > limit
        });
        Ok(!completed)
    }

    fn validate_radius_query(&self, query_point: &Point3, max_dist: Coord) -> Result<()> {
        if !(max_dist >= 0.0) {
            return Err(Error::Query(format!(
                "max_dist must be non-negative, got {max_dist}"
            )));
        }
        if !query_point.is_finite() {
            return Err(Error::Query(format!(
                "query point must be finite, got {query_point}"
            )));
        }
        Ok(())
    }

    /// Depth-first descent with double pruning: children further than
    /// the search radius are skipped, and so are children that cannot
    /// beat the best distance found so far. Leaves feed the triangle
    /// kernel, which shares the same best-so-far threshold.
    fn visit(&self, node: NodeId, query_point: &Point3, max_dist: Coord, best: &mut ClosestCandidate) {
        let Node::Internal { children, .. } = self.tree.node(node) else {
            return;
        };
        for &child in children {
            let distance = self.tree.node(child).bound().exterior_distance(query_point);
            if distance > max_dist {
                continue;
            }
            let distance2 = (distance as f64) * (distance as f64);
            if distance2 > best.distance2 {
                continue;
            }
            match self.tree.node(child) {
                Node::Leaf { data, .. } => {
                    self.triangles[*data as usize].closest_point_update(query_point, best);
                }
                Node::Internal { .. } => self.visit(child, query_point, max_dist, best),
            }
        }
    }
}
