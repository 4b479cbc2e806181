//! Triangle record and the point-to-triangle kernel.
//!
//! The kernel computes the closest point on a triangle to a query point
//! by projecting onto the supporting plane and falling back to the edges
//! when the projection lands outside. It updates a shared best-so-far
//! candidate so the caller's pruning threshold doubles as the kernel's
//! own early exit.

use crate::geometry::BoundingBox;
use crate::Point3;
use serde::{Deserialize, Serialize};

/// A triangle given by three vertices in winding order.
///
/// The winding order fixes the sign of the face normal, which the kernel
/// relies on to classify the projected query point against each edge.
/// Triangles are created during the index build and stored at stable
/// indices for the lifetime of the index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Point3; 3],
}

/// Best closest-point candidate seen so far during one query.
///
/// `distance2` is carried in double precision over the single-precision
/// geometry and only ever decreases.
#[derive(Clone, Copy, Debug)]
pub struct ClosestCandidate {
    pub point: Point3,
    pub distance2: f64,
}

impl ClosestCandidate {
    /// An unset candidate; any real distance improves it.
    #[inline]
    pub fn unset() -> Self {
        Self {
            point: Point3::zero(),
            distance2: f64::MAX,
        }
    }

    /// True once any triangle has contributed a point.
    #[inline]
    pub fn is_found(&self) -> bool {
        self.distance2 != f64::MAX
    }
}

impl Triangle {
    /// Create a triangle from three vertices in winding order.
    #[inline]
    pub const fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// The tight axis-aligned bounding box of the triangle.
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_triangle(&self.vertices[0], &self.vertices[1], &self.vertices[2])
    }

    /// The unit face normal; non-finite for degenerate triangles.
    #[inline]
    pub fn normal(&self) -> Point3 {
        let [a, b, c] = self.vertices;
        (b - a).cross(&(c - a)).normalized()
    }

    /// Update `best` with the closest point on this triangle to `query`,
    /// if it improves on the candidate.
    ///
    /// The plane distance check exits before any edge work when this
    /// triangle cannot beat the current candidate, so passing the same
    /// candidate across many triangles prunes progressively harder.
    pub fn closest_point_update(&self, query: &Point3, best: &mut ClosestCandidate) {
        let vert = &self.vertices;
        let normal = (vert[1] - vert[0]).cross(&(vert[2] - vert[0])).normalized();
        if !normal.is_finite() {
            // Zero-area triangle: no usable plane, but the edges still
            // carry well-defined closest points.
            self.closest_point_on_edges(query, best);
            return;
        }

        let projection = normal * (vert[0] - *query).dot(&normal);
        let distance_to_plane = projection.length_squared() as f64;
        let projected = *query + projection;
        if distance_to_plane > best.distance2 {
            return;
        }

        let mut outside_count = 0u8;
        for i in 0..3 {
            let v1 = vert[i];
            let v2 = vert[(i + 1) % 3];
            let outside = (v1 - projected).cross(&(v2 - projected)).dot(&normal) < 0.0;
            if outside {
                outside_count += 1;
                let t = ((v2 - v1).dot(&(projected - v1)) / v1.distance_squared(&v2))
                    .clamp(0.0, 1.0);
                let closest_on_edge = v1 * (1.0 - t) + v2 * t;
                let distance_to_edge = query.distance_squared(&closest_on_edge) as f64;
                if distance_to_edge < best.distance2 {
                    best.point = closest_on_edge;
                    best.distance2 = distance_to_edge;
                }
            }
            // A projected point lies outside at most two edges.
            if outside_count > 1 {
                break;
            }
        }
        if outside_count == 0 {
            best.point = projected;
            best.distance2 = distance_to_plane;
        }
    }

    /// The closest point on this triangle to `query`, unconditionally.
    pub fn closest_point(&self, query: &Point3) -> Point3 {
        let mut best = ClosestCandidate::unset();
        self.closest_point_update(query, &mut best);
        best.point
    }

    /// Edge-only evaluation for degenerate triangles: each edge's
    /// closest point to the query itself, with zero-length edges
    /// collapsing to their start vertex.
    fn closest_point_on_edges(&self, query: &Point3, best: &mut ClosestCandidate) {
        let vert = &self.vertices;
        for i in 0..3 {
            let v1 = vert[i];
            let v2 = vert[(i + 1) % 3];
            let length2 = v1.distance_squared(&v2);
            let t = if length2 > 0.0 {
                ((v2 - v1).dot(&(*query - v1)) / length2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest_on_edge = v1 * (1.0 - t) + v2 * t;
            let distance_to_edge = query.distance_squared(&closest_on_edge) as f64;
            if distance_to_edge < best.distance2 {
                best.point = closest_on_edge;
                best.distance2 = distance_to_edge;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_triangle() -> Triangle {
        Triangle::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
        )
    }

    fn closest(tri: &Triangle, q: Point3) -> (Point3, f64) {
        let mut best = ClosestCandidate::unset();
        tri.closest_point_update(&q, &mut best);
        assert!(best.is_found());
        (best.point, best.distance2)
    }

    #[test]
    fn test_bounding_box() {
        let bb = reference_triangle().bounding_box();
        assert_eq!(bb.min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(bb.max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_interior_projection() {
        let (p, d2) = closest(&reference_triangle(), Point3::new(0.0, 0.5, 1.0));
        assert_eq!(p, Point3::new(0.0, 0.5, 0.0));
        assert!((d2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_coplanar_interior_point() {
        let (p, d2) = closest(&reference_triangle(), Point3::new(0.0, 0.5, 0.0));
        assert_eq!(p, Point3::new(0.0, 0.5, 0.0));
        assert!(d2 < 1e-12);
    }

    #[test]
    fn test_edge_projection() {
        let (p, _) = closest(&reference_triangle(), Point3::new(0.0, -1.0, 1.0));
        assert_eq!(p, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_vertex_projection() {
        let (p, _) = closest(&reference_triangle(), Point3::new(1.0, -1.0, 1.0));
        assert_eq!(p, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_plane_distance_early_exit() {
        let tri = reference_triangle();
        let mut best = ClosestCandidate {
            point: Point3::zero(),
            distance2: 0.25,
        };
        // Plane distance is 1.0 > 0.25, the candidate must not move.
        tri.closest_point_update(&Point3::new(0.0, 0.5, 1.0), &mut best);
        assert_eq!(best.point, Point3::zero());
        assert_eq!(best.distance2, 0.25);
    }

    #[test]
    fn test_degenerate_line_triangle() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        );
        let (p, d2) = closest(&tri, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(p, Point3::new(1.0, 0.0, 0.0));
        assert!((d2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_point_triangle() {
        let v = Point3::new(1.0, 2.0, 3.0);
        let tri = Triangle::new(v, v, v);
        let (p, d2) = closest(&tri, Point3::new(1.0, 2.0, 5.0));
        assert_eq!(p, v);
        assert!((d2 - 4.0).abs() < 1e-6);
    }
}
