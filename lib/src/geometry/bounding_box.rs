//! 3D axis-aligned bounding box.
//!
//! Provides the box algebra the R*-tree is built on: union, strict
//! overlap, containment, and the three cost metrics the insertion
//! heuristics rank candidates by (area, margin, overlap volume).

use crate::{Coord, Point3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3D axis-aligned bounding box, stored as min/max corners.
///
/// The empty box is the inverted sentinel (`min = +inf`, `max = -inf`);
/// enlarging an empty box by any box yields that box. All other
/// operations assume `min <= max` componentwise.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    /// Create a bounding box from min and max corners.
    #[inline]
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) bounding box.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            min: Point3::splat(Coord::MAX),
            max: Point3::splat(-Coord::MAX),
        }
    }

    /// Create the tight bounding box of a single point.
    #[inline]
    pub const fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    /// Create the tight bounding box of three triangle vertices.
    #[inline]
    pub fn from_triangle(v0: &Point3, v1: &Point3, v2: &Point3) -> Self {
        Self {
            min: v0.min(v1).min(v2),
            max: v0.max(v1).max(v2),
        }
    }

    /// Reset to the empty sentinel.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Grow this box to the union with another box.
    #[inline]
    pub fn enlarge(&mut self, other: &BoundingBox) {
        self.min = self.min.min(&other.min);
        self.max = self.max.max(&other.max);
    }

    /// The union of this box with another box.
    #[inline]
    pub fn enlarged(&self, other: &BoundingBox) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// Strict overlap test: boxes sharing only a face, edge or corner do
    /// NOT overlap. Symmetric.
    #[inline]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Boundary-inclusive test that this box lies inside `other`.
    #[inline]
    pub fn is_inside(&self, other: &BoundingBox) -> bool {
        self.min.min(&other.min) == other.min && self.max.max(&other.max) == other.max
    }

    /// Boundary-inclusive test that this box contains `other`.
    #[inline]
    pub fn is_enclosing(&self, other: &BoundingBox) -> bool {
        self.min.min(&other.min) == self.min && self.max.max(&other.max) == self.max
    }

    /// Volume of the box. Kept under the conventional R*-tree name.
    #[inline]
    pub fn area(&self) -> Coord {
        let edges = self.max - self.min;
        edges.x * edges.y * edges.z
    }

    /// Sum of the three edge lengths, the split-axis cost metric.
    #[inline]
    pub fn margin(&self) -> Coord {
        let edges = self.max - self.min;
        edges.x + edges.y + edges.z
    }

    /// Volume of the intersection with `other`; 0 when the boxes do not
    /// strictly overlap.
    #[inline]
    pub fn overlap(&self, other: &BoundingBox) -> Coord {
        if !self.overlaps(other) {
            return 0.0;
        }
        let overlapped = BoundingBox {
            min: self.min.max(&other.min),
            max: self.max.min(&other.max),
        };
        overlapped.area()
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// Squared distance between the centers of two boxes.
    #[inline]
    pub fn center_distance2(&self, other: &BoundingBox) -> Coord {
        self.center().distance_squared(&other.center())
    }

    /// Squared distance from a point to the box surface; 0 when the
    /// point lies inside or on the boundary.
    #[inline]
    pub fn squared_exterior_distance(&self, p: &Point3) -> Coord {
        let clamped = p.clamp(&self.min, &self.max);
        clamped.distance_squared(p)
    }

    /// Distance from a point to the box surface; 0 on face contact, so
    /// this is the safe sphere/box prune (strict `overlaps` is not).
    #[inline]
    pub fn exterior_distance(&self, p: &Point3) -> Coord {
        self.squared_exterior_distance(p).sqrt()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point3::zero(), Point3::splat(1.0))
    }

    #[test]
    fn test_empty_enlarge_yields_other() {
        let mut bb = BoundingBox::empty();
        let other = BoundingBox::new(Point3::new(-1.0, 0.0, 2.0), Point3::new(3.0, 4.0, 5.0));
        bb.enlarge(&other);
        assert_eq!(bb, other);
    }

    #[test]
    fn test_enlarged_is_union() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::splat(0.5), Point3::splat(1.5));
        let u = a.enlarged(&b);
        assert_eq!(u.min, Point3::zero());
        assert_eq!(u.max, Point3::splat(1.5));
        assert_eq!(u, b.enlarged(&a));
    }

    #[test]
    fn test_overlapping_boxes() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::splat(0.5), Point3::splat(1.5));
        assert!(a.overlaps(&b));
        assert!(!a.is_inside(&b));
        assert!(!b.is_inside(&a));
        assert!(!a.is_enclosing(&b));
        assert!(!b.is_enclosing(&a));
    }

    #[test]
    fn test_nested_boxes() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::splat(0.2), Point3::splat(0.8));
        assert!(a.overlaps(&b));
        assert!(b.is_inside(&a));
        assert!(!a.is_inside(&b));
        assert!(a.is_enclosing(&b));
        assert!(!b.is_enclosing(&a));
        // Enclosure pins the intersection volume to the inner box.
        assert!((a.overlap(&b) - b.area()).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_boxes() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::splat(1.5), Point3::splat(2.0));
        assert!(!a.overlaps(&b));
        assert_eq!(a.overlap(&b), 0.0);
    }

    #[test]
    fn test_face_touching_boxes_do_not_overlap() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert_eq!(a.overlap(&b), 0.0);
        // The clamped-point distance still reports contact.
        assert_eq!(b.exterior_distance(&Point3::new(1.0, 0.5, 0.5)), 0.0);
    }

    #[test]
    fn test_area_margin_overlap() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::splat(0.5), Point3::splat(1.5));
        assert!((a.area() - 1.0).abs() < 1e-6);
        assert!((a.margin() - 3.0).abs() < 1e-6);
        assert!((a.overlap(&b) - 0.125).abs() < 1e-6);
        assert_eq!(a.overlap(&b), b.overlap(&a));
    }

    #[test]
    fn test_center_distance2() {
        let a = unit_box();
        let b = BoundingBox::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
        assert!((a.center_distance2(&b) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_exterior_distance() {
        let bb = unit_box();
        assert_eq!(bb.squared_exterior_distance(&Point3::splat(0.5)), 0.0);
        assert!((bb.squared_exterior_distance(&Point3::new(2.0, 0.5, 0.5)) - 1.0).abs() < 1e-6);
        assert!((bb.squared_exterior_distance(&Point3::splat(2.0)) - 3.0).abs() < 1e-6);
    }
}
