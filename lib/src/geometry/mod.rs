//! Geometric primitives for mesh proximity queries.
//!
//! This module provides the value types the index and the query kernel are
//! built from:
//! - [`Point3`] - A 3-component single-precision point/vector
//! - [`BoundingBox`] - A 3D axis-aligned bounding box with the R*-tree
//!   cost metrics (area, margin, overlap)
//! - [`Triangle`] - A triangle with the closest-point kernel

mod bounding_box;
mod point;
mod triangle;

pub use bounding_box::BoundingBox;
pub use point::Point3;
pub use triangle::{ClosestCandidate, Triangle};
