//! # meshquery
//!
//! Closest-point-on-mesh queries accelerated by a 3D R*-tree.
//!
//! Given a triangle mesh, a query point and a maximum search radius, the
//! library returns the point on the mesh surface closest to the query
//! point, or reports that no surface point lies within the radius. The
//! index is built once per mesh and amortized across large query batches.
//!
//! The main entry points are:
//! - [`TriangleMesh`] - Indexed triangle soup, the input to the build
//! - [`ClosestPointQuery`] - The immutable query index
//! - [`RStarTree`] - The underlying spatial index, usable on its own
//!
//! ## Example
//! ```
//! use meshquery::{ClosestPointQuery, Point3, TriangleMesh};
//!
//! let mesh = TriangleMesh::from_parts(
//!     vec![
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(-1.0, 0.0, 0.0),
//!     ],
//!     vec![0, 1, 2],
//! )
//! .unwrap();
//! let query = ClosestPointQuery::new(&mesh).unwrap();
//! let closest = query.closest_point(Point3::new(0.0, 0.5, 1.0), f32::MAX).unwrap();
//! assert_eq!(closest, Some(Point3::new(0.0, 0.5, 0.0)));
//! ```

pub mod geometry;
pub mod mesh;
pub mod query;
pub mod rtree;

pub use geometry::{BoundingBox, Point3, Triangle};
pub use mesh::TriangleMesh;
pub use query::ClosestPointQuery;
pub use rtree::RStarTree;

use thiserror::Error as ThisError;

/// Floating-point coordinate type for mesh geometry.
///
/// Geometry is stored single-precision; distance accumulation inside the
/// query kernel widens to `f64`.
pub type Coord = f32;

/// Crate-wide error type.
#[derive(Debug, ThisError)]
pub enum Error {
    /// I/O error while reading or writing a mesh file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mesh violates a structural invariant (bad index, ragged
    /// triangle list, unparsable file content).
    #[error("Mesh error: {0}")]
    Mesh(String),

    /// A query was rejected before touching the index (negative radius,
    /// non-finite query point).
    #[error("Query error: {0}")]
    Query(String),
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;
