//! Mesh loading and validation.
//!
//! This module provides the input side of the query pipeline:
//! - [`TriangleMesh`] - Indexed triangle soup with structural validation
//! - OBJ file loading and saving

mod obj;
mod triangle_mesh;

pub use obj::{load_obj, save_obj};
pub use triangle_mesh::TriangleMesh;
