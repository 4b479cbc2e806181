//! Wavefront OBJ loading and saving.
//!
//! Supports the subset of OBJ the query pipeline needs: `v` vertex
//! positions and `f` faces. Faces with more than three corners are
//! fan-triangulated; texture/normal references after `/` are ignored.

use super::TriangleMesh;
use crate::{Error, Point3, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Load a triangle mesh from an OBJ file.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let file = File::open(path)?;
    read_obj(BufReader::new(file))
}

/// Read a triangle mesh from any OBJ reader.
pub fn read_obj<R: BufRead>(reader: R) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let mut coord = |name: &str| -> Result<f32> {
                    parts
                        .next()
                        .ok_or_else(|| Error::Mesh(format!("vertex missing {name} coordinate")))?
                        .parse()
                        .map_err(|_| Error::Mesh(format!("invalid vertex {name} coordinate")))
                };
                let x = coord("X")?;
                let y = coord("Y")?;
                let z = coord("Z")?;
                mesh.add_vertex(Point3::new(x, y, z));
            }
            Some("f") => {
                let corners: Vec<i32> = parts
                    .map(|token| parse_face_index(token, mesh.vertex_count()))
                    .collect::<Result<_>>()?;
                if corners.len() < 3 {
                    return Err(Error::Mesh(format!(
                        "face with {} corners, need at least 3",
                        corners.len()
                    )));
                }
                // Fan triangulation around the first corner.
                for i in 1..corners.len() - 1 {
                    mesh.add_triangle(corners[0], corners[i], corners[i + 1]);
                }
            }
            _ => {}
        }
    }

    if mesh.is_empty() {
        return Err(Error::Mesh("no faces found in OBJ input".into()));
    }
    mesh.validate()?;
    Ok(mesh)
}

/// Parse one face corner token (`7`, `7/1`, `7//3`, `-1`) into a
/// zero-based vertex index.
fn parse_face_index(token: &str, vertex_count: usize) -> Result<i32> {
    let vertex_part = token.split('/').next().unwrap_or("");
    let idx: i64 = vertex_part
        .parse()
        .map_err(|_| Error::Mesh(format!("invalid face index '{token}'")))?;
    // OBJ indices are one-based; negative indices count back from the
    // most recently read vertex.
    let resolved = if idx < 0 {
        vertex_count as i64 + idx
    } else {
        idx - 1
    };
    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(Error::Mesh(format!(
            "face index '{token}' out of range for {vertex_count} vertices"
        )));
    }
    Ok(resolved as i32)
}

/// Save a triangle mesh as an ASCII OBJ file.
pub fn save_obj<P: AsRef<Path>>(path: P, mesh: &TriangleMesh) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for i in 0..mesh.triangle_count() {
        let base = i * 3;
        let indices = mesh.indices();
        writeln!(
            writer,
            "f {} {} {}",
            indices[base] + 1,
            indices[base + 1] + 1,
            indices[base + 2] + 1
        )?;
    }
    writer.flush()?;
    Ok(())
}
