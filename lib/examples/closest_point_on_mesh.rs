//! Closest-point query driver.
//!
//! Loads an OBJ mesh (or generates a sphere when no path is given),
//! samples query points in a ball around the origin, resolves the whole
//! batch, and writes a CSV for the visualizer with one line per query:
//! `max_dist,qx,qy,qz,found,cx,cy,cz`.
//!
//! Usage: `cargo run --example closest_point_on_mesh [mesh.obj]`

use meshquery::mesh::load_obj;
use meshquery::{ClosestPointQuery, Coord, Point3, TriangleMesh};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

const QUERY_COUNT: usize = 10_000;
const MAX_DIST: Coord = 1.0;
const CSV_PATH: &str = "query_points.csv";

fn random_in_unit_sphere(rng: &mut StdRng) -> Point3 {
    loop {
        let p = Point3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

fn uv_sphere(radius: Coord, stacks: usize, slices: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::with_capacity((stacks + 1) * (slices + 1), stacks * slices * 2);
    for s in 0..=stacks {
        let phi = std::f32::consts::PI * s as Coord / stacks as Coord;
        for t in 0..=slices {
            let theta = 2.0 * std::f32::consts::PI * t as Coord / slices as Coord;
            mesh.add_vertex(Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));
        }
    }
    for s in 0..stacks {
        for t in 0..slices {
            let i0 = (s * (slices + 1) + t) as i32;
            let i1 = i0 + 1;
            let i2 = i0 + slices as i32 + 1;
            let i3 = i2 + 1;
            if s != 0 {
                mesh.add_triangle(i0, i2, i1);
            }
            if s != stacks - 1 {
                mesh.add_triangle(i1, i2, i3);
            }
        }
    }
    mesh
}

fn main() -> meshquery::Result<()> {
    let mesh = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading {path}...");
            load_obj(&path)?
        }
        None => uv_sphere(1.0, 32, 64),
    };
    println!(
        "Mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    let start = Instant::now();
    let index = ClosestPointQuery::new(&mesh)?;
    println!(
        "Built index in {:.2} ms (tree depth {})",
        start.elapsed().as_secs_f64() * 1000.0,
        index.tree().depth()
    );

    let mut rng = StdRng::seed_from_u64(0);
    let queries: Vec<(Point3, Coord)> = (0..QUERY_COUNT)
        .map(|_| (random_in_unit_sphere(&mut rng) * 2.0, MAX_DIST))
        .collect();

    let start = Instant::now();
    let results = index.closest_points(&queries)?;
    println!(
        "Resolved {} queries in {:.2} ms",
        queries.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let file = File::create(CSV_PATH)?;
    let mut csv = BufWriter::new(file);
    for (&(query, max_dist), result) in queries.iter().zip(&results) {
        let (found, closest) = match result {
            Some(p) => (1, *p),
            None => (0, Point3::zero()),
        };
        writeln!(
            csv,
            "{},{},{},{},{},{},{},{}",
            max_dist, query.x, query.y, query.z, found, closest.x, closest.y, closest.z
        )?;
    }
    csv.flush()?;
    println!("Wrote {CSV_PATH}");
    Ok(())
}
