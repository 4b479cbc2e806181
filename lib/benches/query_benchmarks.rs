//! Index build and query benchmarks
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshquery::{ClosestPointQuery, Coord, Point3, TriangleMesh};

/// A UV sphere centered at the origin.
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

/// Deterministic query points scattered around the sphere surface.
fn query_points(count: usize) -> Vec<(Point3, Coord)> {
    (0..count)
        .map(|i| {
            let t = i as Coord * 0.618;
            let r = 0.5 + (i % 7) as Coord * 0.35;
            (
                Point3::new(r * t.cos(), r * t.sin(), (t * 0.31).sin() * 1.5),
                0.75,
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mesh = uv_sphere(1.0, 48, 96);
    c.bench_function("build_sphere_9k", |b| {
        b.iter(|| ClosestPointQuery::new(black_box(&mesh)).unwrap())
    });
}

fn bench_closest_point(c: &mut Criterion) {
    let mesh = uv_sphere(1.0, 48, 96);
    let index = ClosestPointQuery::new(&mesh).unwrap();
    let queries = query_points(1000);

    c.bench_function("closest_point_1k_serial", |b| {
        b.iter(|| {
            for &(q, r) in &queries {
                black_box(index.closest_point(q, r).unwrap());
            }
        })
    });

    c.bench_function("closest_point_1k_batch", |b| {
        b.iter(|| black_box(index.closest_points(&queries).unwrap()))
    });
}

criterion_group!(benches, bench_build, bench_closest_point);
criterion_main!(benches);
