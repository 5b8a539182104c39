//! Benchmarks for STL loading and saving.
//!
//! Run with: cargo bench -p mesh-io
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-io -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-io -- --baseline main

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mesh_io::{load_stl, parse_stl, save_stl, write_stl};
use mesh_types::{Mesh, Point3, Triangle};
use tempfile::tempdir;

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Create an icosphere with the given number of subdivision passes.
fn create_sphere(subdivisions: u32) -> Mesh {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let a = 1.0;
    let b = 1.0 / phi;

    let ico_verts = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];

    let ico_faces: [[usize; 3]; 20] = [
        [0, 1, 2],
        [3, 2, 1],
        [3, 4, 5],
        [3, 8, 4],
        [0, 6, 7],
        [0, 9, 6],
        [4, 10, 11],
        [6, 11, 10],
        [2, 5, 9],
        [11, 9, 5],
        [1, 7, 8],
        [10, 8, 7],
        [3, 5, 2],
        [3, 1, 8],
        [0, 2, 9],
        [0, 7, 1],
        [6, 9, 11],
        [6, 10, 7],
        [4, 11, 5],
        [4, 8, 10],
    ];

    let corner = |i: usize| project(Point3::new(ico_verts[i][0], ico_verts[i][1], ico_verts[i][2]));
    let mut triangles: Vec<Triangle> = ico_faces
        .iter()
        .map(|&[i, j, k]| Triangle::new(corner(i), corner(j), corner(k)))
        .collect();

    for _ in 0..subdivisions {
        triangles = triangles
            .iter()
            .flat_map(|t| {
                let m01 = project(midpoint(t.v0, t.v1));
                let m12 = project(midpoint(t.v1, t.v2));
                let m20 = project(midpoint(t.v2, t.v0));
                [
                    Triangle::new(t.v0, m01, m20),
                    Triangle::new(t.v1, m12, m01),
                    Triangle::new(t.v2, m20, m12),
                    Triangle::new(m01, m12, m20),
                ]
            })
            .collect();
    }

    Mesh::new(triangles)
}

fn midpoint(p: Point3<f64>, q: Point3<f64>) -> Point3<f64> {
    Point3::from((p.coords + q.coords) * 0.5)
}

fn project(p: Point3<f64>) -> Point3<f64> {
    Point3::from(p.coords.normalize())
}

// =============================================================================
// I/O Benchmarks
// =============================================================================

fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("IO");

    let sphere = create_sphere(4); // ~5k triangles
    let temp_dir = tempdir().expect("failed to create temp dir");

    let binary_path = temp_dir.path().join("bench_sphere.stl");
    let ascii_path = temp_dir.path().join("bench_sphere_ascii.stl");
    save_stl(&sphere, &binary_path, true).expect("failed to save binary STL");
    save_stl(&sphere, &ascii_path, false).expect("failed to save ASCII STL");

    let mut in_memory = Vec::new();
    write_stl(&sphere, &mut in_memory, true).expect("failed to encode STL");

    group.throughput(Throughput::Elements(sphere.triangle_count() as u64));

    group.bench_function("load_stl_binary", |b| {
        b.iter(|| load_stl(black_box(&binary_path)));
    });
    group.bench_function("load_stl_ascii", |b| {
        b.iter(|| load_stl(black_box(&ascii_path)));
    });
    group.bench_function("parse_stl_in_memory", |b| {
        b.iter(|| parse_stl(black_box(&in_memory)));
    });

    let out_stl = temp_dir.path().join("bench_out.stl");
    group.bench_function("save_stl_binary", |b| {
        b.iter(|| save_stl(black_box(&sphere), black_box(&out_stl), true));
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_io);
criterion_main!(benches);
