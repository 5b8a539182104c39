//! Benchmarks for the slicing pipeline.
//!
//! Run with: cargo bench -p mesh-slice

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mesh_slice::{
    build_polygons, generate_infill, slice_mesh, slice_triangles, SliceDiagnostics, SliceParams,
};
use mesh_types::{Mesh, Point3, Triangle};

/// UV sphere with the given number of rings and segments.
fn create_sphere(radius: f64, rings: usize, segments: usize) -> Mesh {
    #[allow(clippy::cast_precision_loss)]
    let point = |ring: usize, seg: usize| {
        let theta = std::f64::consts::PI * ring as f64 / rings as f64;
        let phi = std::f64::consts::TAU * seg as f64 / segments as f64;
        Point3::new(
            radius * theta.sin() * phi.cos(),
            radius * theta.sin() * phi.sin(),
            -radius * theta.cos(),
        )
    };

    let mut triangles = Vec::new();
    for ring in 0..rings {
        for seg in 0..segments {
            let next = (seg + 1) % segments;
            let (a, b) = (point(ring, seg), point(ring, next));
            let (c, d) = (point(ring + 1, next), point(ring + 1, seg));
            if ring > 0 {
                triangles.push(Triangle::new(a, b, c));
            }
            if ring + 1 < rings {
                triangles.push(Triangle::new(a, c, d));
            }
        }
    }
    Mesh::new(triangles)
}

fn bench_stages(c: &mut Criterion) {
    let sphere = create_sphere(20.0, 64, 128);
    let mut group = c.benchmark_group("stages");

    group.bench_function("slice_triangles", |b| {
        b.iter(|| {
            let mut diag = SliceDiagnostics::default();
            slice_triangles(black_box(&sphere), black_box(3.3), &mut diag)
        });
    });

    let mut diag = SliceDiagnostics::default();
    let segments = slice_triangles(&sphere, 3.3, &mut diag);
    group.bench_function("build_polygons", |b| {
        b.iter(|| build_polygons(black_box(&segments)));
    });

    let polygons = build_polygons(&segments);
    if let Some(outline) = polygons.first() {
        group.bench_function("generate_infill", |b| {
            b.iter(|| generate_infill(black_box(outline), black_box(0.5)));
        });
    }

    group.finish();
}

fn bench_full_slice(c: &mut Criterion) {
    let sphere = create_sphere(20.0, 64, 128);
    let mut group = c.benchmark_group("slice_mesh");
    group.sample_size(20);

    for parallel in [false, true] {
        let params = SliceParams::default().with_layer_height(0.5).with_parallel(parallel);
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_with_input(BenchmarkId::from_parameter(label), &params, |b, params| {
            b.iter(|| slice_mesh(black_box(&sphere), params));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stages, bench_full_slice);
criterion_main!(benches);
