//! End-to-end slicing tests on generated meshes.
//!
//! To run: cargo test -p mesh-slice --test slicing_properties

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::cast_precision_loss)]

use std::f64::consts::PI;

use approx::assert_relative_eq;
use mesh_io::{parse_stl, write_stl};
use mesh_slice::{
    slice, slice_layer, slice_mesh, Layer, Point2, SliceDiagnostics, SliceError, SliceParams,
};
use mesh_types::{box_mesh, unit_cube, Mesh, Point3, Triangle};

fn cube_20() -> Mesh {
    box_mesh(Point3::new(-10.0, -10.0, 0.0), Point3::new(10.0, 10.0, 20.0))
}

/// Extrude a convex counter-clockwise outline between two heights.
fn prism(outline: &[(f64, f64)], z0: f64, z1: f64) -> Mesh {
    let lo = |i: usize| Point3::new(outline[i].0, outline[i].1, z0);
    let hi = |i: usize| Point3::new(outline[i].0, outline[i].1, z1);
    let n = outline.len();

    let mut triangles = Vec::new();
    for i in 1..n - 1 {
        triangles.push(Triangle::new(lo(0), lo(i + 1), lo(i)));
        triangles.push(Triangle::new(hi(0), hi(i), hi(i + 1)));
    }
    for i in 0..n {
        let j = (i + 1) % n;
        triangles.push(Triangle::new(lo(i), lo(j), hi(j)));
        triangles.push(Triangle::new(lo(i), hi(j), hi(i)));
    }
    Mesh::new(triangles)
}

/// Square tube: 20mm outside, 10mm hole, 10mm tall.
fn square_tube() -> Mesh {
    let outer = [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)];
    let inner = [(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)];
    let at = |(x, y): (f64, f64), z: f64| Point3::new(x, y, z);

    let mut triangles = Vec::new();
    for i in 0..4 {
        let j = (i + 1) % 4;
        let (o0, o1, i0, i1) = (outer[i], outer[j], inner[i], inner[j]);
        triangles.push(Triangle::new(at(o0, 0.0), at(o1, 0.0), at(o1, 10.0)));
        triangles.push(Triangle::new(at(o0, 0.0), at(o1, 10.0), at(o0, 10.0)));
        triangles.push(Triangle::new(at(i0, 0.0), at(i1, 10.0), at(i1, 0.0)));
        triangles.push(Triangle::new(at(i0, 0.0), at(i0, 10.0), at(i1, 10.0)));
        triangles.push(Triangle::new(at(o0, 0.0), at(i1, 0.0), at(o1, 0.0)));
        triangles.push(Triangle::new(at(o0, 0.0), at(i0, 0.0), at(i1, 0.0)));
        triangles.push(Triangle::new(at(o0, 10.0), at(o1, 10.0), at(i1, 10.0)));
        triangles.push(Triangle::new(at(o0, 10.0), at(i1, 10.0), at(i0, 10.0)));
    }
    Mesh::new(triangles)
}

/// Subdivided icosahedron projected onto a sphere of the given radius.
fn sphere(radius: f64, subdivisions: u32) -> Mesh {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let b = 1.0 / phi;
    let corners = [
        [0.0, b, -1.0],
        [b, 1.0, 0.0],
        [-b, 1.0, 0.0],
        [0.0, b, 1.0],
        [0.0, -b, 1.0],
        [-1.0, 0.0, b],
        [0.0, -b, -1.0],
        [1.0, 0.0, -b],
        [1.0, 0.0, b],
        [-1.0, 0.0, -b],
        [b, -1.0, 0.0],
        [-b, -1.0, 0.0],
    ];
    let faces: [[usize; 3]; 20] = [
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

    let project = |p: Point3<f64>| Point3::from(p.coords.normalize() * radius);
    let corner = |i: usize| project(Point3::new(corners[i][0], corners[i][1], corners[i][2]));
    let mid = |p: Point3<f64>, q: Point3<f64>| project(Point3::from((p.coords + q.coords) * 0.5));

    let mut triangles: Vec<Triangle> = faces
        .iter()
        .map(|&[i, j, k]| Triangle::new(corner(i), corner(j), corner(k)))
        .collect();
    for _ in 0..subdivisions {
        triangles = triangles
            .iter()
            .flat_map(|t| {
                let a = mid(t.v0, t.v1);
                let b = mid(t.v1, t.v2);
                let c = mid(t.v2, t.v0);
                [
                    Triangle::new(t.v0, a, c),
                    Triangle::new(t.v1, b, a),
                    Triangle::new(t.v2, c, b),
                    Triangle::new(a, b, c),
                ]
            })
            .collect();
    }
    Mesh::new(triangles)
}

fn total_diagnostics(layers: &[Layer]) -> SliceDiagnostics {
    let mut total = SliceDiagnostics::default();
    for layer in layers {
        total += layer.diagnostics;
    }
    total
}

#[test]
fn cube_slices_into_ten_square_layers() {
    let layers = slice(&cube_20(), 2.0, None).unwrap();
    assert_eq!(layers.len(), 10);

    for (i, layer) in layers.iter().enumerate() {
        assert_eq!(layer.index, i);
        assert_relative_eq!(layer.z, 2.0 * i as f64, epsilon = 1e-9);
        assert_eq!(layer.perimeters.len(), 1, "layer {i}");

        let outline = &layer.perimeters[0];
        assert_relative_eq!(outline.area(), 400.0, epsilon = 1e-6);
        assert_relative_eq!(outline.perimeter(), 80.0, epsilon = 1e-6);
        assert!(outline.signed_area() > 0.0);

        let bounds = outline.bounds();
        assert_relative_eq!(bounds.min_x, -10.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max_y, 10.0, epsilon = 1e-9);
    }
}

#[test]
fn unit_cube_volume_and_single_perimeter() {
    let cube = unit_cube();
    assert_relative_eq!(cube.volume(), 1.0, epsilon = 1e-12);

    let layer = slice_layer(&cube, 0.5, None);
    assert_eq!(layer.perimeters.len(), 1);
    assert_relative_eq!(layer.area(), 1.0, epsilon = 1e-9);
    assert!(layer.infill.is_empty());
}

#[test]
fn infill_stays_inside_its_layer() {
    let params = SliceParams::default().with_layer_height(4.0).with_infill(0.4);
    let output = slice_mesh(&cube_20(), &params).unwrap();

    for layer in &output.layers {
        assert!(!layer.infill.is_empty());
        let bounds = layer.bounds();
        for line in &layer.infill {
            for p in line.points() {
                assert!(p.x >= bounds.min_x - 1e-9 && p.x <= bounds.max_x + 1e-9);
                assert!(p.y >= bounds.min_y - 1e-9 && p.y <= bounds.max_y + 1e-9);
            }
        }
    }
}

#[test]
fn infill_alternates_direction() {
    let layer = slice_layer(&cube_20(), 5.0, Some(2.0));
    // y = -10, -8, ..., 10: both the front and back edges get a row.
    assert_eq!(layer.infill.len(), 11);
    for pair in layer.infill.windows(2) {
        let first = pair[0].end().x - pair[0].start().x;
        let second = pair[1].end().x - pair[1].start().x;
        assert!(first * second < 0.0);
        assert!(pair[1].start().y > pair[0].start().y);
    }
}

#[test]
fn infill_count_grows_with_density() {
    let mesh = cube_20();
    let count = |density: f64| -> usize {
        let params = SliceParams::default().with_layer_height(5.0).with_infill(density);
        slice_mesh(&mesh, &params)
            .unwrap()
            .layers
            .iter()
            .map(|l| l.infill.len())
            .sum()
    };

    let sparse = count(0.05);
    let medium = count(0.2);
    let dense = count(0.8);
    assert!(sparse <= medium);
    assert!(medium <= dense);
    assert_eq!(count(0.0), 0);
}

#[test]
fn slicing_is_deterministic() {
    let mesh = sphere(10.0, 2);
    let params = SliceParams::default().with_layer_height(1.5);
    let first = slice_mesh(&mesh, &params).unwrap();
    let second = slice_mesh(&mesh, &params).unwrap();

    assert_eq!(first.layer_count, second.layer_count);
    for (a, b) in first.layers.iter().zip(&second.layers) {
        assert_eq!(a.z.to_bits(), b.z.to_bits());
        assert_eq!(a.perimeters, b.perimeters);
        assert_eq!(a.infill, b.infill);
        assert_eq!(a.diagnostics, b.diagnostics);
    }
}

#[test]
fn sphere_layers_are_single_bounded_discs() {
    let radius = 10.0;
    let layers = slice(&sphere(radius, 3), 1.0, None).unwrap();
    assert!(layers.len() >= 17);

    for layer in layers.iter().skip(1) {
        assert_eq!(layer.perimeters.len(), 1, "layer at z={}", layer.z);
        let disc = radius.mul_add(radius, -(layer.z * layer.z)) * PI;
        assert!(layer.area() > 0.0);
        assert!(layer.area() <= disc + 1e-6);
    }

    let totals = total_diagnostics(&layers);
    assert_eq!(totals.rejected_polygons, 0);
    assert_eq!(totals.failed_scanlines, 0);
}

#[test]
fn binary_roundtrip_slices_identically() {
    let original = sphere(5.0, 2);
    let mut bytes = Vec::new();
    write_stl(&original, &mut bytes, true).unwrap();
    let reloaded = parse_stl(&bytes).unwrap();
    assert_eq!(reloaded.triangle_count(), original.triangle_count());

    let params = SliceParams::default().with_layer_height(0.5);
    let a = slice_mesh(&original, &params).unwrap();
    let b = slice_mesh(&reloaded, &params).unwrap();

    assert_eq!(a.layer_count, b.layer_count);
    for (la, lb) in a.layers.iter().zip(&b.layers) {
        assert_eq!(la.perimeters.len(), lb.perimeters.len());
        assert_relative_eq!(la.area(), lb.area(), epsilon = 1e-3);
    }
}

#[test]
fn empty_mesh_slices_without_error() {
    let output = slice_mesh(&Mesh::default(), &SliceParams::default()).unwrap();
    assert_eq!(output.layer_count, 0);
    assert!(output.layers.iter().all(Layer::is_empty));
}

#[test]
fn invalid_layer_height_is_rejected() {
    let err = slice(&unit_cube(), -0.5, None).unwrap_err();
    assert!(matches!(err, SliceError::InvalidLayerHeight(h) if (h + 0.5).abs() < f64::EPSILON));
}

#[test]
fn scanlines_through_vertices_do_not_fail() {
    // Diamond prism: with 2mm spacing the middle row runs exactly through
    // the left and right vertices.
    let diamond = prism(&[(0.0, -2.0), (2.0, 0.0), (0.0, 2.0), (-2.0, 0.0)], 0.0, 4.0);
    let layer = slice_layer(&diamond, 1.0, Some(2.0));

    assert_eq!(layer.perimeters.len(), 1);
    assert_relative_eq!(layer.area(), 8.0, epsilon = 1e-9);
    assert_eq!(layer.diagnostics.failed_scanlines, 0);
    assert_eq!(layer.infill.len(), 1);
    assert_relative_eq!(layer.infill[0].length(), 4.0, epsilon = 1e-9);
    assert!(layer.infill[0].points().iter().all(|p| p.y.abs() < 1e-12));
}

#[test]
fn hollow_part_leaves_hole_unfilled() {
    let layer = slice_layer(&square_tube(), 5.0, Some(1.0));

    assert_eq!(layer.perimeters.len(), 2);
    assert_relative_eq!(layer.area(), 500.0, epsilon = 1e-9);

    let hole_center = Point2::new(10.0, 10.0);
    for line in &layer.infill {
        let (a, b) = (line.start(), line.end());
        let crosses_hole = (a.y - hole_center.y).abs() < 1e-9
            && a.x.min(b.x) < hole_center.x
            && a.x.max(b.x) > hole_center.x;
        assert!(!crosses_hole, "infill crosses the hole: {line:?}");
    }

    // Rows 0..=5 and 15..=20 run the full 20mm (those at 5 and 15 along the
    // hole's edges), rows 6..=14 are split into two 5mm spans.
    assert_relative_eq!(layer.infill_length(), 330.0, epsilon = 1e-9);
}

#[test]
fn cancellation_reports_completed_layers() {
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let result = mesh_slice::Slicer::new(SliceParams::default().with_layer_height(2.0))
        .cancel_when(|| calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 5)
        .run(&cube_20());
    assert!(matches!(result, Err(SliceError::Cancelled { completed: 5 })));
}
