//! Intersection of triangles with horizontal planes.

use mesh_types::{Mesh, Point3, Triangle};
use nalgebra::Point2;

use crate::diagnostics::SliceDiagnostics;
use crate::geometry::Segment;

/// Edges whose endpoint heights differ by less than this are treated as flat.
const FLAT_EDGE_EPSILON: f64 = 1e-10;

/// Intersection points closer than this on both axes are the same point.
const POINT_EPSILON: f64 = 1e-6;

/// Intersect one triangle with the plane `Z = z`.
///
/// Returns a segment only when exactly two distinct crossing points exist.
/// Coplanar triangles, triangles touching the plane at a single vertex and
/// triangles entirely above or below yield `None`.
///
/// # Example
///
/// ```
/// use mesh_slice::slice_triangle;
/// use mesh_types::Triangle;
///
/// let tri = Triangle::from_arrays([0.0, 0.0, 0.0], [2.0, 0.0, 2.0], [0.0, 2.0, 2.0]);
/// let seg = slice_triangle(&tri, 1.0).unwrap();
/// assert!((seg.length() - 2.0_f64.sqrt()).abs() < 1e-9);
/// ```
#[must_use]
pub fn slice_triangle(triangle: &Triangle, z: f64) -> Option<Segment> {
    let mut points: [Point2<f64>; 3] = [Point2::origin(); 3];
    let mut count = 0;

    for (a, b) in triangle.edges() {
        let Some(p) = edge_crossing(a, b, z) else {
            continue;
        };
        let seen = points[..count]
            .iter()
            .any(|q| (q.x - p.x).abs() < POINT_EPSILON && (q.y - p.y).abs() < POINT_EPSILON);
        if !seen {
            points[count] = p;
            count += 1;
        }
    }

    (count == 2).then(|| Segment::new(points[0], points[1]))
}

/// Slice every triangle of a mesh at `Z = z`.
///
/// Triangles whose Z range contains the plane but which yield no segment
/// are counted in `diagnostics.degenerate_triangles`.
pub fn slice_triangles(mesh: &Mesh, z: f64, diagnostics: &mut SliceDiagnostics) -> Vec<Segment> {
    let mut segments = Vec::new();
    for triangle in mesh.triangles() {
        let (min_z, max_z) = triangle.z_range();
        if z < min_z || z > max_z {
            continue;
        }
        match slice_triangle(triangle, z) {
            Some(segment) => segments.push(segment),
            None => diagnostics.degenerate_triangles += 1,
        }
    }
    segments
}

/// Point where edge `a`-`b` meets the plane, endpoints included.
fn edge_crossing(a: Point3<f64>, b: Point3<f64>, z: f64) -> Option<Point2<f64>> {
    let (lo, hi) = if a.z <= b.z { (a.z, b.z) } else { (b.z, a.z) };
    if z < lo || z > hi || (b.z - a.z).abs() < FLAT_EDGE_EPSILON {
        return None;
    }
    let t = (z - a.z) / (b.z - a.z);
    Some(Point2::new(
        t.mul_add(b.x - a.x, a.x),
        t.mul_add(b.y - a.y, a.y),
    ))
}
