//! Triangle-list mesh with lazily cached derived properties.

use std::sync::OnceLock;

use crate::{Aabb, MeshBounds, Triangle};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered list of triangles as read from a mesh file.
///
/// The mesh is immutable once built. Bounds and volume are computed the
/// first time they are requested and cached for the lifetime of the value;
/// since nothing can mutate the triangle list, the cache never goes stale.
///
/// Triangle order has no effect on slicing results but is preserved so that
/// repeated runs are deterministic.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshBounds};
///
/// let cube = unit_cube();
/// assert_eq!(cube.triangle_count(), 12);
/// assert!((cube.volume() - 1.0).abs() < 1e-10);
/// assert!((cube.bounds().max.z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    triangles: Vec<Triangle>,

    #[cfg_attr(feature = "serde", serde(skip))]
    bounds: OnceLock<Aabb>,

    #[cfg_attr(feature = "serde", serde(skip))]
    signed_volume: OnceLock<f64>,
}

impl Mesh {
    /// Create a mesh from a list of triangles.
    #[must_use]
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            bounds: OnceLock::new(),
            signed_volume: OnceLock::new(),
        }
    }

    /// The triangles in input order.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Consume the mesh and return its triangles.
    #[must_use]
    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Uses the divergence theorem: the sum of `v0 · (v1 × v2)` over all
    /// facets, divided by six. Positive for a closed mesh with outward
    /// (counter-clockwise) winding.
    ///
    /// # Note
    ///
    /// The result is only meaningful for a closed (watertight) mesh. An open
    /// mesh still yields a number; it is just not a volume.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        *self.signed_volume.get_or_init(|| {
            self.triangles
                .iter()
                .map(Triangle::signed_volume_x6)
                .sum::<f64>()
                / 6.0
        })
    }

    /// Absolute volume of the mesh.
    ///
    /// Returns the absolute value of [`signed_volume`](Self::signed_volume).
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Compute the total surface area of the mesh.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles.iter().map(Triangle::area).sum()
    }
}

impl From<Vec<Triangle>> for Mesh {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self::new(triangles)
    }
}

impl MeshBounds for Mesh {
    fn bounds(&self) -> Aabb {
        *self.bounds.get_or_init(|| {
            Aabb::from_points(self.triangles.iter().flat_map(|t| [&t.v0, &t.v1, &t.v2]))
        })
    }
}

/// Build a closed axis-aligned box mesh between two corners.
///
/// The box has 12 triangles with counter-clockwise winding viewed from
/// outside, so its signed volume is positive.
///
/// # Example
///
/// ```
/// use mesh_types::{box_mesh, Point3};
///
/// let b = box_mesh(Point3::new(-10.0, -10.0, 0.0), Point3::new(10.0, 10.0, 20.0));
/// assert!((b.volume() - 8000.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    let c = [
        Point3::new(min.x, min.y, min.z), // 0
        Point3::new(max.x, min.y, min.z), // 1
        Point3::new(max.x, max.y, min.z), // 2
        Point3::new(min.x, max.y, min.z), // 3
        Point3::new(min.x, min.y, max.z), // 4
        Point3::new(max.x, min.y, max.z), // 5
        Point3::new(max.x, max.y, max.z), // 6
        Point3::new(min.x, max.y, max.z), // 7
    ];

    let faces: [[usize; 3]; 12] = [
        // Bottom (-Z)
        [0, 2, 1],
        [0, 3, 2],
        // Top (+Z)
        [4, 5, 6],
        [4, 6, 7],
        // Front (-Y)
        [0, 1, 5],
        [0, 5, 4],
        // Back (+Y)
        [3, 7, 6],
        [3, 6, 2],
        // Left (-X)
        [0, 4, 7],
        [0, 7, 3],
        // Right (+X)
        [1, 2, 6],
        [1, 6, 5],
    ];

    faces
        .iter()
        .map(|&[a, b, d]| Triangle::new(c[a], c[b], c[d]))
        .collect::<Vec<_>>()
        .into()
}

/// Helper function to create a unit cube mesh.
///
/// Creates a cube from (0,0,0) to (1,1,1) with outward-facing normals.
#[must_use]
pub fn unit_cube() -> Mesh {
    box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
}
