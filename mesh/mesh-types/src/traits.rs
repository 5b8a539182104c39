//! Traits for mesh types.

use crate::Aabb;
use nalgebra::{Point3, Vector3};

/// Trait for types that can report an axis-aligned bounding box.
pub trait MeshBounds {
    /// Compute the axis-aligned bounding box.
    ///
    /// Returns an empty AABB if the mesh has no triangles.
    fn bounds(&self) -> Aabb;

    /// Compute the bounding box, returning `None` if empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }

    /// Get the center of the bounding box.
    fn center(&self) -> Point3<f64> {
        self.bounds().center()
    }

    /// Size of the bounding box along X, Y and Z.
    ///
    /// Zero for an empty mesh.
    fn dimensions(&self) -> Vector3<f64> {
        self.bounds_opt().map_or_else(Vector3::zeros, |b| b.size())
    }
}
