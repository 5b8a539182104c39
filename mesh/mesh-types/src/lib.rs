//! Core mesh types for planar slicing.
//!
//! This crate provides the foundational types shared by the loader and the
//! slicer:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`Triangle`] - A flat triangular facet with concrete vertex positions
//! - [`Mesh`] - An ordered triangle list with cached bounds and volume
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//! Downstream crates (mesh-slice) assume millimeters.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down, print direction)
//!
//! Winding order is preserved from input but never relied upon; only the
//! volume sign depends on it.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Mesh, Triangle, Point3, MeshBounds};
//!
//! let mesh = Mesh::new(vec![Triangle::new(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 2.0),
//! )]);
//!
//! assert_eq!(mesh.triangle_count(), 1);
//! assert!((mesh.bounds().max.z - 2.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod mesh;
mod traits;
mod triangle;

// Re-export core types
pub use bounds::Aabb;
pub use mesh::{box_mesh, unit_cube, Mesh};
pub use traits::MeshBounds;
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

/// A mesh vertex: three coordinates, no identity.
pub type Vertex = Point3<f64>;
