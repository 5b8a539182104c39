//! Planar slicing of triangle meshes into printable layers.
//!
//! This crate cuts a mesh with evenly spaced horizontal planes and turns
//! every cut into closed perimeters plus rectilinear infill.
//!
//! # Pipeline
//!
//! - **Plane slicer**: each triangle crossing `Z = z` yields one segment
//! - **Contour builder**: unordered segments are snapped and joined into
//!   simple counter-clockwise polygons
//! - **Infill generator**: evenly spaced horizontal scanlines clipped to
//!   each polygon, alternating direction row by row
//! - **Layer stack driver**: walks the mesh bottom to top, optionally in
//!   parallel, reporting progress and honouring cancellation
//! - **SVG export**: preview a single layer
//!
//! Degenerate geometry never aborts a slice; it is dropped and counted in
//! [`SliceDiagnostics`].
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_slice::{slice_mesh, SliceParams};
//!
//! let cube = unit_cube();
//! let result = slice_mesh(&cube, &SliceParams::default().with_layer_height(0.1)).unwrap();
//! println!("{result}");
//! assert_eq!(result.layer_count, 10);
//! assert!(result.layers.iter().all(|l| l.perimeters.len() == 1));
//! ```
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down, print direction)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod contour;
mod diagnostics;
mod error;
mod export;
mod geometry;
mod infill;
mod layer;
mod params;
mod plane;
mod result;
mod settings;
mod slicer;

pub use contour::{build_polygons, build_polygons_with_diagnostics, group_regions, Region};
pub use diagnostics::SliceDiagnostics;
pub use error::{SliceError, SliceResult};
pub use export::{export_layer_svg, write_layer_svg, SvgExportParams};
pub use geometry::{InfillLine, Polygon, Segment};
pub use infill::{generate_infill, generate_infill_with_diagnostics, generate_region_infill};
pub use layer::{Layer, LayerBounds, LayerStats};
pub use params::SliceParams;
pub use plane::{slice_triangle, slice_triangles};
pub use result::SliceOutput;
pub use settings::PrintSettings;
pub use slicer::{slice, slice_layer, slice_mesh, ProgressSink, Slicer, MAX_LAYERS};

// Re-export nalgebra types for convenience
pub use nalgebra::Point2;
