//! Mesh file I/O for the planar slicer.
//!
//! This crate loads and saves triangle meshes in the **STL**
//! (Stereolithography) format, in both of its variants:
//!
//! - **Binary**: 80-byte header, little-endian triangle count, 50-byte records
//! - **ASCII**: line-oriented `solid` / `facet` / `vertex` text
//!
//! The variant is sniffed from the content, never from the file extension.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_stl, save_stl};
//! use mesh_types::MeshBounds;
//!
//! // Load a mesh
//! let mesh = load_stl("model.stl").unwrap();
//! println!("{} triangles, {:.1} mm tall", mesh.triangle_count(), mesh.bounds().height());
//!
//! // Save it back as binary
//! save_stl(&mesh, "output.stl", true).unwrap();
//! ```
//!
//! # Errors
//!
//! Loading fails with [`IoError::Format`] when the content is neither STL
//! variant, [`IoError::Truncated`] when a binary file declares more
//! triangles than it holds, and [`IoError::FileNotFound`] / [`IoError::Io`]
//! on filesystem failures. No partial mesh is ever returned.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod stl;

pub use error::{IoError, IoResult};
pub use stl::{detect_format, load_stl, parse_stl, save_stl, write_stl, StlFormat, SNIFF_LEN};
