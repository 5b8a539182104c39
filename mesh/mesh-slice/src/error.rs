//! Error types for mesh slicing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during slicing operations.
#[derive(Debug, Error)]
pub enum SliceError {
    /// Invalid layer height.
    #[error("Invalid layer height: {0} (must be > 0)")]
    InvalidLayerHeight(f64),

    /// Invalid infill density.
    #[error("Invalid infill density: {0} (must be within 0..=1)")]
    InvalidInfillDensity(f64),

    /// Invalid extrusion width.
    #[error("Invalid extrusion width: {0} (must be > 0)")]
    InvalidExtrusionWidth(f64),

    /// The mesh height and layer height don't give a usable layer count.
    #[error("Cannot slice a height of {height} mm at {layer_height} mm per layer (limit {max_layers} layers)")]
    LayerCount {
        /// Z extent of the mesh.
        height: f64,
        /// Requested layer height.
        layer_height: f64,
        /// Largest supported number of layers.
        max_layers: usize,
    },

    /// The caller asked the driver to stop.
    #[error("Slicing cancelled after {completed} layers")]
    Cancelled {
        /// Layers finished before the request was seen.
        completed: usize,
    },

    /// A settings file could not be parsed.
    #[error("Invalid print settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// IO error while reading settings.
    #[error("Failed to read {path}: {source}")]
    IoRead {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO error during export.
    #[error("Failed to write to {path}: {source}")]
    IoWrite {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for slicing operations.
pub type SliceResult<T> = std::result::Result<T, SliceError>;
