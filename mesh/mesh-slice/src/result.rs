//! Slice output types.

// Layer counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;

use crate::diagnostics::SliceDiagnostics;
use crate::layer::{Layer, LayerStats};
use crate::params::SliceParams;

/// Result of a slicing run.
#[derive(Debug, Clone, Serialize)]
pub struct SliceOutput {
    /// Individual layers from bottom to top.
    pub layers: Vec<Layer>,

    /// Total number of layers.
    pub layer_count: usize,

    /// Height of the mesh in mm.
    pub total_height: f64,

    /// Diagnostics summed over all layers.
    pub diagnostics: SliceDiagnostics,

    /// Slice parameters used.
    pub params: SliceParams,
}

impl SliceOutput {
    /// Create an empty result.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::new() is not const
    pub fn empty(params: SliceParams) -> Self {
        Self {
            layers: Vec::new(),
            layer_count: 0,
            total_height: 0.0,
            diagnostics: SliceDiagnostics::default(),
            params,
        }
    }

    /// Check if the result is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Calculate layer statistics for all layers.
    #[must_use]
    pub fn stats(&self) -> LayerStats {
        if self.layers.is_empty() {
            return LayerStats::default();
        }

        let mut min_area = f64::INFINITY;
        let mut max_area: f64 = 0.0;
        let mut sum_area: f64 = 0.0;
        let mut max_perimeters: usize = 0;
        let mut total_infill_length: f64 = 0.0;
        let mut empty_layers: usize = 0;

        for layer in &self.layers {
            let area = layer.area();
            min_area = min_area.min(area);
            max_area = max_area.max(area);
            sum_area += area;
            max_perimeters = max_perimeters.max(layer.perimeter_count());
            total_infill_length += layer.infill_length();
            if layer.is_empty() {
                empty_layers += 1;
            }
        }

        LayerStats {
            min_area,
            max_area,
            avg_area: sum_area / self.layers.len() as f64,
            max_perimeters,
            total_infill_length,
            empty_layers,
        }
    }

    /// Get a specific layer by index.
    #[must_use]
    pub fn get_layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Get the layer whose slab of one layer height contains `z`.
    #[must_use]
    pub fn layer_at_height(&self, z: f64) -> Option<&Layer> {
        let h = self.params.layer_height;
        self.layers.iter().find(|l| z >= l.z && z < l.z + h)
    }
}

impl std::fmt::Display for SliceOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (perimeters, infill) = self.layers.iter().fold((0, 0), |(p, i), l| {
            (p + l.perimeters.len(), i + l.infill.len())
        });
        write!(
            f,
            "SliceOutput: {} layers, {:.1}mm height, {} perimeters, {} infill lines",
            self.layer_count, self.total_height, perimeters, infill
        )
    }
}
