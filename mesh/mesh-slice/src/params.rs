//! Slicing parameters and presets.

use serde::{Deserialize, Serialize};

use crate::error::{SliceError, SliceResult};

/// Parameters for slicing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceParams {
    /// Layer height in mm.
    pub layer_height: f64,

    /// Infill density (0.0-1.0). Zero disables infill.
    pub infill_density: f64,

    /// Width of one extruded line in mm (typically nozzle diameter).
    pub extrusion_width: f64,

    /// Slice layers on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SliceParams {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            infill_density: 0.2,
            extrusion_width: 0.4,
            parallel: false,
        }
    }
}

impl SliceParams {
    /// Parameters for high quality printing.
    ///
    /// Uses 0.1mm layers and denser infill.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            layer_height: 0.1,
            infill_density: 0.3,
            ..Default::default()
        }
    }

    /// Parameters for fast draft printing.
    ///
    /// Uses 0.3mm layers and sparse infill.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            layer_height: 0.3,
            infill_density: 0.1,
            ..Default::default()
        }
    }

    /// Set layer height.
    #[must_use]
    pub const fn with_layer_height(mut self, height: f64) -> Self {
        self.layer_height = height;
        self
    }

    /// Set infill density.
    #[must_use]
    pub const fn with_infill(mut self, density: f64) -> Self {
        self.infill_density = density;
        self
    }

    /// Set extrusion width.
    #[must_use]
    pub const fn with_extrusion_width(mut self, width: f64) -> Self {
        self.extrusion_width = width;
        self
    }

    /// Enable or disable parallel layer slicing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Distance between adjacent infill lines, or `None` when infill is off.
    ///
    /// Density 0.2 at 0.4mm extrusion width gives 2mm spacing.
    #[must_use]
    pub fn infill_spacing(&self) -> Option<f64> {
        (self.infill_density > 0.0).then(|| self.extrusion_width / self.infill_density)
    }

    /// Check that the parameters can drive a slice.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidLayerHeight`] for a non-positive or
    /// non-finite layer height, [`SliceError::InvalidInfillDensity`] for a
    /// density outside `[0, 1]`, and [`SliceError::InvalidExtrusionWidth`]
    /// for a non-positive width while infill is enabled.
    pub fn validate(&self) -> SliceResult<()> {
        if !self.layer_height.is_finite() || self.layer_height <= 0.0 {
            return Err(SliceError::InvalidLayerHeight(self.layer_height));
        }
        if !(0.0..=1.0).contains(&self.infill_density) {
            return Err(SliceError::InvalidInfillDensity(self.infill_density));
        }
        if self.infill_density > 0.0
            && (!self.extrusion_width.is_finite() || self.extrusion_width <= 0.0)
        {
            return Err(SliceError::InvalidExtrusionWidth(self.extrusion_width));
        }
        Ok(())
    }
}
