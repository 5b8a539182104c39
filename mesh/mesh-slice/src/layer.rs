//! Layer types for sliced meshes.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::diagnostics::SliceDiagnostics;
use crate::geometry::{InfillLine, Polygon};

/// A single horizontal slice of the mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Layer index (0 = first layer).
    pub index: usize,

    /// Z height of this layer in mm.
    pub z: f64,

    /// Closed outlines of the cross-section, outer boundaries and holes alike.
    pub perimeters: Vec<Polygon>,

    /// Straight infill toolpaths in serpentine order.
    pub infill: Vec<InfillLine>,

    /// Geometry dropped while building this layer.
    pub diagnostics: SliceDiagnostics,
}

impl Layer {
    /// Create a layer with no geometry.
    #[must_use]
    pub fn empty(index: usize, z: f64) -> Self {
        Self {
            index,
            z,
            perimeters: Vec::new(),
            infill: Vec::new(),
            diagnostics: SliceDiagnostics::default(),
        }
    }

    /// Check if the layer is empty (no perimeters).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.perimeters.is_empty()
    }

    /// Get the number of perimeters.
    #[must_use]
    pub fn perimeter_count(&self) -> usize {
        self.perimeters.len()
    }

    /// Bounding box of all perimeters.
    #[must_use]
    pub fn bounds(&self) -> LayerBounds {
        LayerBounds::from_points(self.perimeters.iter().flat_map(Polygon::points))
    }

    /// Sum of perimeter areas; holes are not subtracted.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.perimeters.iter().map(Polygon::area).sum()
    }

    /// Total outline length in mm.
    #[must_use]
    pub fn perimeter_length(&self) -> f64 {
        self.perimeters.iter().map(Polygon::perimeter).sum()
    }

    /// Total infill travel in mm.
    #[must_use]
    pub fn infill_length(&self) -> f64 {
        self.infill.iter().map(InfillLine::length).sum()
    }
}

/// 2D bounding box for a layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerBounds {
    /// Minimum X coordinate.
    pub min_x: f64,
    /// Maximum X coordinate.
    pub max_x: f64,
    /// Minimum Y coordinate.
    pub min_y: f64,
    /// Maximum Y coordinate.
    pub max_y: f64,
}

impl LayerBounds {
    /// Bounds of a point set; all zeros when the set is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        iter.fold(
            Self {
                min_x: first.x,
                max_x: first.x,
                min_y: first.y,
                max_y: first.y,
            },
            |b, p| Self {
                min_x: b.min_x.min(p.x),
                max_x: b.max_x.max(p.x),
                min_y: b.min_y.min(p.y),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    /// Width of the bounding box.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point of the bounding box.
    #[must_use]
    pub const fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.min_x, self.max_x),
            f64::midpoint(self.min_y, self.max_y),
        )
    }

    /// Check if a point is inside the bounds.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Layer statistics summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerStats {
    /// Minimum area across all layers.
    pub min_area: f64,
    /// Maximum area across all layers.
    pub max_area: f64,
    /// Average area.
    pub avg_area: f64,
    /// Most perimeters found on a single layer.
    pub max_perimeters: usize,
    /// Total infill travel over all layers in mm.
    pub total_infill_length: f64,
    /// Layers without any perimeter.
    pub empty_layers: usize,
}
