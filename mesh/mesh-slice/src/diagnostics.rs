//! Counters for geometry the slicer dropped instead of failing on.

use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Per-layer (or summed) record of discarded geometry.
///
/// Degenerate input never aborts slicing; it is skipped and counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceDiagnostics {
    /// Triangles spanning the plane that produced no segment.
    pub degenerate_triangles: usize,
    /// Segments left over after closing every loop.
    pub dangling_segments: usize,
    /// Segments that repeated an already seen edge.
    pub duplicate_segments: usize,
    /// Polygons recovered by the angular-sort fallback.
    pub fallback_polygons: usize,
    /// Closed loops rejected as self-intersecting or zero-area.
    pub rejected_polygons: usize,
    /// Scanlines that crossed no interior.
    pub empty_scanlines: usize,
    /// Scanlines dropped because of an odd crossing count.
    pub failed_scanlines: usize,
}

impl SliceDiagnostics {
    /// True when no geometry was rejected or repaired.
    ///
    /// Empty scanlines and degenerate triangles are routine and ignored here.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.dangling_segments == 0
            && self.fallback_polygons == 0
            && self.rejected_polygons == 0
            && self.failed_scanlines == 0
    }
}

impl AddAssign for SliceDiagnostics {
    fn add_assign(&mut self, rhs: Self) {
        self.degenerate_triangles += rhs.degenerate_triangles;
        self.dangling_segments += rhs.dangling_segments;
        self.duplicate_segments += rhs.duplicate_segments;
        self.fallback_polygons += rhs.fallback_polygons;
        self.rejected_polygons += rhs.rejected_polygons;
        self.empty_scanlines += rhs.empty_scanlines;
        self.failed_scanlines += rhs.failed_scanlines;
    }
}

impl fmt::Display for SliceDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} degenerate triangles, {} dangling / {} duplicate segments, \
             {} fallback / {} rejected polygons, {} empty / {} failed scanlines",
            self.degenerate_triangles,
            self.dangling_segments,
            self.duplicate_segments,
            self.fallback_polygons,
            self.rejected_polygons,
            self.empty_scanlines,
            self.failed_scanlines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assign() {
        let mut total = SliceDiagnostics::default();
        total += SliceDiagnostics {
            dangling_segments: 2,
            empty_scanlines: 1,
            ..Default::default()
        };
        total += SliceDiagnostics {
            dangling_segments: 1,
            failed_scanlines: 4,
            ..Default::default()
        };

        assert_eq!(total.dangling_segments, 3);
        assert_eq!(total.empty_scanlines, 1);
        assert_eq!(total.failed_scanlines, 4);
        assert!(!total.is_clean());
    }

    #[test]
    fn test_clean_ignores_routine_counts() {
        let diag = SliceDiagnostics {
            degenerate_triangles: 8,
            empty_scanlines: 2,
            ..Default::default()
        };
        assert!(diag.is_clean());
        assert!(format!("{diag}").starts_with("8 degenerate triangles"));
    }
}
