//! Rectilinear scanline infill.
//!
//! Horizontal scanlines are spaced evenly from the bottom of the polygon's
//! bounding box up to and including its top. Each scanline is intersected
//! with the polygon boundary (and its holes) under the half-open rule, which
//! keeps crossing counts even at vertices lying exactly on a scanline.
//! Crossings are paired into interior spans. Horizontal edges lying on the
//! scanline are added as spans of their own, so rows along the bottom and
//! the top edge behave alike. Every other scanline runs right to left so the
//! nozzle can snake across the part.

// Scanline counts are small, positive and finite
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use nalgebra::Point2;

use crate::contour::Region;
use crate::diagnostics::SliceDiagnostics;
use crate::geometry::{InfillLine, Polygon};

/// Spans shorter than this are dropped.
const MIN_SPAN: f64 = 1e-9;

/// Slack allowed when the height is an exact multiple of the spacing.
const ROW_EPSILON: f64 = 1e-9;

/// Distance within which a horizontal edge counts as lying on a scanline.
const ON_ROW_EPSILON: f64 = 1e-9;

/// Generate straight infill lines inside `polygon`.
///
/// Returns nothing for an empty polygon or a non-positive spacing.
///
/// # Example
///
/// ```
/// use mesh_slice::{generate_infill, Point2, Polygon};
///
/// let square = Polygon::new(vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(10.0, 0.0),
///     Point2::new(10.0, 10.0),
///     Point2::new(0.0, 10.0),
/// ]);
/// let lines = generate_infill(&square, 2.0);
/// // Rows at y = 0, 2, 4, 6, 8 and 10, the last one along the top edge.
/// assert_eq!(lines.len(), 6);
/// ```
#[must_use]
pub fn generate_infill(polygon: &Polygon, spacing: f64) -> Vec<InfillLine> {
    let mut diagnostics = SliceDiagnostics::default();
    generate_infill_with_diagnostics(polygon, spacing, &mut diagnostics)
}

/// Generate infill inside `polygon`, counting empty and failed scanlines.
pub fn generate_infill_with_diagnostics(
    polygon: &Polygon,
    spacing: f64,
    diagnostics: &mut SliceDiagnostics,
) -> Vec<InfillLine> {
    scan(polygon, &[], spacing, diagnostics)
}

/// Generate infill inside a region, leaving its holes empty.
pub fn generate_region_infill(
    region: &Region<'_>,
    spacing: f64,
    diagnostics: &mut SliceDiagnostics,
) -> Vec<InfillLine> {
    scan(region.outer, &region.holes, spacing, diagnostics)
}

fn scan(
    outer: &Polygon,
    holes: &[&Polygon],
    spacing: f64,
    diagnostics: &mut SliceDiagnostics,
) -> Vec<InfillLine> {
    if outer.len() < 3 || !spacing.is_finite() || spacing <= 0.0 {
        return Vec::new();
    }

    let bounds = outer.bounds();
    let rows = (bounds.height() / spacing + ROW_EPSILON).floor() as usize;

    let mut lines = Vec::new();
    let mut xs = Vec::new();
    let mut on_row = Vec::new();

    for row in 0..=rows {
        let y = (row as f64).mul_add(spacing, bounds.min_y);

        xs.clear();
        on_row.clear();
        collect_crossings(outer, y, &mut xs, &mut on_row);
        for hole in holes {
            collect_crossings(hole, y, &mut xs, &mut on_row);
        }

        if xs.len() % 2 != 0 {
            diagnostics.failed_scanlines += 1;
            continue;
        }
        xs.sort_by(f64::total_cmp);

        on_row.extend(xs.chunks_exact(2).map(|pair| (pair[0], pair[1])));
        let spans: Vec<(f64, f64)> = merge_spans(&mut on_row)
            .into_iter()
            .filter(|(x0, x1)| x1 - x0 > MIN_SPAN)
            .collect();

        if spans.is_empty() {
            diagnostics.empty_scanlines += 1;
            continue;
        }

        if row % 2 == 0 {
            lines.extend(
                spans
                    .iter()
                    .map(|&(x0, x1)| InfillLine::new(Point2::new(x0, y), Point2::new(x1, y))),
            );
        } else {
            lines.extend(
                spans
                    .iter()
                    .rev()
                    .map(|&(x0, x1)| InfillLine::new(Point2::new(x1, y), Point2::new(x0, y))),
            );
        }
    }

    lines
}

/// X coordinates where the ring crosses the horizontal line at `y`, plus
/// the extent of any horizontal edge lying on that line.
///
/// An edge crosses when exactly one endpoint lies at or below `y`.
fn collect_crossings(ring: &Polygon, y: f64, xs: &mut Vec<f64>, on_row: &mut Vec<(f64, f64)>) {
    for (a, b) in ring.edges() {
        if (a.y - y).abs() <= ON_ROW_EPSILON && (b.y - y).abs() <= ON_ROW_EPSILON {
            on_row.push((a.x.min(b.x), a.x.max(b.x)));
        }
        if (a.y <= y) != (b.y <= y) {
            let t = (y - a.y) / (b.y - a.y);
            xs.push(t.mul_add(b.x - a.x, a.x));
        }
    }
}

/// Union of overlapping or touching spans, in ascending X.
fn merge_spans(spans: &mut [(f64, f64)]) -> Vec<(f64, f64)> {
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for &(x0, x1) in &*spans {
        match merged.last_mut() {
            Some(last) if x0 <= last.1 + MIN_SPAN => last.1 = last.1.max(x1),
            _ => merged.push((x0, x1)),
        }
    }
    merged
}
