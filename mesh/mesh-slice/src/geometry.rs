//! Planar geometry produced by slicing: segments, polygons and infill lines.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::layer::LayerBounds;

/// Shoelace areas below this are treated as zero.
pub(crate) const AREA_EPSILON: f64 = 1e-12;

/// A straight piece of a cross-section, produced by one triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint.
    pub start: Point2<f64>,
    /// Second endpoint.
    pub end: Point2<f64>,
}

impl Segment {
    /// Create a segment between two points.
    #[must_use]
    pub const fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }

    /// Euclidean length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A closed planar ring.
///
/// The ring is stored open: the last point connects back to the first and is
/// never repeated. Rings produced by the contour builder are simple, have
/// non-zero area and wind counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point2<f64>>,
}

impl Polygon {
    /// Create a polygon from its ring of points.
    ///
    /// A trailing point equal to the first is dropped.
    #[must_use]
    pub fn new(mut points: Vec<Point2<f64>>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Ring vertices, without the closing repeat.
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Number of distinct vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the ring has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate the ring's edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area, positive for counter-clockwise rings.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.edges()
            .map(|(a, b)| a.x.mul_add(b.y, -(b.x * a.y)))
            .sum::<f64>()
            / 2.0
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Length of the closed outline.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Axis-aligned bounds of the ring.
    #[must_use]
    pub fn bounds(&self) -> LayerBounds {
        LayerBounds::from_points(self.points.iter())
    }

    /// Area centroid, falling back to the vertex average for degenerate rings.
    #[must_use]
    pub fn centroid(&self) -> Point2<f64> {
        let area = self.signed_area();
        if area.abs() < AREA_EPSILON {
            return vertex_average(&self.points);
        }
        let (cx, cy) = self.edges().fold((0.0, 0.0), |(cx, cy), (a, b)| {
            let cross = a.x.mul_add(b.y, -(b.x * a.y));
            (cx + (a.x + b.x) * cross, cy + (a.y + b.y) * cross)
        });
        let scale = 1.0 / (6.0 * area);
        Point2::new(cx * scale, cy * scale)
    }

    /// Even-odd point containment test.
    #[must_use]
    pub fn contains_point(&self, p: &Point2<f64>) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y <= p.y) != (b.y <= p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// True when no two non-adjacent edges touch or cross.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let edges: Vec<_> = self.edges().collect();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    continue;
                }
                let (p1, p2) = edges[i];
                let (q1, q2) = edges[j];
                if segments_touch(p1, p2, q1, q2) {
                    return false;
                }
            }
        }
        true
    }

    /// Reverse the winding order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

/// One straight infill toolpath, at least two points long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfillLine {
    points: Vec<Point2<f64>>,
}

impl InfillLine {
    /// Create a two-point line.
    #[must_use]
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self {
            points: vec![start, end],
        }
    }

    /// Create a line from a polyline; returns `None` with fewer than two points.
    #[must_use]
    pub fn from_points(points: Vec<Point2<f64>>) -> Option<Self> {
        (points.len() >= 2).then_some(Self { points })
    }

    /// Polyline vertices in travel order.
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Where the nozzle enters the line.
    #[must_use]
    pub fn start(&self) -> Point2<f64> {
        self.points[0]
    }

    /// Where the nozzle leaves the line.
    #[must_use]
    pub fn end(&self) -> Point2<f64> {
        self.points[self.points.len() - 1]
    }

    /// Travel length along the polyline.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

fn vertex_average(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / n)
}

fn orientation(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    (b.x - a.x).mul_add(c.y - a.y, -((b.y - a.y) * (c.x - a.x)))
}

fn on_segment(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> bool {
    p.x >= a.x.min(b.x) - AREA_EPSILON
        && p.x <= a.x.max(b.x) + AREA_EPSILON
        && p.y >= a.y.min(b.y) - AREA_EPSILON
        && p.y <= a.y.max(b.y) + AREA_EPSILON
}

/// Closed-segment intersection test; collinear overlap and shared points count.
fn segments_touch(p1: Point2<f64>, p2: Point2<f64>, q1: Point2<f64>, q2: Point2<f64>) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > AREA_EPSILON && d2 < -AREA_EPSILON) || (d1 < -AREA_EPSILON && d2 > AREA_EPSILON))
        && ((d3 > AREA_EPSILON && d4 < -AREA_EPSILON) || (d3 < -AREA_EPSILON && d4 > AREA_EPSILON))
    {
        return true;
    }

    (d1.abs() <= AREA_EPSILON && on_segment(q1, q2, p1))
        || (d2.abs() <= AREA_EPSILON && on_segment(q1, q2, p2))
        || (d3.abs() <= AREA_EPSILON && on_segment(p1, p2, q1))
        || (d4.abs() <= AREA_EPSILON && on_segment(p1, p2, q2))
}
