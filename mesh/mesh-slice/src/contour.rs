//! Assembly of unordered cross-section segments into closed polygons.
//!
//! Segment endpoints are snapped onto shared vertices, the resulting graph
//! is pruned of dangling edges, and every remaining edge is walked into
//! simple cycles. A cycle becomes a [`Polygon`] when it is simple and
//! encloses area. If no cycle survives, an angular sort of all snapped
//! points around their centroid is tried once as a fallback.

// Grid cells are derived from finite coordinates divided by a small epsilon
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use hashbrown::{HashMap, HashSet};
use nalgebra::Point2;
use tracing::debug;

use crate::diagnostics::SliceDiagnostics;
use crate::geometry::{Polygon, Segment, AREA_EPSILON};

/// Endpoints closer than this on both axes are merged.
const SNAP_EPSILON: f64 = 1e-6;

/// Build closed polygons from an unordered segment soup.
///
/// # Example
///
/// ```
/// use mesh_slice::{build_polygons, Point2, Segment};
///
/// let p = [
///     Point2::new(0.0, 0.0),
///     Point2::new(4.0, 0.0),
///     Point2::new(4.0, 3.0),
///     Point2::new(0.0, 3.0),
/// ];
/// let segments = vec![
///     Segment::new(p[2], p[3]),
///     Segment::new(p[0], p[1]),
///     Segment::new(p[3], p[0]),
///     Segment::new(p[1], p[2]),
/// ];
/// let polygons = build_polygons(&segments);
/// assert_eq!(polygons.len(), 1);
/// assert!((polygons[0].area() - 12.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn build_polygons(segments: &[Segment]) -> Vec<Polygon> {
    let mut diagnostics = SliceDiagnostics::default();
    build_polygons_with_diagnostics(segments, &mut diagnostics)
}

/// Build closed polygons, recording dropped geometry in `diagnostics`.
///
/// Every returned polygon is simple, has non-zero area and winds
/// counter-clockwise.
pub fn build_polygons_with_diagnostics(
    segments: &[Segment],
    diagnostics: &mut SliceDiagnostics,
) -> Vec<Polygon> {
    if segments.is_empty() {
        return Vec::new();
    }

    let mut grid = SnapGrid::default();
    let mut seen = HashSet::new();
    let mut edges = Vec::with_capacity(segments.len());

    for segment in segments {
        let a = grid.insert(segment.start);
        let b = grid.insert(segment.end);
        if a == b {
            diagnostics.dangling_segments += 1;
            continue;
        }
        let key = (a.min(b), a.max(b));
        if seen.insert(key) {
            edges.push(key);
        } else {
            diagnostics.duplicate_segments += 1;
        }
    }

    let mut polygons = Vec::new();
    for cycle in extract_cycles(grid.points.len(), &edges, diagnostics) {
        let ring = cycle.iter().map(|&i| grid.points[i]).collect();
        match accept(ring) {
            Some(polygon) => polygons.push(polygon),
            None => diagnostics.rejected_polygons += 1,
        }
    }

    if polygons.is_empty() && segments.len() >= 3 && grid.points.len() >= 3 {
        match accept(angular_ring(&grid.points)) {
            Some(polygon) => {
                debug!(points = polygon.len(), "Recovered polygon by angular sort");
                diagnostics.fallback_polygons += 1;
                polygons.push(polygon);
            }
            None => diagnostics.rejected_polygons += 1,
        }
    }

    polygons
}

/// An outer boundary together with the holes directly inside it.
#[derive(Debug, Clone)]
pub struct Region<'a> {
    /// Outer boundary.
    pub outer: &'a Polygon,
    /// Holes nested directly inside `outer`.
    pub holes: Vec<&'a Polygon>,
}

/// Group polygons into regions by containment depth.
///
/// A polygon inside an even number of others is an outer boundary; one
/// inside an odd number is a hole of its smallest enclosing polygon.
#[must_use]
pub fn group_regions(polygons: &[Polygon]) -> Vec<Region<'_>> {
    let parents: Vec<Vec<usize>> = polygons
        .iter()
        .enumerate()
        .map(|(i, inner)| {
            let Some(sample) = inner.points().first() else {
                return Vec::new();
            };
            polygons
                .iter()
                .enumerate()
                .filter(|&(j, outer)| {
                    j != i && outer.area() > inner.area() && outer.contains_point(sample)
                })
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let mut regions: Vec<Option<Region<'_>>> = polygons
        .iter()
        .zip(&parents)
        .map(|(polygon, enclosing)| {
            (enclosing.len() % 2 == 0).then(|| Region {
                outer: polygon,
                holes: Vec::new(),
            })
        })
        .collect();

    for (i, enclosing) in parents.iter().enumerate() {
        if enclosing.len() % 2 == 0 {
            continue;
        }
        let parent = enclosing
            .iter()
            .copied()
            .min_by(|&a, &b| polygons[a].area().total_cmp(&polygons[b].area()));
        if let Some(region) = parent.and_then(|p| regions[p].as_mut()) {
            region.holes.push(&polygons[i]);
        }
    }

    regions.into_iter().flatten().collect()
}

/// Spatial hash merging nearby points onto one index.
#[derive(Default)]
struct SnapGrid {
    points: Vec<Point2<f64>>,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SnapGrid {
    fn insert(&mut self, p: Point2<f64>) -> usize {
        let (cx, cy) = cell(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.cells.get(&(cx.saturating_add(dx), cy.saturating_add(dy))) else {
                    continue;
                };
                for &id in ids {
                    let q = self.points[id];
                    if (q.x - p.x).abs() < SNAP_EPSILON && (q.y - p.y).abs() < SNAP_EPSILON {
                        return id;
                    }
                }
            }
        }
        let id = self.points.len();
        self.points.push(p);
        self.cells.entry((cx, cy)).or_default().push(id);
        id
    }
}

fn cell(p: Point2<f64>) -> (i64, i64) {
    (
        (p.x / SNAP_EPSILON).floor() as i64,
        (p.y / SNAP_EPSILON).floor() as i64,
    )
}

/// Split an undirected edge set into edge-disjoint simple cycles.
///
/// Dangling chains are pruned first and counted. A walk that revisits a
/// vertex already on its path closes the cycle at that vertex and carries on
/// from there, so figure-eight contours split into two rings.
fn extract_cycles(
    node_count: usize,
    edges: &[(usize, usize)],
    diagnostics: &mut SliceDiagnostics,
) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for (e, &(a, b)) in edges.iter().enumerate() {
        adjacency[a].push((b, e));
        adjacency[b].push((a, e));
    }

    let mut used = vec![false; edges.len()];
    let mut degree: Vec<usize> = adjacency.iter().map(Vec::len).collect();

    let mut leaves: Vec<usize> = (0..node_count).filter(|&v| degree[v] == 1).collect();
    while let Some(v) = leaves.pop() {
        if degree[v] != 1 {
            continue;
        }
        let Some(&(w, e)) = adjacency[v].iter().find(|&&(_, e)| !used[e]) else {
            continue;
        };
        used[e] = true;
        diagnostics.dangling_segments += 1;
        degree[v] -= 1;
        degree[w] -= 1;
        if degree[w] == 1 {
            leaves.push(w);
        }
    }

    let mut cycles = Vec::new();
    let mut slot: Vec<Option<usize>> = vec![None; node_count];
    let mut cursor = vec![0_usize; node_count];

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let (a, mut current) = edges[first];
        let mut path = vec![a];
        slot[a] = Some(0);

        loop {
            if let Some(at) = slot[current] {
                let cycle: Vec<usize> = path.drain(at..).collect();
                for &n in &cycle {
                    slot[n] = None;
                }
                cycles.push(cycle);
            }
            slot[current] = Some(path.len());
            path.push(current);

            let links = &adjacency[current];
            let pos = &mut cursor[current];
            while *pos < links.len() && used[links[*pos].1] {
                *pos += 1;
            }
            let Some(&(next, e)) = links.get(*pos) else {
                break;
            };
            used[e] = true;
            current = next;
        }

        diagnostics.dangling_segments += path.len().saturating_sub(1);
        for &n in &path {
            slot[n] = None;
        }
    }

    cycles
}

/// Points ordered by angle around their centroid.
fn angular_ring(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (cx, cy) = (sx / n, sy / n);

    let mut ring = points.to_vec();
    ring.sort_by(|a, b| {
        let ta = (a.y - cy).atan2(a.x - cx);
        let tb = (b.y - cy).atan2(b.x - cx);
        ta.total_cmp(&tb)
    });
    ring
}

/// Validate a ring and orient it counter-clockwise.
fn accept(ring: Vec<Point2<f64>>) -> Option<Polygon> {
    let mut polygon = Polygon::new(ring);
    let area = polygon.area();
    if polygon.len() < 3 || !area.is_finite() || area <= AREA_EPSILON || !polygon.is_simple() {
        return None;
    }
    if polygon.signed_area() < 0.0 {
        polygon.reverse();
    }
    Some(polygon)
}
