//! Layer stack driver.
//!
//! Walks the mesh from its lowest to its highest point in fixed steps,
//! slicing each plane into perimeters and infill.

// Layer indices and counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use mesh_types::{Mesh, MeshBounds};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::contour::{build_polygons_with_diagnostics, group_regions};
use crate::diagnostics::SliceDiagnostics;
use crate::error::{SliceError, SliceResult};
use crate::infill::generate_region_infill;
use crate::layer::Layer;
use crate::params::SliceParams;
use crate::plane::slice_triangles;
use crate::result::SliceOutput;

/// Relative slack so exact multiples of the layer height don't gain a layer.
const LAYER_EPSILON: f64 = 1e-9;

/// Largest layer stack a single run will build.
pub const MAX_LAYERS: usize = 1_000_000;

/// Receiver of progress percentages in `[0, 100]`.
///
/// Reports cannot fail the slice: a sink that panics is logged and not
/// called again for the rest of the run. Any `Fn(f64) + Sync` closure is a sink;
/// wrap an `mpsc::Sender<f64>` in a closure to stream reports to another
/// thread.
pub trait ProgressSink: Sync {
    /// Called with the share of work done so far.
    fn report(&self, percent: f64);
}

impl<F: Fn(f64) + Sync> ProgressSink for F {
    fn report(&self, percent: f64) {
        self(percent);
    }
}

/// Configurable slicing run.
///
/// # Example
///
/// ```
/// use std::sync::Mutex;
/// use mesh_types::unit_cube;
/// use mesh_slice::{SliceParams, Slicer};
///
/// let seen = Mutex::new(Vec::new());
/// let output = Slicer::new(SliceParams::default().with_layer_height(0.25))
///     .on_progress(|p| seen.lock().unwrap().push(p))
///     .run(&unit_cube())
///     .unwrap();
///
/// assert_eq!(output.layer_count, 4);
/// assert_eq!(*seen.lock().unwrap(), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
/// ```
pub struct Slicer<'a> {
    params: SliceParams,
    progress: Option<Box<dyn ProgressSink + 'a>>,
    progress_failed: AtomicBool,
    cancel: Option<Box<dyn Fn() -> bool + Sync + 'a>>,
}

impl<'a> Slicer<'a> {
    /// Create a slicer with the given parameters.
    #[must_use]
    pub fn new(params: SliceParams) -> Self {
        Self {
            params,
            progress: None,
            progress_failed: AtomicBool::new(false),
            cancel: None,
        }
    }

    /// Report progress to a closure.
    #[must_use]
    pub fn on_progress<F>(self, callback: F) -> Self
    where
        F: Fn(f64) + Sync + 'a,
    {
        self.progress_sink(callback)
    }

    /// Report progress to any [`ProgressSink`].
    #[must_use]
    pub fn progress_sink<S: ProgressSink + 'a>(mut self, sink: S) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Stop before the next layer once `check` returns true.
    #[must_use]
    pub fn cancel_when<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Sync + 'a,
    {
        self.cancel = Some(Box::new(check));
        self
    }

    /// The parameters this slicer runs with.
    #[must_use]
    pub const fn params(&self) -> &SliceParams {
        &self.params
    }

    /// Slice the mesh into layers.
    ///
    /// A mesh without triangles has no Z extent and yields zero layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid,
    /// [`SliceError::LayerCount`] if the mesh height is not finite or needs
    /// more than [`MAX_LAYERS`] layers, or [`SliceError::Cancelled`] if the
    /// cancellation check fired.
    pub fn run(&self, mesh: &Mesh) -> SliceResult<SliceOutput> {
        self.params.validate()?;

        let bounds = mesh.bounds();
        if bounds.is_empty() {
            info!("Mesh has no triangles, nothing to slice");
            self.report(100.0);
            return Ok(SliceOutput::empty(self.params.clone()));
        }

        let min_z = bounds.min.z;
        let total_height = bounds.height();
        let count = layer_count(total_height, self.params.layer_height)?;
        let spacing = self.params.infill_spacing();

        info!(
            total_height = format!("{:.2}", total_height),
            layer_height = self.params.layer_height,
            layer_count = count,
            parallel = self.params.parallel,
            "Starting mesh slicing"
        );

        let layers = if self.params.parallel {
            self.run_parallel(mesh, min_z, count, spacing)?
        } else {
            self.run_sequential(mesh, min_z, count, spacing)?
        };
        self.report(100.0);

        let mut diagnostics = SliceDiagnostics::default();
        for layer in &layers {
            diagnostics += layer.diagnostics;
        }

        info!(
            layers = layers.len(),
            perimeters = layers.iter().map(|l| l.perimeters.len()).sum::<usize>(),
            infill_lines = layers.iter().map(|l| l.infill.len()).sum::<usize>(),
            %diagnostics,
            "Slicing complete"
        );

        Ok(SliceOutput {
            layer_count: layers.len(),
            layers,
            total_height,
            diagnostics,
            params: self.params.clone(),
        })
    }

    fn run_sequential(
        &self,
        mesh: &Mesh,
        min_z: f64,
        count: usize,
        spacing: Option<f64>,
    ) -> SliceResult<Vec<Layer>> {
        let h = self.params.layer_height;
        let mut layers = Vec::with_capacity(count);
        for index in 0..count {
            if self.is_cancelled() {
                info!(completed = index, "Slicing cancelled");
                return Err(SliceError::Cancelled { completed: index });
            }
            self.report(index as f64 / count as f64 * 100.0);
            let z = (index as f64).mul_add(h, min_z);
            layers.push(build_layer(mesh, index, z, spacing));
        }
        Ok(layers)
    }

    /// Layers are independent, so they fan out over rayon and are put back
    /// in Z order afterwards. Progress follows completion order.
    fn run_parallel(
        &self,
        mesh: &Mesh,
        min_z: f64,
        count: usize,
        spacing: Option<f64>,
    ) -> SliceResult<Vec<Layer>> {
        let h = self.params.layer_height;
        let stop = AtomicBool::new(false);
        let finished = AtomicUsize::new(0);

        let results: Vec<Option<Layer>> = (0..count)
            .into_par_iter()
            .map(|index| {
                if stop.load(Ordering::Relaxed) {
                    return None;
                }
                if self.is_cancelled() {
                    stop.store(true, Ordering::Relaxed);
                    return None;
                }
                let z = (index as f64).mul_add(h, min_z);
                let layer = build_layer(mesh, index, z, spacing);
                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                self.report(done as f64 / count as f64 * 100.0);
                Some(layer)
            })
            .collect();

        if stop.load(Ordering::Relaxed) {
            let completed = finished.load(Ordering::Relaxed);
            info!(completed, "Slicing cancelled");
            return Err(SliceError::Cancelled { completed });
        }

        let mut layers: Vec<Layer> = results.into_iter().flatten().collect();
        layers.sort_by(|a, b| a.z.total_cmp(&b.z));
        Ok(layers)
    }

    fn report(&self, percent: f64) {
        let Some(sink) = &self.progress else {
            return;
        };
        if self.progress_failed.load(Ordering::Relaxed) {
            return;
        }
        if catch_unwind(AssertUnwindSafe(|| sink.report(percent))).is_err() {
            self.progress_failed.store(true, Ordering::Relaxed);
            warn!(percent, "Progress sink panicked, further reports dropped");
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|check| check())
    }
}

/// Slice a mesh at a fixed layer height with default infill.
///
/// Progress, when a sink is given, is reported before each layer and once
/// more with 100 at the end.
///
/// A mesh with zero triangles has no Z bounds, so its layer count is 0 and
/// the result is an empty list (after a single 100 report).
///
/// # Errors
///
/// Returns [`SliceError::InvalidLayerHeight`] if `layer_height` is not a
/// positive finite number, and [`SliceError::LayerCount`] if the mesh height
/// divided by `layer_height` is not finite or exceeds [`MAX_LAYERS`].
///
/// # Example
///
/// ```
/// use mesh_types::{box_mesh, Point3};
/// use mesh_slice::slice;
///
/// let part = box_mesh(Point3::new(-10.0, -10.0, 0.0), Point3::new(10.0, 10.0, 20.0));
/// let layers = slice(&part, 2.0, None).unwrap();
/// assert_eq!(layers.len(), 10);
/// assert!((layers[9].z - 18.0).abs() < 1e-9);
/// ```
pub fn slice(
    mesh: &Mesh,
    layer_height: f64,
    on_progress: Option<&dyn ProgressSink>,
) -> SliceResult<Vec<Layer>> {
    let params = SliceParams::default().with_layer_height(layer_height);
    let slicer = match on_progress {
        Some(sink) => Slicer::new(params).on_progress(move |p| sink.report(p)),
        None => Slicer::new(params),
    };
    Ok(slicer.run(mesh)?.layers)
}

/// Slice a mesh with full parameters.
///
/// # Errors
///
/// Returns an error if the parameters fail [`SliceParams::validate`].
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_slice::{slice_mesh, SliceParams};
///
/// let cube = unit_cube();
/// let result = slice_mesh(&cube, &SliceParams::default()).unwrap();
/// assert_eq!(result.layer_count, 5);
/// ```
pub fn slice_mesh(mesh: &Mesh, params: &SliceParams) -> SliceResult<SliceOutput> {
    Slicer::new(params.clone()).run(mesh)
}

/// Slice a single plane at height `z`.
///
/// `spacing` is the infill line spacing; `None` leaves the layer without infill.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_slice::slice_layer;
///
/// let layer = slice_layer(&unit_cube(), 0.5, Some(0.25));
/// assert_eq!(layer.perimeters.len(), 1);
/// assert!((layer.area() - 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn slice_layer(mesh: &Mesh, z: f64, spacing: Option<f64>) -> Layer {
    build_layer(mesh, 0, z, spacing)
}

fn layer_count(total_height: f64, layer_height: f64) -> SliceResult<usize> {
    let overflow = || SliceError::LayerCount {
        height: total_height,
        layer_height,
        max_layers: MAX_LAYERS,
    };
    if !total_height.is_finite() {
        return Err(overflow());
    }
    if total_height <= 0.0 {
        return Ok(0);
    }
    let count = (total_height / layer_height * (1.0 - LAYER_EPSILON)).ceil();
    if !count.is_finite() || count > MAX_LAYERS as f64 {
        return Err(overflow());
    }
    Ok(count as usize)
}

fn build_layer(mesh: &Mesh, index: usize, z: f64, spacing: Option<f64>) -> Layer {
    let mut diagnostics = SliceDiagnostics::default();

    let segments = slice_triangles(mesh, z, &mut diagnostics);
    let perimeters = build_polygons_with_diagnostics(&segments, &mut diagnostics);

    let mut infill = Vec::new();
    if let Some(spacing) = spacing {
        for region in group_regions(&perimeters) {
            infill.extend(generate_region_infill(&region, spacing, &mut diagnostics));
        }
    }

    debug!(
        layer = index,
        z = format!("{:.3}", z),
        segments = segments.len(),
        perimeters = perimeters.len(),
        infill_lines = infill.len(),
        "Sliced layer"
    );
    if !diagnostics.is_clean() {
        debug!(layer = index, %diagnostics, "Dropped degenerate geometry");
    }

    Layer {
        index,
        z,
        perimeters,
        infill,
        diagnostics,
    }
}
