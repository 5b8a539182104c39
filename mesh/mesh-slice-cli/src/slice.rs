//! `slice` command: cut a mesh into layers and report them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use mesh_io::load_stl;
use mesh_slice::{
    write_layer_svg, Layer, PrintSettings, SliceDiagnostics, SliceOutput, Slicer, SvgExportParams,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Args)]
pub struct SliceArgs {
    /// STL file to slice
    #[arg(name = "FILE")]
    pub file: PathBuf,

    /// Layer height in mm (overrides the settings file)
    #[arg(long)]
    pub layer_height: Option<f64>,

    /// Infill density between 0 and 1 (overrides the settings file)
    #[arg(long)]
    pub infill: Option<f64>,

    /// JSON print settings file
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Slice layers in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Write one SVG preview per layer into this directory
    #[arg(long)]
    pub svg_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Per-layer line of the report.
#[derive(Debug, Serialize)]
pub struct LayerSummary {
    pub index: usize,
    pub z: f64,
    pub perimeters: usize,
    pub infill_lines: usize,
    pub area: f64,
}

impl From<&Layer> for LayerSummary {
    fn from(layer: &Layer) -> Self {
        Self {
            index: layer.index,
            z: layer.z,
            perimeters: layer.perimeters.len(),
            infill_lines: layer.infill.len(),
            area: layer.area(),
        }
    }
}

/// Whole-run report, echoing the settings that produced it.
#[derive(Debug, Serialize)]
pub struct SliceSummary {
    pub file: String,
    pub settings: PrintSettings,
    pub layer_count: usize,
    pub total_height: f64,
    pub diagnostics: SliceDiagnostics,
    pub layers: Vec<LayerSummary>,
}

impl SliceSummary {
    pub fn new(file: &Path, settings: PrintSettings, output: &SliceOutput) -> Self {
        Self {
            file: file.display().to_string(),
            settings,
            layer_count: output.layer_count,
            total_height: output.total_height,
            diagnostics: output.diagnostics,
            layers: output.layers.iter().map(LayerSummary::from).collect(),
        }
    }
}

/// Settings from file (or defaults) with command-line overrides applied.
pub fn resolve_settings(args: &SliceArgs) -> Result<PrintSettings> {
    let mut settings = match &args.settings {
        Some(path) => PrintSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => PrintSettings::default(),
    };
    if let Some(height) = args.layer_height {
        settings.layer_height = height;
    }
    if let Some(density) = args.infill {
        settings.infill_density = density;
    }
    Ok(settings)
}

pub fn run(args: &SliceArgs) -> Result<()> {
    let settings = resolve_settings(args)?;
    let params = settings.slice_params().with_parallel(args.parallel);

    let mesh = load_stl(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    let output = Slicer::new(params)
        .on_progress(|percent| debug!(percent = format!("{percent:.0}"), "Slicing progress"))
        .run(&mesh)
        .with_context(|| format!("failed to slice {}", args.file.display()))?;

    if let Some(dir) = &args.svg_dir {
        write_previews(&output, dir)?;
    }

    let summary = SliceSummary::new(&args.file, settings, &output);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&summary);
    }
    Ok(())
}

fn write_previews(output: &SliceOutput, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let params = SvgExportParams::default();
    for layer in &output.layers {
        let path = dir.join(format!("layer_{:04}.svg", layer.index));
        write_layer_svg(layer, &params, &path)?;
    }
    info!(count = output.layers.len(), dir = %dir.display(), "Wrote layer previews");
    Ok(())
}

fn print_report(summary: &SliceSummary) {
    println!("{}", summary.file.bold());
    println!(
        "  {} layers over {:.2} mm (layer height {} mm, infill {:.0}%)",
        summary.layer_count.green(),
        summary.total_height,
        summary.settings.layer_height,
        summary.settings.infill_density * 100.0
    );
    println!(
        "  speed {} mm/s, nozzle {} °C, bed {} °C",
        summary.settings.print_speed, summary.settings.nozzle_temp, summary.settings.bed_temp
    );

    for layer in &summary.layers {
        let line = format!(
            "  layer {:>4}  z={:>8.3}  perimeters={:<3} infill={}",
            layer.index, layer.z, layer.perimeters, layer.infill_lines
        );
        if layer.perimeters == 0 {
            println!("{}", line.dimmed());
        } else {
            println!("{line}");
        }
    }

    if !summary.diagnostics.is_clean() {
        println!("  {} {}", "dropped:".yellow(), summary.diagnostics);
    }
}
