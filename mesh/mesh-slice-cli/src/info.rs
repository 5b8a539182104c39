//! `info` command: summarize a mesh.

use std::path::Path;

use anyhow::{Context, Result};
use mesh_io::load_stl;
use mesh_types::{Mesh, MeshBounds};
use owo_colors::OwoColorize;
use serde::Serialize;

/// What the model info panel shows for a mesh.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    /// Source file.
    pub file: String,
    /// Number of facets.
    pub triangles: usize,
    /// Extent along X, Y and Z in mm.
    pub size: [f64; 3],
    /// Enclosed volume in mm³.
    pub volume: f64,
    /// Surface area in mm².
    pub surface_area: f64,
}

impl ModelInfo {
    pub fn from_mesh(file: &Path, mesh: &Mesh) -> Self {
        let size = mesh.dimensions();
        Self {
            file: file.display().to_string(),
            triangles: mesh.triangle_count(),
            size: [size.x, size.y, size.z],
            volume: mesh.volume(),
            surface_area: mesh.surface_area(),
        }
    }
}

pub fn run(file: &Path, json: bool) -> Result<()> {
    let mesh = load_stl(file).with_context(|| format!("failed to load {}", file.display()))?;
    let info = ModelInfo::from_mesh(file, &mesh);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info.file.bold());
    println!("  Triangles: {}", info.triangles);
    println!(
        "  Size:      {:.2} x {:.2} x {:.2} mm",
        info.size[0], info.size[1], info.size[2]
    );
    println!("  Volume:    {:.2} mm³", info.volume);
    println!("  Surface:   {:.2} mm²", info.surface_area);
    Ok(())
}
