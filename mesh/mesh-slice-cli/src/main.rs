//! `mesh-slice`: slice STL meshes into printable layers.
//!
//! # Commands
//!
//! - `mesh-slice info <file>` - Triangle count, size and volume of a mesh
//! - `mesh-slice slice <file>` - Slice into perimeters and infill
//!
//! Logging follows `RUST_LOG`; `-v` raises the default level to debug.

mod info;
mod slice;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Planar STL slicer
#[derive(Parser)]
#[command(name = "mesh-slice")]
#[command(about = "Slice STL meshes into perimeter and infill layers", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show triangle count, size and volume of a mesh
    Info {
        /// STL file to inspect
        #[arg(name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Slice a mesh into layers
    Slice(slice::SliceArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { file, json } => info::run(&file, json),
        Commands::Slice(args) => slice::run(&args),
    }
}
