//! Command line tool for regular grid geometry and bathymetry processing.
//!
//! Builds coordinate meshes and extents for projected grids, samples and
//! downsamples ASCII rasters, computes amplitude spectra along profiles,
//! compares scattered point sets and outlines point-density surfaces.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{
    CompareArgs, DownsampleArgs, GridArgs, HullArgs, LabelArgs, MeshArgs, SampleArgs,
    SpectrumArgs,
};

#[derive(Parser, Debug)]
#[command(name = "gridtool")]
#[command(about = "Grid geometry and bathymetry processing tools")]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the cell centre or corner mesh of a grid as XYZ
    Mesh(MeshArgs),
    /// Print the outer corner coordinates of a grid
    Corners(GridArgs),
    /// Print tick positions and labels for a plot of a grid
    Labels(LabelArgs),
    /// Sample an ASCII grid at points
    Sample(SampleArgs),
    /// Reduce an ASCII grid by whole blocks
    Downsample(DownsampleArgs),
    /// Amplitude spectrum along a profile
    Spectrum(SpectrumArgs),
    /// Differences between two point sets
    Compare(CompareArgs),
    /// Outline the dense part of a point-density surface
    Hull(HullArgs),
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout is reserved for command output
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = config::load(args.config.as_deref())?;

    match &args.command {
        Command::Mesh(mesh) => {
            let count = commands::mesh(mesh)?;
            info!(output = %mesh.output.display(), points = count, "Wrote mesh");
        }
        Command::Corners(grid) => {
            let corners = commands::corners(grid)?;
            println!("{}", serde_json::to_string_pretty(&corners)?);
        }
        Command::Labels(labels) => {
            let value = commands::labels(labels, &config)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Sample(sample) => {
            let count = commands::sample(sample)?;
            info!(output = %sample.output.display(), points = count, "Wrote samples");
        }
        Command::Downsample(downsample) => {
            let (rows, cols) = commands::downsample(downsample, &config)?;
            info!(output = %downsample.output.display(), rows, cols, "Wrote downsampled grid");
        }
        Command::Spectrum(spectrum) => {
            let result = commands::spectrum(spectrum)?;
            info!(output = %spectrum.output.display(), bins = result.len(), "Wrote spectrum");
        }
        Command::Compare(compare) => {
            let summary = commands::compare(compare, &config)?;
            info!(
                output = %compare.output.display(),
                count = summary.count,
                mean = summary.mean,
                std = summary.std,
                "Wrote differences"
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Hull(hull) => {
            let (result, written) = commands::hull(hull, &config)?;
            info!(
                output = %hull.output.display(),
                level = result.level,
                contours = result.contours.len(),
                vertices = written,
                "Wrote density boundary"
            );
        }
    }

    Ok(())
}
