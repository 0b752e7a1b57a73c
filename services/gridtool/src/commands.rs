//! Subcommand implementations.
//!
//! Each command reads its inputs, runs one library operation and writes the
//! result. Commands return a short count of what they produced so `main`
//! can log it.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use grid_common::{Corners, ExtentLabels, GridDescriptor, LabelIntervals};
use grid_processor::{
    block_reduce, density_hull, extract_values, point_differences, sample_bilinear,
    xy_distances, DensityHull, DifferenceSummary, DownsampleMethod, GridProcessorConfig,
    HullOptions, Spectrum,
};
use ndarray::Array2;
use raster_io::{read_points, write_xyz, xyz_triples, AsciiGrid, XyzPoint};
use serde_json::json;
use tracing::{info, warn};

/// Grid geometry, either read from an ASCII grid or given explicitly.
#[derive(Args, Debug, Clone, Default)]
pub struct GridArgs {
    /// ASCII grid supplying the geometry (and values, where used)
    #[arg(long, conflicts_with_all = ["x", "y", "nx", "ny", "pixel_width"])]
    pub grid: Option<PathBuf>,

    /// Anchor x coordinate
    #[arg(long, allow_negative_numbers = true)]
    pub x: Option<f64>,

    /// Anchor y coordinate
    #[arg(long, allow_negative_numbers = true)]
    pub y: Option<f64>,

    /// Number of columns
    #[arg(long)]
    pub nx: Option<usize>,

    /// Number of rows
    #[arg(long)]
    pub ny: Option<usize>,

    /// Cell size in map units
    #[arg(long)]
    pub pixel_width: Option<f64>,

    /// Which outer corner the anchor refers to: top_left or lower_left
    #[arg(long, default_value = "top_left")]
    pub corner: String,
}

impl GridArgs {
    /// Resolve the geometry. When read from a file the grid is returned too.
    pub fn resolve(&self) -> Result<(GridDescriptor, Option<AsciiGrid>)> {
        if let Some(path) = &self.grid {
            let grid = AsciiGrid::read(path)
                .with_context(|| format!("failed to read grid {}", path.display()))?;
            return Ok((grid.descriptor, Some(grid)));
        }

        let missing = |name: &str| anyhow!("--{} is required without --grid", name);
        let descriptor = GridDescriptor::from_corner_str(
            self.x.ok_or_else(|| missing("x"))?,
            self.y.ok_or_else(|| missing("y"))?,
            self.nx.ok_or_else(|| missing("nx"))?,
            self.ny.ok_or_else(|| missing("ny"))?,
            self.pixel_width.ok_or_else(|| missing("pixel-width"))?,
            &self.corner,
        )?;
        Ok((descriptor, None))
    }
}

#[derive(Args, Debug, Clone)]
pub struct MeshArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Write cell corners instead of cell centres
    #[arg(long)]
    pub corners: bool,

    /// Output XYZ file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Write the coordinate mesh of a grid as XYZ.
///
/// Cell centres carry the grid values when the geometry came from a file.
/// Everything else is written with `z = 0`.
pub fn mesh(args: &MeshArgs) -> Result<usize> {
    let (descriptor, grid) = args.grid.resolve()?;

    let mesh = if args.corners {
        descriptor.cell_corner_mesh()
    } else {
        descriptor.cell_centre_mesh()
    };

    let z = match grid {
        Some(grid) if !args.corners => grid.data,
        _ => Array2::zeros(mesh.shape()),
    };

    let points = xyz_triples(&mesh, &z)?;
    write_xyz(&args.output, &points)?;
    Ok(points.len())
}

/// Outer corner coordinates of a grid.
pub fn corners(args: &GridArgs) -> Result<Corners> {
    let (descriptor, _) = args.resolve()?;
    Ok(descriptor.corners())
}

#[derive(Args, Debug, Clone)]
pub struct LabelArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Spacing of x labels in map units
    #[arg(long)]
    pub x_interval: Option<f64>,

    /// Spacing of y labels in map units
    #[arg(long)]
    pub y_interval: Option<f64>,

    /// Divisor applied to label values
    #[arg(long)]
    pub rescale: Option<f64>,
}

/// Tick positions and labels for a plot of the grid, as JSON.
pub fn labels(args: &LabelArgs, config: &GridProcessorConfig) -> Result<serde_json::Value> {
    let (descriptor, _) = args.grid.resolve()?;

    let defaults = config.labels;
    let intervals = LabelIntervals {
        x_interval: args.x_interval.unwrap_or(defaults.x_interval),
        y_interval: args.y_interval.unwrap_or(defaults.y_interval),
        rescale: args.rescale.unwrap_or(defaults.rescale),
    };

    let labels = ExtentLabels::for_grid(&descriptor, &intervals)?;
    Ok(json!({
        "x": {
            "positions": labels.x.positions.to_vec(),
            "labels": labels.x.labels.to_vec(),
        },
        "y": {
            "positions": labels.y.positions.to_vec(),
            "labels": labels.y.labels.to_vec(),
        },
    }))
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// ASCII grid to sample
    #[arg(long)]
    pub grid: PathBuf,

    /// Points to sample at; any z column is ignored
    #[arg(long)]
    pub points: PathBuf,

    /// Interpolate between cell centres instead of taking the cell value
    #[arg(long)]
    pub bilinear: bool,

    /// Output XYZ file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Sample a grid at points. Points outside the grid or on nodata are
/// left out of the output.
pub fn sample(args: &SampleArgs) -> Result<usize> {
    let grid = AsciiGrid::read(&args.grid)
        .with_context(|| format!("failed to read grid {}", args.grid.display()))?;
    let points = read_points(&args.points)
        .with_context(|| format!("failed to read points {}", args.points.display()))?;

    let transform = grid.geotransform();
    let values: Vec<Option<f64>> = if args.bilinear {
        points
            .iter()
            .map(|p| sample_bilinear(&grid.data, &transform, p.x, p.y))
            .collect()
    } else {
        let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        extract_values(&grid.data, &transform, &xy)
    };

    let sampled: Vec<XyzPoint> = points
        .iter()
        .zip(values)
        .filter_map(|(p, v)| v.filter(|z| !z.is_nan()).map(|z| XyzPoint::new(p.x, p.y, z)))
        .collect();

    let skipped = points.len() - sampled.len();
    if skipped > 0 {
        warn!(skipped, "Points outside the grid or on nodata");
    }

    write_xyz(&args.output, &sampled)?;
    Ok(sampled.len())
}

#[derive(Args, Debug, Clone)]
pub struct DownsampleArgs {
    /// Input ASCII grid
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output ASCII grid
    #[arg(short, long)]
    pub output: PathBuf,

    /// Block size (defaults to the configured factor)
    #[arg(long)]
    pub factor: Option<usize>,

    /// Block reduction: mean, max or nearest (defaults to the configured method)
    #[arg(long)]
    pub method: Option<DownsampleMethod>,
}

/// Reduce a grid by whole blocks. Trailing rows and columns that do not
/// fill a block are dropped, so the output covers the blocks it holds.
pub fn downsample(args: &DownsampleArgs, config: &GridProcessorConfig) -> Result<(usize, usize)> {
    let input = AsciiGrid::read(&args.input)
        .with_context(|| format!("failed to read grid {}", args.input.display()))?;

    let factor = args.factor.unwrap_or(config.downsample_factor);
    let method = args.method.unwrap_or(config.downsample_method);

    let data = block_reduce(&input.data, factor, method)?;
    let (rows, cols) = data.dim();

    let descriptor = input
        .geotransform()
        .rescaled(cols * factor, rows * factor, cols, rows)?
        .grid(cols, rows)?;

    let nodata = Some(input.nodata.unwrap_or(config.nodata));
    let output = AsciiGrid::new(descriptor, data, nodata)?;
    output.write(&args.output)?;

    info!(factor, %method, rows, cols, "Downsampled grid");
    Ok((rows, cols))
}

#[derive(Args, Debug, Clone)]
pub struct SpectrumArgs {
    /// Profile as ordered x,y,z points
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV of frequency, wavelength and amplitude
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Amplitude spectrum of the z values along a profile.
pub fn spectrum(args: &SpectrumArgs) -> Result<Spectrum> {
    let points = read_points(&args.input)
        .with_context(|| format!("failed to read profile {}", args.input.display()))?;

    let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
    let distances = xy_distances(&xy);
    let spacing = distances
        .mean_spacing()
        .ok_or_else(|| anyhow!("profile needs at least two points"))?;

    let values: Vec<f64> = points.iter().map(|p| p.z).collect();
    let spectrum = Spectrum::from_transect(&values, spacing)?;

    let mut out = create(&args.output)?;
    writeln!(out, "frequency,wavelength,amplitude")?;
    for (f, w, a) in spectrum.rows() {
        writeln!(out, "{},{},{}", f, w, a)?;
    }
    out.flush()?;

    info!(
        points = points.len(),
        length = distances.total(),
        spacing,
        dominant_wavelength = ?spectrum.dominant_wavelength(),
        "Computed profile spectrum"
    );
    Ok(spectrum)
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Reference XYZ points
    #[arg(long)]
    pub reference: PathBuf,

    /// Observed XYZ points
    #[arg(long)]
    pub observed: PathBuf,

    /// Maximum neighbour distance (defaults to the configured distance)
    #[arg(long)]
    pub search_distance: Option<f64>,

    /// Output CSV of per-point differences
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Differences between observed points and their nearest reference points.
pub fn compare(args: &CompareArgs, config: &GridProcessorConfig) -> Result<DifferenceSummary> {
    let reference = read_points(&args.reference)
        .with_context(|| format!("failed to read reference {}", args.reference.display()))?;
    let observed = read_points(&args.observed)
        .with_context(|| format!("failed to read observations {}", args.observed.display()))?;

    let search_distance = args.search_distance.unwrap_or(config.search_distance);
    let differences = point_differences(&reference, &observed, search_distance)?;
    if differences.is_empty() {
        bail!("no observation has a reference point within {}", search_distance);
    }

    let mut out = create(&args.output)?;
    writeln!(out, "x,y,observed,reference,distance,difference")?;
    for d in &differences {
        writeln!(
            out,
            "{:.6},{:.6},{:.3},{:.3},{:.3},{:.3}",
            d.observed.x, d.observed.y, d.observed.z, d.reference.z, d.distance, d.difference
        )?;
    }
    out.flush()?;

    Ok(DifferenceSummary::from_differences(&differences))
}

#[derive(Args, Debug, Clone)]
pub struct HullArgs {
    /// Point density as x,y,density
    #[arg(short, long)]
    pub density: PathBuf,

    /// Output XYZ file of boundary vertices
    #[arg(short, long)]
    pub output: PathBuf,

    /// Log density traced as the boundary (defaults to the configured level)
    #[arg(long, allow_negative_numbers = true)]
    pub boundary: Option<f64>,

    /// Smoothed log densities at or below this are ignored
    #[arg(long, allow_negative_numbers = true)]
    pub nan_limit: Option<f64>,

    /// Density grid nodes per axis
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Write every contour, not only the longest
    #[arg(long)]
    pub all: bool,
}

/// Outline of the dense part of a point-density surface.
pub fn hull(args: &HullArgs, config: &GridProcessorConfig) -> Result<(DensityHull, usize)> {
    let samples = read_points(&args.density)
        .with_context(|| format!("failed to read density {}", args.density.display()))?;

    let defaults = config.hull;
    let options = HullOptions {
        boundary: args.boundary.unwrap_or(defaults.boundary),
        nan_limit: args.nan_limit.unwrap_or(defaults.nan_limit),
        resolution: args.resolution.unwrap_or(defaults.resolution),
        ..defaults
    };

    let hull = density_hull(&samples, &options)?;
    if hull.contours.is_empty() {
        bail!("no density reaches the boundary level {}", options.boundary);
    }

    let written = hull.write(&args.output, args.all)?;
    Ok((hull, written))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::AnchorCorner;
    use raster_io::parse_points;
    use test_utils::fixtures::ascii;
    use test_utils::{
        assert_approx_eq, create_gaussian_density, create_scattered_points, create_sine_transect,
        create_test_grid, temp_test_dir, write_fixture,
    };

    fn geometry(x: f64, y: f64, nx: usize, ny: usize, px: f64, corner: &str) -> GridArgs {
        GridArgs {
            grid: None,
            x: Some(x),
            y: Some(y),
            nx: Some(nx),
            ny: Some(ny),
            pixel_width: Some(px),
            corner: corner.to_string(),
        }
    }

    fn read_back(path: &Path) -> Vec<XyzPoint> {
        parse_points(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_resolve_requires_geometry() {
        let args = GridArgs {
            corner: "lower_left".to_string(),
            ..GridArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(err.to_string().contains("--x"));
    }

    #[test]
    fn test_default_corner_is_top_left() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(flatten)]
            grid: GridArgs,
        }

        let cli = Cli::parse_from(["gridtool", "--x", "0", "--y", "100"]);
        assert_eq!(cli.grid.corner, AnchorCorner::default().as_str());
        assert_eq!(cli.grid.corner, "top_left");
    }

    #[test]
    fn test_resolve_rejects_unknown_corner() {
        assert!(geometry(0.0, 0.0, 2, 2, 1.0, "centre").resolve().is_err());
    }

    #[test]
    fn test_mesh_from_geometry() {
        let dir = temp_test_dir();
        let args = MeshArgs {
            grid: geometry(0.0, 0.0, 3, 2, 10.0, "lower_left"),
            corners: true,
            output: dir.path().join("corners.xyz"),
        };

        assert_eq!(mesh(&args).unwrap(), 12);
        let points = read_back(&args.output);
        assert_eq!(points[0], XyzPoint::new(0.0, 20.0, 0.0));
        assert_eq!(points[11], XyzPoint::new(30.0, 0.0, 0.0));
    }

    #[test]
    fn test_mesh_from_grid_skips_nodata() {
        let dir = temp_test_dir();
        let grid = write_fixture(&dir, "small.asc", ascii::SMALL_CORNER);
        let args = MeshArgs {
            grid: GridArgs {
                grid: Some(grid),
                corner: "lower_left".to_string(),
                ..GridArgs::default()
            },
            corners: false,
            output: dir.path().join("out/centres.xyz"),
        };

        assert_eq!(mesh(&args).unwrap(), 11);
        let points = read_back(&args.output);
        assert_eq!(points[0], XyzPoint::new(105.0, 225.0, 1.0));
        assert_eq!(points[10], XyzPoint::new(135.0, 205.0, 12.0));
    }

    #[test]
    fn test_corners_top_left_anchor() {
        let corners = corners(&geometry(0.0, 1_000_000.0, 200, 100, 500.0, "top_left")).unwrap();
        assert_eq!(corners.bottom_right, (100_000.0, 950_000.0));
        assert_eq!(corners.bottom_left, (0.0, 950_000.0));
    }

    #[test]
    fn test_labels_use_config_defaults() {
        let args = LabelArgs {
            grid: geometry(0.0, 0.0, 100, 100, 100.0, "lower_left"),
            x_interval: Some(2_500.0),
            y_interval: None,
            rescale: Some(1_000.0),
        };
        let mut config = GridProcessorConfig::default();
        config.labels.y_interval = 5_000.0;

        let value = labels(&args, &config).unwrap();
        assert_eq!(value["x"]["labels"], json!([0.0, 2.5, 5.0, 7.5]));
        assert_eq!(value["y"]["labels"], json!([0.0, 5.0]));
    }

    #[test]
    fn test_sample_cell_values() {
        let dir = temp_test_dir();
        let grid = write_fixture(&dir, "small.asc", ascii::SMALL_CORNER);
        let points = write_fixture(&dir, "points.txt", "105 225\n115 215\n500 500\n");
        let args = SampleArgs {
            grid,
            points,
            bilinear: false,
            output: dir.path().join("sampled.xyz"),
        };

        assert_eq!(sample(&args).unwrap(), 1);
        assert_eq!(read_back(&args.output), vec![XyzPoint::new(105.0, 225.0, 1.0)]);
    }

    #[test]
    fn test_sample_bilinear_between_centres() {
        let dir = temp_test_dir();
        let grid = write_fixture(&dir, "small.asc", ascii::SMALL_CORNER);
        // Halfway between the centres of cells 3 and 4 on the top row
        let points = write_fixture(&dir, "points.txt", "x,y\n130,225\n");
        let args = SampleArgs {
            grid,
            points,
            bilinear: true,
            output: dir.path().join("sampled.xyz"),
        };

        assert_eq!(sample(&args).unwrap(), 1);
        assert_approx_eq!(read_back(&args.output)[0].z, 3.5, 1e-9);
    }

    #[test]
    fn test_downsample_keeps_extent() {
        let dir = temp_test_dir();
        let descriptor =
            GridDescriptor::new(0.0, 0.0, 5, 4, 10.0, AnchorCorner::LowerLeft).unwrap();
        let input = AsciiGrid::new(descriptor, create_test_grid(5, 4), None).unwrap();
        let input_path = dir.path().join("fine.asc");
        input.write(&input_path).unwrap();

        let args = DownsampleArgs {
            input: input_path,
            output: dir.path().join("coarse.asc"),
            factor: Some(2),
            method: None,
        };
        assert_eq!(downsample(&args, &GridProcessorConfig::default()).unwrap(), (2, 2));

        let coarse = AsciiGrid::read(&args.output).unwrap();
        assert_eq!(coarse.descriptor.pixel_width(), 20.0);
        assert_eq!(coarse.descriptor.lower_left(), (0.0, 0.0));
        assert_eq!(coarse.nodata, Some(-9999.0));
        assert_eq!(coarse.data[[0, 0]], 500.5);
    }

    #[test]
    fn test_downsample_rejects_oversized_factor() {
        let dir = temp_test_dir();
        let grid = write_fixture(&dir, "small.asc", ascii::SMALL_CORNER);
        let args = DownsampleArgs {
            input: grid,
            output: dir.path().join("coarse.asc"),
            factor: Some(4),
            method: Some(DownsampleMethod::Max),
        };
        assert!(downsample(&args, &GridProcessorConfig::default()).is_err());
        assert!(!args.output.exists());
    }

    #[test]
    fn test_spectrum_of_sine_profile() {
        let dir = temp_test_dir();
        let transect = create_sine_transect(64, 10.0, 160.0, 5.0);
        let points: Vec<XyzPoint> = (0..64)
            .map(|i| XyzPoint::new(transect.x[i], transect.y[i], transect.z[i]))
            .collect();
        let input = dir.path().join("profile.csv");
        write_xyz(&input, &points).unwrap();

        let args = SpectrumArgs {
            input,
            output: dir.path().join("spectrum.csv"),
        };
        let spectrum = spectrum(&args).unwrap();

        let text = fs::read_to_string(&args.output).unwrap();
        assert!(text.starts_with("frequency,wavelength,amplitude\n"));
        assert_eq!(text.lines().count(), spectrum.len() + 1);
        assert_eq!(spectrum.len(), 31);
    }

    #[test]
    fn test_spectrum_needs_two_points() {
        let dir = temp_test_dir();
        let input = write_fixture(&dir, "profile.csv", "x,y,z\n0,0,1\n");
        let args = SpectrumArgs {
            input,
            output: dir.path().join("spectrum.csv"),
        };
        assert!(spectrum(&args).is_err());
    }

    #[test]
    fn test_compare_shifted_points() {
        let dir = temp_test_dir();
        let reference: Vec<XyzPoint> = create_scattered_points(200, 5_000.0, 3)
            .into_iter()
            .map(|(x, y, z)| XyzPoint::new(x, y, z))
            .collect();
        let observed: Vec<XyzPoint> = reference
            .iter()
            .map(|p| XyzPoint::new(p.x, p.y, p.z - 2.0))
            .collect();

        let args = CompareArgs {
            reference: dir.path().join("reference.xyz"),
            observed: dir.path().join("observed.xyz"),
            search_distance: Some(1.0),
            output: dir.path().join("differences.csv"),
        };
        write_xyz(&args.reference, &reference).unwrap();
        write_xyz(&args.observed, &observed).unwrap();

        let summary = compare(&args, &GridProcessorConfig::default()).unwrap();
        assert_eq!(summary.count, 200);
        assert_approx_eq!(summary.mean, -2.0, 1e-2);

        let text = fs::read_to_string(&args.output).unwrap();
        assert_eq!(text.lines().count(), 201);
    }

    #[test]
    fn test_compare_without_matches_fails() {
        let dir = temp_test_dir();
        let reference = write_fixture(&dir, "reference.xyz", "0,0,1\n");
        let observed = write_fixture(&dir, "observed.xyz", "1000,1000,1\n");
        let args = CompareArgs {
            reference,
            observed,
            search_distance: None,
            output: dir.path().join("differences.csv"),
        };
        assert!(compare(&args, &GridProcessorConfig::default()).is_err());
    }

    fn gaussian_density_text() -> String {
        create_gaussian_density(41, 25.0, 100.0)
            .into_iter()
            .map(|(x, y, d)| format!("{},{},{:e}\n", x, y, d))
            .collect()
    }

    #[test]
    fn test_hull_writes_outline() {
        let dir = temp_test_dir();
        let density = write_fixture(&dir, "density.csv", &gaussian_density_text());
        let args = HullArgs {
            density,
            output: dir.path().join("hull.xyz"),
            boundary: Some(-2.0),
            nan_limit: None,
            resolution: Some(41),
            all: false,
        };

        let (hull, written) = hull(&args, &GridProcessorConfig::default()).unwrap();
        assert_eq!(hull.level, -2.0);
        assert!(hull.outline().unwrap().closed);

        let points = read_back(&args.output);
        assert_eq!(points.len(), written);
        // Bump centred on (500, 500)
        for p in &points {
            let r = (p.x - 500.0).hypot(p.y - 500.0);
            assert!((185.0..210.0).contains(&r), "radius {}", r);
            assert_eq!(p.z, -2.0);
        }
    }

    #[test]
    fn test_hull_uses_configured_boundary() {
        let dir = temp_test_dir();
        let density = write_fixture(&dir, "density.csv", &gaussian_density_text());
        let args = HullArgs {
            density,
            output: dir.path().join("hull.xyz"),
            boundary: None,
            nan_limit: None,
            resolution: None,
            all: true,
        };

        // Peak log density is zero
        let mut config = GridProcessorConfig::default();
        config.hull.boundary = 1.0;
        assert!(hull(&args, &config).is_err());
        assert!(!args.output.exists());

        config.hull.boundary = -4.0;
        let (hull, _) = hull(&args, &config).unwrap();
        assert_eq!(hull.level, -4.0);
    }
}
