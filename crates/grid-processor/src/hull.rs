//! Density boundary ("concave hull") estimation.
//!
//! A point-density surface, given as scattered `x, y, density` samples, is
//! gridded in log space, smoothed with a Gaussian filter and contoured at a
//! boundary density. The contour outlines the area where the survey points
//! are dense enough to be trusted.
//!
//! Contours are traced with marching squares on the smoothed grid; cells
//! with a NaN corner are skipped, so masked low-density areas break lines
//! rather than bend them.

use std::collections::VecDeque;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use raster_io::{write_xyz, XyzPoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compare::NeighbourIndex;
use crate::error::{GridProcessorError, Result};
use crate::spectral::linspace;

/// Settings for [`density_hull`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullOptions {
    /// Log density traced as the boundary.
    pub boundary: f64,
    /// Smoothed log densities at or below this become NaN.
    pub nan_limit: f64,
    /// Nodes along each axis of the density grid.
    pub resolution: usize,
    /// Gaussian filter standard deviation, in grid nodes.
    pub sigma: f64,
}

impl Default for HullOptions {
    fn default() -> Self {
        Self {
            boundary: -16.5,
            nan_limit: -40.0,
            resolution: 50,
            sigma: 1.0,
        }
    }
}

impl HullOptions {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.boundary.is_finite() {
            return Err("hull boundary must be finite".to_string());
        }
        if !self.nan_limit.is_finite() {
            return Err("hull nan_limit must be finite".to_string());
        }
        if self.resolution < 2 {
            return Err("hull resolution must be at least 2".to_string());
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err("hull sigma must be a positive number".to_string());
        }
        Ok(())
    }
}

/// Log density on a regular lattice. Row `i` lies at `y[i]`, with `y`
/// increasing, so row 0 is the bottom of the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub values: Array2<f64>,
}

impl DensityGrid {
    /// Map coordinate of a fractional `(col, row)` lattice position.
    pub fn coord(&self, col: f64, row: f64) -> (f64, f64) {
        (lerp_axis(&self.x, col), lerp_axis(&self.y, row))
    }
}

fn lerp_axis(axis: &Array1<f64>, pos: f64) -> f64 {
    let n = axis.len();
    if n < 2 {
        return axis.first().copied().unwrap_or(f64::NAN);
    }
    let step = (axis[n - 1] - axis[0]) / (n - 1) as f64;
    axis[0] + pos * step
}

/// Grid `ln(density)` onto a `resolution x resolution` lattice spanning the
/// samples' extent.
///
/// Each node takes the nearest sample within reach: the larger of the node
/// diagonal and twice the mean sample spacing. Nodes with no sample in reach
/// are NaN. Samples with a non-positive or non-finite density are ignored.
pub fn grid_log_density(samples: &[XyzPoint], resolution: usize) -> Result<DensityGrid> {
    if resolution < 2 {
        return Err(GridProcessorError::invalid_input(format!(
            "density grid needs at least 2 nodes per axis, got {}",
            resolution
        )));
    }

    let logs: Vec<XyzPoint> = samples
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite() && p.z > 0.0)
        .map(|p| XyzPoint::new(p.x, p.y, p.z.ln()))
        .collect();

    let ignored = samples.len() - logs.len();
    if ignored > 0 {
        debug!(ignored, "Ignored density samples without a positive value");
    }

    let (min_x, max_x, min_y, max_y) = logs.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(x0, x1, y0, y1), p| (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
    );
    if !(max_x > min_x && max_y > min_y) {
        return Err(GridProcessorError::invalid_input(
            "density samples must span a non-zero area",
        ));
    }

    let x = Array1::from(linspace(min_x, max_x, resolution));
    let y = Array1::from(linspace(min_y, max_y, resolution));
    let dx = (max_x - min_x) / (resolution - 1) as f64;
    let dy = (max_y - min_y) / (resolution - 1) as f64;

    let sample_spacing = ((max_x - min_x) * (max_y - min_y) / logs.len() as f64).sqrt();
    let reach = dx.hypot(dy).max(2.0 * sample_spacing);
    let index = NeighbourIndex::new(&logs, reach);

    let values = Array2::from_shape_fn((resolution, resolution), |(row, col)| {
        index
            .nearest(x[col], y[row], reach)
            .map_or(f64::NAN, |(i, _)| logs[i].z)
    });

    debug!(samples = logs.len(), resolution, reach, "Gridded log density");
    Ok(DensityGrid { x, y, values })
}

/// Separable Gaussian filter with reflected edges and a kernel truncated at
/// four standard deviations. NaN inputs spread to every output they touch.
pub fn gaussian_smooth(data: &Array2<f64>, sigma: f64) -> Result<Array2<f64>> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(GridProcessorError::invalid_input(format!(
            "smoothing sigma must be positive, got {}",
            sigma
        )));
    }

    let kernel = gaussian_kernel(sigma);
    let rows_done = convolve_axis(data, &kernel, Axis(1));
    Ok(convolve_axis(&rows_done, &kernel, Axis(0)))
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as i64;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Half-sample symmetric reflection: `d c b a | a b c d | d c b a`.
fn reflect(i: i64, n: i64) -> usize {
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m - 1 }) as usize
}

fn convolve_axis(data: &Array2<f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let radius = (kernel.len() / 2) as i64;
    let mut out = Array2::zeros(data.dim());

    for (src, mut dst) in data.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = src.len() as i64;
        for (i, d) in dst.iter_mut().enumerate() {
            *d = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * src[reflect(i as i64 + k as i64 - radius, n)])
                .sum();
        }
    }
    out
}

/// Replace values at or below `limit` with NaN.
pub fn mask_at_or_below(data: &mut Array2<f64>, limit: f64) -> usize {
    let mut masked = 0;
    data.mapv_inplace(|v| {
        if v <= limit {
            masked += 1;
            f64::NAN
        } else {
            v
        }
    });
    masked
}

/// A contour edge in fractional `(col, row)` lattice coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// Marching squares over every 2x2 cell of `values` at `level`.
pub fn march_squares(values: &Array2<f64>, level: f64) -> Vec<Segment> {
    let (rows, cols) = values.dim();
    if rows < 2 || cols < 2 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let tl = values[[r, c]];
            let tr = values[[r, c + 1]];
            let bl = values[[r + 1, c]];
            let br = values[[r + 1, c + 1]];
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }

            let (x, y) = (c as f64, r as f64);
            let top = interpolate_edge((x, y), (x + 1.0, y), tl, tr, level);
            let right = interpolate_edge((x + 1.0, y), (x + 1.0, y + 1.0), tr, br, level);
            let bottom = interpolate_edge((x, y + 1.0), (x + 1.0, y + 1.0), bl, br, level);
            let left = interpolate_edge((x, y), (x, y + 1.0), tl, bl, level);

            let mut push = |start, end| segments.push(Segment { start, end });
            match case {
                1 | 14 => push(left, top),
                2 | 13 => push(top, right),
                3 | 12 => push(left, right),
                4 | 11 => push(right, bottom),
                5 => {
                    push(left, top);
                    push(right, bottom);
                }
                6 | 9 => push(top, bottom),
                7 | 8 => push(left, bottom),
                10 => {
                    push(top, right);
                    push(left, bottom);
                }
                _ => {}
            }
        }
    }
    segments
}

fn interpolate_edge(a: (f64, f64), b: (f64, f64), va: f64, vb: f64, level: f64) -> (f64, f64) {
    if (vb - va).abs() < 1e-12 {
        return ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    }
    let t = ((level - va) / (vb - va)).clamp(0.0, 1.0);
    (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}

const JOIN_EPSILON: f64 = 1e-9;

fn same_point(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).hypot(a.1 - b.1) < JOIN_EPSILON
}

/// A traced contour line in map coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

impl ContourLine {
    /// Length along the line.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
            .sum()
    }
}

/// Chain unordered segments into polylines, growing each line from both
/// ends until no segment touches it.
pub fn connect_segments(segments: &[Segment]) -> Vec<ContourLine> {
    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let mut points = VecDeque::from([segments[first].start, segments[first].end]);

        loop {
            let (head, tail) = match (points.front(), points.back()) {
                (Some(&h), Some(&t)) => (h, t),
                _ => break,
            };
            if points.len() > 2 && same_point(head, tail) {
                break;
            }

            let next = segments.iter().enumerate().find_map(|(i, s)| {
                if used[i] {
                    None
                } else if same_point(s.start, tail) {
                    Some((i, s.end, true))
                } else if same_point(s.end, tail) {
                    Some((i, s.start, true))
                } else if same_point(s.end, head) {
                    Some((i, s.start, false))
                } else if same_point(s.start, head) {
                    Some((i, s.end, false))
                } else {
                    None
                }
            });

            match next {
                Some((i, p, at_tail)) => {
                    used[i] = true;
                    if at_tail {
                        points.push_back(p);
                    } else {
                        points.push_front(p);
                    }
                }
                None => break,
            }
        }

        let points: Vec<(f64, f64)> = points.into_iter().collect();
        let closed = points.len() > 3
            && matches!((points.first(), points.last()), (Some(&a), Some(&b)) if same_point(a, b));
        lines.push(ContourLine { points, closed });
    }
    lines
}

/// Boundary contours of a density surface, longest first.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityHull {
    pub level: f64,
    pub contours: Vec<ContourLine>,
}

impl DensityHull {
    /// The longest contour, taken as the outline of the dense area.
    pub fn outline(&self) -> Option<&ContourLine> {
        self.contours.first()
    }

    /// Vertices of the outline (or of every contour when `all`) as points
    /// whose z is the boundary level.
    pub fn vertices(&self, all: bool) -> Vec<XyzPoint> {
        let take = if all { self.contours.len() } else { 1 };
        self.contours
            .iter()
            .take(take)
            .flat_map(|c| c.points.iter().map(|&(x, y)| XyzPoint::new(x, y, self.level)))
            .collect()
    }

    /// Write vertices as XYZ. See [`DensityHull::vertices`].
    pub fn write(&self, path: impl AsRef<Path>, all: bool) -> Result<usize> {
        let points = self.vertices(all);
        write_xyz(path, &points)?;
        Ok(points.len())
    }
}

/// Grid, smooth, mask and contour a density sample set.
pub fn density_hull(samples: &[XyzPoint], options: &HullOptions) -> Result<DensityHull> {
    options
        .validate()
        .map_err(GridProcessorError::invalid_input)?;

    let grid = grid_log_density(samples, options.resolution)?;
    let mut smooth = gaussian_smooth(&grid.values, options.sigma)?;
    let masked = mask_at_or_below(&mut smooth, options.nan_limit);

    let segments = march_squares(&smooth, options.boundary);
    let mut contours: Vec<ContourLine> = connect_segments(&segments)
        .into_iter()
        .map(|line| ContourLine {
            points: line
                .points
                .iter()
                .map(|&(col, row)| grid.coord(col, row))
                .collect(),
            closed: line.closed,
        })
        .collect();
    contours.sort_by(|a, b| b.length().total_cmp(&a.length()));

    info!(
        boundary = options.boundary,
        masked,
        segments = segments.len(),
        contours = contours.len(),
        "Traced density boundary"
    );

    Ok(DensityHull {
        level: options.boundary,
        contours,
    })
}
