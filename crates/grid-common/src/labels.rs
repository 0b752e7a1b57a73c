//! Tick positions and labels for annotated raster plots.
//!
//! Given the shape of an image array and the projected position of its
//! top-left corner, [`grid_extent_labels`] returns pixel-index tick
//! positions paired with the map coordinates they represent, ready to be
//! handed to a plotting library's `xticks` / `yticks`.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::extent::corners;
use crate::{GridDescriptor, GridError, GridResult};

/// Label spacing in map units, plus a divisor applied to label values
/// (e.g. `1000` to label metres as kilometres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelIntervals {
    pub x_interval: f64,
    pub y_interval: f64,
    pub rescale: f64,
}

impl Default for LabelIntervals {
    fn default() -> Self {
        Self {
            x_interval: 200_000.0,
            y_interval: 400_000.0,
            rescale: 1.0,
        }
    }
}

impl LabelIntervals {
    pub fn new(x_interval: f64, y_interval: f64) -> Self {
        Self {
            x_interval,
            y_interval,
            ..Self::default()
        }
    }

    pub fn with_rescale(self, rescale: f64) -> Self {
        Self { rescale, ..self }
    }

    pub fn validate(&self) -> GridResult<()> {
        for (name, value) in [
            ("x_interval", self.x_interval),
            ("y_interval", self.y_interval),
            ("rescale", self.rescale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridError::InvalidInterval { name, value });
            }
        }
        Ok(())
    }
}

/// Tick positions (in pixel index units) and their coordinate labels.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTicks {
    pub positions: Array1<f64>,
    pub labels: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtentLabels {
    pub x: AxisTicks,
    pub y: AxisTicks,
}

impl ExtentLabels {
    /// Labels for an array covering exactly the cells of `grid`.
    pub fn for_grid(grid: &GridDescriptor, intervals: &LabelIntervals) -> GridResult<Self> {
        let (tl_x, tl_y) = grid.top_left();
        grid_extent_labels(
            grid.shape(),
            tl_x,
            tl_y,
            grid.pixel_width(),
            grid.nx(),
            grid.ny(),
            intervals,
        )
    }
}

/// Half-open range `[start, stop)` in steps of `step`, with numpy `arange`
/// semantics: `ceil((stop - start) / step)` elements.
pub fn arange(start: f64, stop: f64, step: f64) -> Array1<f64> {
    let n = ((stop - start) / step).ceil();
    let n = if n.is_finite() && n > 0.0 { n as usize } else { 0 };
    Array1::from_shape_fn(n, |k| start + k as f64 * step)
}

/// Calculate tick positions and labels for an image of `shape` (rows, cols)
/// whose top-left corner is at `(tl_x, tl_y)`, with cell size `post` and
/// raster dimensions `cols` x `rows`.
pub fn grid_extent_labels(
    shape: (usize, usize),
    tl_x: f64,
    tl_y: f64,
    post: f64,
    cols: usize,
    rows: usize,
    intervals: &LabelIntervals,
) -> GridResult<ExtentLabels> {
    let (shape_rows, shape_cols) = shape;
    for (name, value) in [
        ("shape rows", shape_rows),
        ("shape cols", shape_cols),
        ("cols", cols),
        ("rows", rows),
    ] {
        if value == 0 {
            return Err(GridError::InvalidDimension { name, value });
        }
    }
    if !(post.is_finite() && post > 0.0) {
        return Err(GridError::InvalidCellSize(post));
    }
    intervals.validate()?;

    let (br_x, br_y) = corners(tl_x, tl_y, post, cols, rows).bottom_right;

    let x_labels = arange(tl_x, br_x, intervals.x_interval).mapv(|v| v / intervals.rescale);
    let y_labels = arange(br_y, tl_y, intervals.y_interval).mapv(|v| v / intervals.rescale);

    let tick_num_x = (br_x - tl_x) / intervals.x_interval;
    let tick_num_y = (tl_y - br_y) / intervals.y_interval;

    let x_positions = arange(0.0, shape_cols as f64, shape_cols as f64 / tick_num_x);
    let y_positions = arange(0.0, shape_rows as f64, shape_rows as f64 / tick_num_y);

    Ok(ExtentLabels {
        x: AxisTicks {
            positions: x_positions,
            labels: x_labels,
        },
        y: AxisTicks {
            positions: y_positions,
            labels: y_labels,
        },
    })
}
