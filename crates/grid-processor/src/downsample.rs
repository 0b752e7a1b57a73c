//! Block reduction of gridded data.
//!
//! A raster of `rows x cols` reduced by `factor` becomes
//! `rows / factor x cols / factor`; trailing rows and columns that do not
//! fill a whole block are discarded.

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// Method used to reduce each block.
///
/// - **Mean**: continuous surfaces such as elevation
/// - **Max**: preserves peaks, e.g. shoal depths
/// - **Nearest**: fast, keeps exact values, good for categorical data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMethod {
    /// Average of the valid cells in the block
    #[default]
    Mean,
    /// Maximum of the valid cells in the block
    Max,
    /// Top-left cell of the block
    Nearest,
}

impl DownsampleMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Max => "max",
            Self::Nearest => "nearest",
        }
    }
}

impl FromStr for DownsampleMethod {
    type Err = String;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "max" => Ok(Self::Max),
            "nearest" => Ok(Self::Nearest),
            other => Err(format!("unknown downsample method '{}'", other)),
        }
    }
}

impl fmt::Display for DownsampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reduce `data` in `factor x factor` blocks.
///
/// NaN cells are ignored by `Mean` and `Max`; a block with no valid cells
/// yields NaN.
pub fn block_reduce(
    data: &Array2<f64>,
    factor: usize,
    method: DownsampleMethod,
) -> Result<Array2<f64>> {
    let (rows, cols) = data.dim();
    if factor == 0 || rows / factor == 0 || cols / factor == 0 {
        return Err(GridProcessorError::InvalidFactor { factor, rows, cols });
    }

    let (new_rows, new_cols) = (rows / factor, cols / factor);
    let output = Array2::from_shape_fn((new_rows, new_cols), |(r, c)| {
        let block = data.slice(s![
            r * factor..(r + 1) * factor,
            c * factor..(c + 1) * factor
        ]);
        match method {
            DownsampleMethod::Mean => mean_of_block(block),
            DownsampleMethod::Max => max_of_block(block),
            DownsampleMethod::Nearest => block[[0, 0]],
        }
    });

    debug!(rows, cols, new_rows, new_cols, factor, %method, "Block reduced grid");
    Ok(output)
}

/// Shorthand for [`block_reduce`] with [`DownsampleMethod::Mean`].
pub fn block_mean(data: &Array2<f64>, factor: usize) -> Result<Array2<f64>> {
    block_reduce(data, factor, DownsampleMethod::Mean)
}

/// Drop rows, then columns, whose valid values are all equal.
///
/// Rows or columns holding only NaN count as constant. Useful for removing
/// fill borders around a raster.
pub fn trim_constant_rows_cols(data: &Array2<f64>) -> Array2<f64> {
    let keep_rows: Vec<usize> = data
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| !is_constant(row.iter().copied()))
        .map(|(i, _)| i)
        .collect();
    let trimmed = data.select(Axis(0), &keep_rows);

    let keep_cols: Vec<usize> = trimmed
        .axis_iter(Axis(1))
        .enumerate()
        .filter(|(_, col)| !is_constant(col.iter().copied()))
        .map(|(i, _)| i)
        .collect();

    let result = trimmed.select(Axis(1), &keep_cols);
    debug!(
        from = ?data.dim(),
        to = ?result.dim(),
        "Trimmed constant rows and columns"
    );
    result
}

fn is_constant(values: impl Iterator<Item = f64>) -> bool {
    let mut first: Option<f64> = None;
    for v in values.filter(|v| !v.is_nan()) {
        match first {
            None => first = Some(v),
            Some(f) if f != v => return false,
            Some(_) => {}
        }
    }
    true
}

/// Mean of the valid (non-NaN) values in a block; NaN if there are none.
#[inline]
fn mean_of_block(block: ArrayView2<f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0;

    for &v in block.iter() {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Maximum of the valid (non-NaN) values in a block; NaN if there are none.
#[inline]
fn max_of_block(block: ArrayView2<f64>) -> f64 {
    let mut max = f64::NEG_INFINITY;
    let mut has_valid = false;

    for &v in block.iter() {
        if !v.is_nan() {
            has_valid = true;
            if v > max {
                max = v;
            }
        }
    }

    if has_valid {
        max
    } else {
        f64::NAN
    }
}
