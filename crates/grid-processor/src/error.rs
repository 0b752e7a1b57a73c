//! Error types for grid processing.

use grid_common::GridError;
use raster_io::RasterIoError;
use thiserror::Error;

/// Errors that can occur during grid processing.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// The requested region is outside the grid bounds.
    #[error("requested region {requested} is outside grid bounds {grid}")]
    OutOfBounds { requested: String, grid: String },

    /// Two sequences that must be paired have different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// The shortest resolvable wavelength is finer than the sampling.
    #[error("shortest wavelength {wavelength:.2} is below the sample spacing {spacing:.2}")]
    BelowSampleSpacing { spacing: f64, wavelength: f64 },

    /// Invalid block factor for downsampling.
    #[error("invalid block factor {factor} for a {rows}x{cols} array")]
    InvalidFactor {
        factor: usize,
        rows: usize,
        cols: usize,
    },

    /// Input that cannot be processed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Grid geometry error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Raster or point file error.
    #[error(transparent)]
    Io(#[from] RasterIoError),
}

impl GridProcessorError {
    /// Create an OutOfBounds error.
    pub fn out_of_bounds(requested: impl Into<String>, grid: impl Into<String>) -> Self {
        Self::OutOfBounds {
            requested: requested.into(),
            grid: grid.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<serde_yaml::Error> for GridProcessorError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for GridProcessorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(RasterIoError::IoError(err))
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
