//! Error types for raster and point file I/O.

use grid_common::GridError;
use thiserror::Error;

/// Result type for raster I/O operations.
pub type RasterIoResult<T> = Result<T, RasterIoError>;

/// Error types for reading and writing grids and point files.
#[derive(Error, Debug)]
pub enum RasterIoError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Required header key absent
    #[error("Missing header key: {0}")]
    MissingHeader(&'static str),

    /// Header line that is not a `key value` pair
    #[error("Invalid header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    /// Unparsable numeric token
    #[error("Invalid number '{value}' at line {line}")]
    InvalidNumber { line: usize, value: String },

    /// Grid body holds a different number of values than the header declares
    #[error("Expected {expected} values, found {found}")]
    ValueCount { expected: usize, found: usize },

    /// Array shapes that must agree do not
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Grid definition rejected
    #[error(transparent)]
    Grid(#[from] GridError),
}
