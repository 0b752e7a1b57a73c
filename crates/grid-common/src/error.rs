//! Error types for grid construction and coordinate handling.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while describing grids and their coordinates.
///
/// Every variant is a configuration error: it is raised when a value is
/// constructed and never silently coerced to a default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("corner must be either 'top_left' or 'lower_left', got '{0}'")]
    InvalidCornerKind(String),

    #[error("invalid grid dimension {name} = {value}: must be greater than zero")]
    InvalidDimension { name: &'static str, value: usize },

    #[error("invalid cell size {0}: must be positive and finite")]
    InvalidCellSize(f64),

    #[error("invalid label interval {name} = {value}: must be positive and finite")]
    InvalidInterval { name: &'static str, value: f64 },

    #[error("invalid extent: {0}")]
    InvalidExtent(String),

    #[error("unsupported geotransform: {0}")]
    UnsupportedGeoTransform(String),

    #[error("invalid julian day: {0}")]
    InvalidJulianDay(f64),
}

impl GridError {
    /// Short machine-readable code for this error, used in CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            GridError::InvalidCornerKind(_) => "InvalidCornerKind",
            GridError::InvalidDimension { .. } => "InvalidDimension",
            GridError::InvalidCellSize(_) => "InvalidCellSize",
            GridError::InvalidInterval { .. } => "InvalidInterval",
            GridError::InvalidExtent(_) => "InvalidExtent",
            GridError::UnsupportedGeoTransform(_) => "UnsupportedGeoTransform",
            GridError::InvalidJulianDay(_) => "InvalidJulianDay",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GridError::InvalidCornerKind("upper_right".to_string());
        assert_eq!(
            err.to_string(),
            "corner must be either 'top_left' or 'lower_left', got 'upper_right'"
        );
        assert_eq!(err.code(), "InvalidCornerKind");

        let err = GridError::InvalidDimension { name: "nx", value: 0 };
        assert!(err.to_string().contains("nx = 0"));
    }
}
