//! Processing operations for gridded and scattered elevation data.
//!
//! This crate sits on top of [`grid_common`] (grid geometry) and
//! [`raster_io`] (file formats) and provides:
//!
//! - **Sampling**: cell lookup and bilinear interpolation at points
//! - **Downsampling**: NaN-aware block reduction and border trimming
//! - **Subsetting**: clip a raster to the extent of another dataset
//! - **Index lookup**: nearest-value and membership searches in arrays
//! - **Profiles**: distances along a transect and their amplitude spectra
//! - **Comparison**: nearest-neighbour differences between point sets
//! - **Density boundary**: outline of a point-density surface by contouring
//!
//! # Example
//!
//! ```
//! use grid_processor::{block_reduce, DownsampleMethod};
//! use ndarray::Array2;
//!
//! let data = Array2::from_shape_fn((4, 6), |(r, c)| (r * 6 + c) as f64);
//! let coarse = block_reduce(&data, 2, DownsampleMethod::Max)?;
//! assert_eq!(coarse.dim(), (2, 3));
//! assert_eq!(coarse[[0, 0]], 7.0);
//! # Ok::<(), grid_processor::GridProcessorError>(())
//! ```

pub mod compare;
pub mod config;
pub mod downsample;
pub mod error;
pub mod hull;
pub mod index;
pub mod sample;
pub mod spectral;
pub mod subset;
pub mod transect;

// Re-export commonly used types at crate root
pub use compare::{point_differences, DifferenceSummary, PointDifference};
pub use config::GridProcessorConfig;
pub use downsample::{block_mean, block_reduce, trim_constant_rows_cols, DownsampleMethod};
pub use error::{GridProcessorError, Result};
pub use hull::{density_hull, gaussian_smooth, grid_log_density, DensityHull, HullOptions};
pub use index::{first_index, index_1d, index_2d};
pub use sample::{extract_values, sample_bilinear};
pub use spectral::{
    amplitude_spectrum, check_nyquist, frequency_axis, magnitude_metres, wavelength_metres,
    wavelengths, Spectrum,
};
pub use subset::{subset_to_extent, subset_to_grid};
pub use transect::{check_length_equality, xy_distances, TransectDistances};
