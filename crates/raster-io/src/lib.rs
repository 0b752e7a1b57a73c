//! Readers and writers for gridded and scattered elevation data.
//!
//! Two formats are supported:
//!
//! - ESRI ArcInfo ASCII grids ([`AsciiGrid`]), the lowest common
//!   denominator for exchanging regular rasters between GIS packages.
//! - Comma or whitespace separated `x,y,z` point files ([`XyzPoint`]),
//!   used for survey soundings and flattened coordinate meshes.
//!
//! Grid geometry is expressed with [`grid_common::GridDescriptor`] so that
//! meshes, corner coordinates and geotransforms all come from one place.

pub mod ascii_grid;
pub mod error;
pub mod xyz;

pub use ascii_grid::AsciiGrid;
pub use error::{RasterIoError, RasterIoResult};
pub use xyz::{
    parse_points, read_points, strip_duplicates, subsample_rows, write_xyz, xyz_triples,
    XyzPoint,
};
