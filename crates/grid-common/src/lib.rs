//! Common types shared across the bathymetry grid toolkit.
//!
//! The centre of this crate is [`GridDescriptor`]: a regular, square-celled
//! grid anchored at either its top-left or lower-left outer corner. From a
//! descriptor you can derive cell corner and cell centre coordinate meshes,
//! the four corner coordinates of the raster and tick labels for annotated
//! plots.
//!
//! ```
//! use grid_common::{AnchorCorner, GridDescriptor};
//!
//! let grid = GridDescriptor::new(-800_000.0, -3_400_000.0, 301, 561, 500.0, AnchorCorner::LowerLeft)?;
//! let mesh = grid.cell_centre_mesh();
//! assert_eq!(mesh.shape(), (561, 301));
//! # Ok::<(), grid_common::GridError>(())
//! ```

pub mod bbox;
pub mod dates;
pub mod error;
pub mod extent;
pub mod geotransform;
pub mod grid;
pub mod labels;

pub use bbox::BoundingBox;
pub use error::{GridError, GridResult};
pub use extent::{corners, Corners};
pub use geotransform::GeoTransform;
pub use grid::{AnchorCorner, CoordinateMesh, GridDescriptor};
pub use labels::{arange, grid_extent_labels, AxisTicks, ExtentLabels, LabelIntervals};
