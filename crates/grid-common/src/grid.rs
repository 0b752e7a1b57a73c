//! Grid descriptors and their cell corner / cell centre coordinate meshes.
//!
//! A grid is placed by one of its two left-hand outer corners. Whichever
//! corner is supplied, the descriptor normalises to the lower-left origin
//! before building coordinate axes, so two descriptors of the same physical
//! rectangle produce identical meshes.

use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extent::{corners, Corners};
use crate::{BoundingBox, GridError, GridResult};

/// Which outer corner of the grid the anchor coordinate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorCorner {
    /// Top-left corner of the top-left cell (raster/GDAL convention).
    #[default]
    TopLeft,
    /// Lower-left corner of the bottom-left cell (ESRI ASCII convention).
    LowerLeft,
}

impl AnchorCorner {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorCorner::TopLeft => "top_left",
            AnchorCorner::LowerLeft => "lower_left",
        }
    }
}

impl FromStr for AnchorCorner {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top_left" => Ok(AnchorCorner::TopLeft),
            "lower_left" => Ok(AnchorCorner::LowerLeft),
            other => Err(GridError::InvalidCornerKind(other.to_string())),
        }
    }
}

impl fmt::Display for AnchorCorner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pair of 2-D coordinate arrays indexed `[row, col]`.
///
/// Row 0 is the visually topmost row of the grid (largest y).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMesh {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl CoordinateMesh {
    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.x.dim()
    }
}

/// Immutable description of a regular grid of square cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridDescriptorRepr")]
pub struct GridDescriptor {
    x: f64,
    y: f64,
    nx: usize,
    ny: usize,
    pixel_width: f64,
    corner: AnchorCorner,
}

/// Unvalidated form used when deserializing a descriptor from config files.
#[derive(Debug, Deserialize)]
struct GridDescriptorRepr {
    x: f64,
    y: f64,
    nx: usize,
    ny: usize,
    pixel_width: f64,
    #[serde(default)]
    corner: AnchorCorner,
}

impl TryFrom<GridDescriptorRepr> for GridDescriptor {
    type Error = GridError;

    fn try_from(repr: GridDescriptorRepr) -> Result<Self, Self::Error> {
        GridDescriptor::new(repr.x, repr.y, repr.nx, repr.ny, repr.pixel_width, repr.corner)
    }
}

impl GridDescriptor {
    /// Create a new grid descriptor.
    ///
    /// `(x, y)` is the outer corner named by `corner`, `nx` the number of
    /// columns, `ny` the number of rows and `pixel_width` the cell size used
    /// in both directions.
    pub fn new(
        x: f64,
        y: f64,
        nx: usize,
        ny: usize,
        pixel_width: f64,
        corner: AnchorCorner,
    ) -> GridResult<Self> {
        if nx == 0 {
            return Err(GridError::InvalidDimension { name: "nx", value: nx });
        }
        if ny == 0 {
            return Err(GridError::InvalidDimension { name: "ny", value: ny });
        }
        if !(pixel_width.is_finite() && pixel_width > 0.0) {
            return Err(GridError::InvalidCellSize(pixel_width));
        }
        if !(x.is_finite() && y.is_finite()) {
            return Err(GridError::InvalidExtent(format!(
                "anchor ({}, {}) is not finite",
                x, y
            )));
        }

        Ok(Self {
            x,
            y,
            nx,
            ny,
            pixel_width,
            corner,
        })
    }

    /// Create a descriptor from a corner name (`"top_left"` or `"lower_left"`).
    pub fn from_corner_str(
        x: f64,
        y: f64,
        nx: usize,
        ny: usize,
        pixel_width: f64,
        corner: &str,
    ) -> GridResult<Self> {
        let corner = corner.parse()?;
        Self::new(x, y, nx, ny, pixel_width, corner)
    }

    /// Anchor coordinate as supplied.
    pub fn anchor(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn corner(&self) -> AnchorCorner {
        self.corner
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    /// Shape of a cell-valued array on this grid, as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Outer lower-left corner of the grid.
    pub fn lower_left(&self) -> (f64, f64) {
        match self.corner {
            AnchorCorner::LowerLeft => (self.x, self.y),
            AnchorCorner::TopLeft => (self.x, self.y - self.pixel_width * self.ny as f64),
        }
    }

    /// Outer top-left corner of the grid.
    pub fn top_left(&self) -> (f64, f64) {
        match self.corner {
            AnchorCorner::TopLeft => (self.x, self.y),
            AnchorCorner::LowerLeft => (self.x, self.y + self.pixel_width * self.ny as f64),
        }
    }

    /// Describe the same rectangle using the other anchor convention.
    pub fn with_corner(&self, corner: AnchorCorner) -> Self {
        let (x, y) = match corner {
            AnchorCorner::TopLeft => self.top_left(),
            AnchorCorner::LowerLeft => self.lower_left(),
        };
        Self { x, y, corner, ..*self }
    }

    /// Four outer corners of the grid.
    pub fn corners(&self) -> Corners {
        let (tl_x, tl_y) = self.top_left();
        corners(tl_x, tl_y, self.pixel_width, self.nx, self.ny)
    }

    /// Bounding box of the outer cell edges.
    pub fn bbox(&self) -> BoundingBox {
        let (min_x, min_y) = self.lower_left();
        BoundingBox::new(
            min_x,
            min_y,
            min_x + self.pixel_width * self.nx as f64,
            min_y + self.pixel_width * self.ny as f64,
        )
    }

    /// X coordinates of the `nx + 1` cell edges, left to right.
    pub fn x_corner_axis(&self) -> Array1<f64> {
        let (x0, _) = self.lower_left();
        regular_axis(x0, self.nx + 1, self.pixel_width)
    }

    /// Y coordinates of the `ny + 1` cell edges, bottom to top.
    pub fn y_corner_axis(&self) -> Array1<f64> {
        let (_, y0) = self.lower_left();
        regular_axis(y0, self.ny + 1, self.pixel_width)
    }

    /// X coordinates of the `nx` cell centres, left to right.
    pub fn x_centre_axis(&self) -> Array1<f64> {
        let (x0, _) = self.lower_left();
        regular_axis(x0 + self.pixel_width / 2.0, self.nx, self.pixel_width)
    }

    /// Y coordinates of the `ny` cell centres, bottom to top.
    pub fn y_centre_axis(&self) -> Array1<f64> {
        let (_, y0) = self.lower_left();
        regular_axis(y0 + self.pixel_width / 2.0, self.ny, self.pixel_width)
    }

    /// Mesh of cell corner coordinates, shape `(ny + 1, nx + 1)`.
    ///
    /// Element `[i, j]` is the lower-left corner of cell `(i, j)`; row 0 is
    /// the top of the grid.
    pub fn cell_corner_mesh(&self) -> CoordinateMesh {
        debug!(corner = %self.corner, nx = self.nx, ny = self.ny, "building cell corner mesh");
        let (x, y) = meshgrid(&self.x_corner_axis(), &self.y_corner_axis());
        CoordinateMesh {
            x: flip_rows(x),
            y: flip_rows(y),
        }
    }

    /// Mesh of cell centre coordinates, shape `(ny, nx)`.
    pub fn cell_centre_mesh(&self) -> CoordinateMesh {
        debug!(corner = %self.corner, nx = self.nx, ny = self.ny, "building cell centre mesh");
        let (x, y) = meshgrid(&self.x_centre_axis(), &self.y_centre_axis());
        CoordinateMesh {
            x: flip_rows(x),
            y: flip_rows(y),
        }
    }
}

/// `n` values `start + k * step`; each value is computed directly from `k`
/// so results do not depend on accumulated rounding.
fn regular_axis(start: f64, n: usize, step: f64) -> Array1<f64> {
    Array1::from_shape_fn(n, |k| start + k as f64 * step)
}

/// Outer product of two axes, `xy` indexing: output shape is `(y.len(), x.len())`.
fn meshgrid(x: &Array1<f64>, y: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (y.len(), x.len());
    let xv = Array2::from_shape_fn(shape, |(_, col)| x[col]);
    let yv = Array2::from_shape_fn(shape, |(row, _)| y[row]);
    (xv, yv)
}

// Row 0 becomes the top of the grid for image-style display.
fn flip_rows(a: Array2<f64>) -> Array2<f64> {
    a.slice(s![..;-1, ..]).to_owned()
}
