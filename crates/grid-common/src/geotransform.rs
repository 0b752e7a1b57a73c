//! GDAL-style affine geotransforms.
//!
//! The six coefficients follow the GDAL ordering:
//!
//! ```text
//! [0] top left x
//! [1] w-e pixel resolution
//! [2] rotation, 0 if the image is "north up"
//! [3] top left y
//! [4] rotation, 0 if the image is "north up"
//! [5] n-s pixel resolution (negative for north-up images)
//! ```

use serde::{Deserialize, Serialize};

use crate::{AnchorCorner, BoundingBox, GridDescriptor, GridError, GridResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform with square pixels of size `post`.
    pub fn north_up(top_left_x: f64, top_left_y: f64, post: f64) -> Self {
        Self {
            top_left_x,
            pixel_width: post,
            rotation_x: 0.0,
            top_left_y,
            rotation_y: 0.0,
            pixel_height: -post,
        }
    }

    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    pub fn is_north_up(&self) -> bool {
        self.rotation_x == 0.0 && self.rotation_y == 0.0 && self.pixel_height < 0.0
    }

    /// Coordinate of the top-left corner of pixel `(col, row)`.
    pub fn pixel_to_coord(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.top_left_x + col * self.pixel_width + row * self.rotation_x,
            self.top_left_y + col * self.rotation_y + row * self.pixel_height,
        )
    }

    /// Coordinate of the centre of pixel `(col, row)`.
    pub fn pixel_centre(&self, col: usize, row: usize) -> (f64, f64) {
        self.pixel_to_coord(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Pixel containing `(x, y)` on a north-up raster, origin top left.
    ///
    /// Returns `None` for points left of or above the raster origin. The
    /// caller checks the upper bounds against the raster shape.
    pub fn coord_to_pixel(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.top_left_x) / self.pixel_width).floor();
        let row = ((self.top_left_y - y) / self.pixel_height.abs()).floor();

        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }

        Some((col as usize, row as usize))
    }

    /// Fractional pixel position of `(x, y)` relative to the top-left corner.
    pub fn coord_to_fractional_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.top_left_x) / self.pixel_width,
            (self.top_left_y - y) / self.pixel_height.abs(),
        )
    }

    /// Grid descriptor for a `nx` by `ny` raster with this transform.
    ///
    /// Only north-up transforms with square pixels describe a regular grid.
    pub fn grid(&self, nx: usize, ny: usize) -> GridResult<GridDescriptor> {
        if !self.is_north_up() {
            return Err(GridError::UnsupportedGeoTransform(format!(
                "rotated or south-up transform {:?}",
                self.to_gdal()
            )));
        }
        if self.pixel_width != -self.pixel_height {
            return Err(GridError::UnsupportedGeoTransform(format!(
                "non-square pixels {} x {}",
                self.pixel_width, -self.pixel_height
            )));
        }

        GridDescriptor::new(
            self.top_left_x,
            self.top_left_y,
            nx,
            ny,
            self.pixel_width,
            AnchorCorner::TopLeft,
        )
    }

    /// Pixel sizes for an image resampled from `in_cols` x `in_rows` to
    /// `new_cols` x `new_rows` covering the same extent.
    pub fn rescaled(
        &self,
        in_cols: usize,
        in_rows: usize,
        new_cols: usize,
        new_rows: usize,
    ) -> GridResult<Self> {
        if new_cols == 0 {
            return Err(GridError::InvalidDimension {
                name: "new_cols",
                value: new_cols,
            });
        }
        if new_rows == 0 {
            return Err(GridError::InvalidDimension {
                name: "new_rows",
                value: new_rows,
            });
        }

        Ok(Self {
            pixel_width: in_cols as f64 * self.pixel_width / new_cols as f64,
            pixel_height: in_rows as f64 * self.pixel_height / new_rows as f64,
            ..*self
        })
    }

    /// Bounding box of a `cols` x `rows` north-up raster.
    pub fn bbox(&self, cols: usize, rows: usize) -> BoundingBox {
        let (x0, y0) = self.pixel_to_coord(0.0, 0.0);
        let (x1, y1) = self.pixel_to_coord(cols as f64, rows as f64);
        BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl From<&GridDescriptor> for GeoTransform {
    fn from(grid: &GridDescriptor) -> Self {
        let (x, y) = grid.top_left();
        GeoTransform::north_up(x, y, grid.pixel_width())
    }
}
