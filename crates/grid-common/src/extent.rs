//! Raster corner coordinates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::BoundingBox;

/// The four outer corners of a raster, each as `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corners {
    pub top_left: (f64, f64),
    pub top_right: (f64, f64),
    pub bottom_right: (f64, f64),
    pub bottom_left: (f64, f64),
}

impl Corners {
    /// Corners in the order top-left, top-right, bottom-right, bottom-left.
    pub fn to_array(&self) -> [(f64, f64); 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Extent in the `[xmin, xmax, ymin, ymax]` order expected by
    /// `imshow`-style plotting.
    pub fn imshow_extent(&self) -> [f64; 4] {
        [
            self.bottom_left.0,
            self.bottom_right.0,
            self.bottom_left.1,
            self.top_left.1,
        ]
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.bottom_left.0,
            self.bottom_left.1,
            self.top_right.0,
            self.top_right.1,
        )
    }
}

/// Calculate corner coordinates from a known top-left corner, cell size
/// (`post`) and image dimensions.
pub fn corners(top_left_x: f64, top_left_y: f64, post: f64, cols: usize, rows: usize) -> Corners {
    let tl = (top_left_x, top_left_y);
    let tr = (top_left_x + cols as f64 * post, top_left_y);
    let br = (tr.0, top_left_y - rows as f64 * post);
    let bl = (top_left_x, br.1);

    debug!(
        tl_easting = tl.0,
        tl_northing = tl.1,
        br_easting = br.0,
        br_northing = br.1,
        "computed raster corners"
    );

    Corners {
        top_left: tl,
        top_right: tr,
        bottom_right: br,
        bottom_left: bl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners() {
        let c = corners(-800_000.0, -599_500.0, 500.0, 200, 100);
        assert_eq!(c.top_left, (-800_000.0, -599_500.0));
        assert_eq!(c.top_right, (-700_000.0, -599_500.0));
        assert_eq!(c.bottom_right, (-700_000.0, -649_500.0));
        assert_eq!(c.bottom_left, (-800_000.0, -649_500.0));
    }

    #[test]
    fn test_imshow_extent() {
        let c = corners(0.0, 100.0, 10.0, 5, 4);
        assert_eq!(c.imshow_extent(), [0.0, 50.0, 60.0, 100.0]);
        assert_eq!(c.bbox(), BoundingBox::new(0.0, 60.0, 50.0, 100.0));
    }
}
