//! Clipping rasters to the extent of another dataset.

use grid_common::{BoundingBox, GeoTransform, GridDescriptor};
use ndarray::{s, Array2};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// Clip a north-up raster to its overlap with `extent`.
///
/// The window is widened to whole cells, so the returned raster covers the
/// overlap completely. Returns the clipped array and its geotransform.
pub fn subset_to_extent(
    data: &Array2<f64>,
    transform: &GeoTransform,
    extent: &BoundingBox,
) -> Result<(Array2<f64>, GeoTransform)> {
    if !transform.is_north_up() {
        return Err(GridProcessorError::invalid_input(format!(
            "cannot subset a rotated raster {:?}",
            transform.to_gdal()
        )));
    }

    let (rows, cols) = data.dim();
    let raster_bbox = transform.bbox(cols, rows);
    let overlap = raster_bbox.intersection(extent).ok_or_else(|| {
        GridProcessorError::out_of_bounds(format!("{:?}", extent), format!("{:?}", raster_bbox))
    })?;

    let pw = transform.pixel_width;
    let ph = transform.pixel_height.abs();

    let col0 = (((overlap.min_x - transform.top_left_x) / pw).floor().max(0.0) as usize).min(cols);
    let col1 = (((overlap.max_x - transform.top_left_x) / pw).ceil().max(0.0) as usize).min(cols);
    let row0 = (((transform.top_left_y - overlap.max_y) / ph).floor().max(0.0) as usize).min(rows);
    let row1 = (((transform.top_left_y - overlap.min_y) / ph).ceil().max(0.0) as usize).min(rows);

    if col0 >= col1 || row0 >= row1 {
        return Err(GridProcessorError::out_of_bounds(
            format!("{:?}", extent),
            format!("{:?}", raster_bbox),
        ));
    }

    let clipped = data.slice(s![row0..row1, col0..col1]).to_owned();
    let (tl_x, tl_y) = transform.pixel_to_coord(col0 as f64, row0 as f64);
    let clipped_transform = GeoTransform {
        top_left_x: tl_x,
        top_left_y: tl_y,
        ..*transform
    };

    debug!(
        rows = row1 - row0,
        cols = col1 - col0,
        row0,
        col0,
        "Subset raster to extent"
    );
    Ok((clipped, clipped_transform))
}

/// Clip a raster to the outer extent of `grid`.
pub fn subset_to_grid(
    data: &Array2<f64>,
    transform: &GeoTransform,
    grid: &GridDescriptor,
) -> Result<(Array2<f64>, GeoTransform)> {
    subset_to_extent(data, transform, &grid.bbox())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::AnchorCorner;
    use ndarray::array;

    fn raster() -> (Array2<f64>, GeoTransform) {
        // 4 x 3 raster of 10 unit cells covering x 0..40, y 0..30
        let data = Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as f64);
        (data, GeoTransform::north_up(0.0, 30.0, 10.0))
    }

    #[test]
    fn test_subset_whole_cells() {
        let (data, gt) = raster();
        let (clipped, ct) =
            subset_to_extent(&data, &gt, &BoundingBox::new(10.0, 0.0, 30.0, 20.0)).unwrap();
        assert_eq!(clipped, array![[5.0, 6.0], [9.0, 10.0]]);
        assert_eq!((ct.top_left_x, ct.top_left_y), (10.0, 20.0));
        assert_eq!(ct.pixel_width, 10.0);
    }

    #[test]
    fn test_subset_partial_cells_widen() {
        let (data, gt) = raster();
        let (clipped, ct) =
            subset_to_extent(&data, &gt, &BoundingBox::new(15.0, 25.0, 18.0, 100.0)).unwrap();
        assert_eq!(clipped, array![[1.0]]);
        assert_eq!((ct.top_left_x, ct.top_left_y), (10.0, 30.0));
    }

    #[test]
    fn test_subset_larger_extent_is_identity() {
        let (data, gt) = raster();
        let (clipped, ct) =
            subset_to_extent(&data, &gt, &BoundingBox::new(-100.0, -100.0, 100.0, 100.0))
                .unwrap();
        assert_eq!(clipped, data);
        assert_eq!(ct, gt);
    }

    #[test]
    fn test_subset_disjoint() {
        let (data, gt) = raster();
        let err = subset_to_extent(&data, &gt, &BoundingBox::new(50.0, 0.0, 60.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, GridProcessorError::OutOfBounds { .. }));
    }

    #[test]
    fn test_subset_to_grid() {
        let (data, gt) = raster();
        let grid = GridDescriptor::new(20.0, 0.0, 2, 1, 10.0, AnchorCorner::LowerLeft).unwrap();
        let (clipped, _) = subset_to_grid(&data, &gt, &grid).unwrap();
        assert_eq!(clipped, array![[10.0, 11.0]]);
    }
}
