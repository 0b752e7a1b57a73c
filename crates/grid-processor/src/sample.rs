//! Point sampling of north-up rasters.

use grid_common::GeoTransform;
use ndarray::Array2;
use tracing::debug;

/// Value of the cell containing each point.
///
/// Cell indices are `floor((x - tl_x) / post)` and `floor((tl_y - y) / post)`
/// with the origin at the top left. Points outside the raster give `None`;
/// nodata cells give `Some(NaN)`.
pub fn extract_values(
    data: &Array2<f64>,
    transform: &GeoTransform,
    points: &[(f64, f64)],
) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = points
        .iter()
        .map(|&(x, y)| {
            transform
                .coord_to_pixel(x, y)
                .and_then(|(col, row)| data.get((row, col)).copied())
        })
        .collect();

    let outside = values.iter().filter(|v| v.is_none()).count();
    debug!(
        points = points.len(),
        outside, "Extracted raster values at points"
    );
    values
}

/// Bilinear interpolation between the four nearest cell centres.
///
/// Points between the outermost cell centres and the raster edge take the
/// edge values. Returns `None` outside the raster or when any contributing
/// cell is NaN.
pub fn sample_bilinear(data: &Array2<f64>, transform: &GeoTransform, x: f64, y: f64) -> Option<f64> {
    let (rows, cols) = data.dim();
    if rows == 0 || cols == 0 {
        return None;
    }

    let (fx, fy) = transform.coord_to_fractional_pixel(x, y);
    if !(fx >= 0.0 && fy >= 0.0 && fx <= cols as f64 && fy <= rows as f64) {
        return None;
    }

    // shift from corner to centre registration
    let px = (fx - 0.5).clamp(0.0, (cols - 1) as f64);
    let py = (fy - 0.5).clamp(0.0, (rows - 1) as f64);

    let x0 = px.floor() as usize;
    let y0 = py.floor() as usize;
    let x1 = (x0 + 1).min(cols - 1);
    let y1 = (y0 + 1).min(rows - 1);

    let xf = px - x0 as f64;
    let yf = py - y0 as f64;

    let v00 = data[[y0, x0]];
    let v10 = data[[y0, x1]];
    let v01 = data[[y1, x0]];
    let v11 = data[[y1, x1]];

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return None;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    Some(top * (1.0 - yf) + bottom * yf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn transform() -> GeoTransform {
        // 3 x 2 raster of 10 unit cells, top left at (0, 20)
        GeoTransform::north_up(0.0, 20.0, 10.0)
    }

    #[test]
    fn test_extract_values() {
        let data = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let values = extract_values(
            &data,
            &transform(),
            &[(0.0, 20.0), (25.0, 5.0), (29.9, 10.1), (30.0, 5.0), (5.0, -0.1), (-1.0, 5.0)],
        );
        assert_eq!(
            values,
            vec![Some(1.0), Some(6.0), Some(3.0), None, None, None]
        );
    }

    #[test]
    fn test_bilinear_at_centres() {
        let data = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let gt = transform();
        assert_eq!(sample_bilinear(&data, &gt, 5.0, 15.0), Some(1.0));
        assert_eq!(sample_bilinear(&data, &gt, 25.0, 5.0), Some(6.0));
        assert_eq!(sample_bilinear(&data, &gt, 10.0, 10.0), Some(3.0));
    }

    #[test]
    fn test_bilinear_edges_and_outside() {
        let data = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let gt = transform();
        // left of the first centre, on the top edge
        assert_eq!(sample_bilinear(&data, &gt, 0.0, 20.0), Some(1.0));
        assert_eq!(sample_bilinear(&data, &gt, 30.5, 10.0), None);
        assert_eq!(sample_bilinear(&data, &gt, 5.0, 21.0), None);
    }

    #[test]
    fn test_bilinear_nan_neighbour() {
        let data = array![[1.0, f64::NAN], [3.0, 4.0]];
        let gt = GeoTransform::north_up(0.0, 2.0, 1.0);
        assert_eq!(sample_bilinear(&data, &gt, 1.0, 1.0), None);
        assert_eq!(sample_bilinear(&data, &gt, 0.5, 0.5), Some(3.0));
    }
}
