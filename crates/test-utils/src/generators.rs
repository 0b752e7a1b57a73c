//! Test data generators for creating synthetic grids and profiles.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite. Arrays are row-major with
//! row 0 at the top of the grid.

use ndarray::Array2;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that `grid[[row, col]] == col * 1000 + row`.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.dim(), (5, 10));
/// assert_eq!(grid[[0, 0]], 0.0);    // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[[0, 1]], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[[1, 0]], 1.0);    // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Array2<f64> {
    Array2::from_shape_fn((height, width), |(row, col)| (col * 1000 + row) as f64)
}

/// Creates a planar grid `a * col + b * row + c`.
///
/// Bilinear interpolation reproduces a plane exactly, which makes this the
/// reference surface for sampling tests.
pub fn create_plane_grid(width: usize, height: usize, a: f64, b: f64, c: f64) -> Array2<f64> {
    Array2::from_shape_fn((height, width), |(row, col)| {
        a * col as f64 + b * row as f64 + c
    })
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Array2<f64> {
    Array2::from_elem((height, width), value)
}

/// Creates a grid with NaN values at specified positions.
///
/// Useful for testing missing data handling.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `nan_positions` - List of (col, row) positions that should be NaN
///
/// # Returns
///
/// An array with NaN at specified positions, zeros elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Array2<f64> {
    let mut data = Array2::zeros((height, width));
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[[row, col]] = f64::NAN;
        }
    }
    data
}

/// A straight-line profile sampled at regular spacing.
#[derive(Debug, Clone)]
pub struct SyntheticTransect {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// Creates an east-west profile of `len` points, `spacing` apart, whose
/// values are a single sinusoid of the given wavelength and amplitude.
pub fn create_sine_transect(
    len: usize,
    spacing: f64,
    wavelength: f64,
    amplitude: f64,
) -> SyntheticTransect {
    let x: Vec<f64> = (0..len).map(|i| i as f64 * spacing).collect();
    let y = vec![0.0; len];
    let z = x
        .iter()
        .map(|&d| amplitude * (2.0 * std::f64::consts::PI * d / wavelength).sin())
        .collect();
    SyntheticTransect { x, y, z }
}

/// Creates `n` deterministic pseudo-random points inside `[0, extent)` in
/// both axes, with elevation values in `[0, 100)`.
pub fn create_scattered_points(n: usize, extent: f64, seed: u32) -> Vec<(f64, f64, f64)> {
    (0..n as u32)
        .map(|i| {
            let hx = simple_hash(i, 0, seed);
            let hy = simple_hash(i, 1, seed);
            let hz = simple_hash(i, 2, seed);
            (
                unit(hx) * extent,
                unit(hy) * extent,
                unit(hz) * 100.0,
            )
        })
        .collect()
}

/// Creates an `n x n` lattice of `(x, y, density)` samples, `spacing`
/// apart from the origin, whose density is a unit Gaussian bump of width
/// `sigma` centred on the lattice.
///
/// The log density is `-r^2 / (2 sigma^2)`, so the contour at level `L`
/// is a circle of radius `sigma * sqrt(-2 L)` around the centre.
pub fn create_gaussian_density(n: usize, spacing: f64, sigma: f64) -> Vec<(f64, f64, f64)> {
    let centre = (n.saturating_sub(1)) as f64 * spacing / 2.0;
    (0..n)
        .flat_map(|row| (0..n).map(move |col| (col as f64 * spacing, row as f64 * spacing)))
        .map(|(x, y)| {
            let r2 = (x - centre).powi(2) + (y - centre).powi(2);
            (x, y, (-r2 / (2.0 * sigma * sigma)).exp())
        })
        .collect()
}

fn unit(h: u32) -> f64 {
    h as f64 / (u32::MAX as f64 + 1.0)
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[[0, 0]], 0.0); // col=0, row=0
        assert_eq!(grid[[0, 1]], 1000.0); // col=1, row=0
        assert_eq!(grid[[1, 0]], 1.0); // col=0, row=1
        assert_eq!(grid[[1, 1]], 1001.0); // col=1, row=1
    }

    #[test]
    fn test_create_plane_grid() {
        let grid = create_plane_grid(4, 3, 2.0, -1.0, 10.0);
        assert_eq!(grid[[0, 0]], 10.0);
        assert_eq!(grid[[2, 3]], 10.0 + 6.0 - 2.0);
    }

    #[test]
    fn test_create_constant_grid() {
        let grid = create_constant_grid(10, 10, 42.0);
        assert_eq!(grid.len(), 100);
        assert!(grid.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, &[(5, 5), (0, 0), (20, 20)]);
        assert!(grid[[0, 0]].is_nan());
        assert!(grid[[5, 5]].is_nan());
        assert!(!grid[[0, 1]].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 2);
    }

    #[test]
    fn test_create_sine_transect() {
        let t = create_sine_transect(8, 10.0, 40.0, 2.0);
        assert_eq!(t.x.len(), 8);
        assert_eq!(t.x[7], 70.0);
        assert!(t.z[0].abs() < 1e-12);
        assert!((t.z[1] - 2.0).abs() < 1e-12);
        assert!(t.y.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_create_gaussian_density() {
        let samples = create_gaussian_density(5, 10.0, 20.0);
        assert_eq!(samples.len(), 25);
        assert_eq!(samples[12], (20.0, 20.0, 1.0));
        assert_eq!(samples[24].0, 40.0);
        assert!(samples.iter().all(|&(_, _, d)| d > 0.0 && d <= 1.0));
    }

    #[test]
    fn test_scattered_points_deterministic() {
        let a = create_scattered_points(50, 100.0, 42);
        let b = create_scattered_points(50, 100.0, 42);
        assert_eq!(a, b, "Same seed should produce same data");

        let c = create_scattered_points(50, 100.0, 43);
        assert_ne!(a, c, "Different seed should produce different data");

        assert!(a
            .iter()
            .all(|&(x, y, z)| (0.0..100.0).contains(&x)
                && (0.0..100.0).contains(&y)
                && (0.0..100.0).contains(&z)));
    }
}
