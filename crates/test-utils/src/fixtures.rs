//! Common test fixtures for grid processing tests.

/// Grid definitions used across the test suite, as
/// (x, y, nx, ny, pixel_width) with the anchor noted on each constant.
pub mod grid {
    /// Regional 500 m grid, anchored at its lower-left corner.
    pub const REGIONAL_LOWER_LEFT: (f64, f64, usize, usize, f64) =
        (-800_000.0, -3_400_000.0, 301, 561, 500.0);

    /// Small 50 unit grid, anchored at its top-left corner.
    pub const SMALL_TOP_LEFT: (f64, f64, usize, usize, f64) = (-800.0, -300.0, 6, 10, 50.0);

    /// The lower-left anchored equivalent of [`SMALL_TOP_LEFT`].
    pub const SMALL_LOWER_LEFT: (f64, f64, usize, usize, f64) = (-800.0, -800.0, 6, 10, 50.0);
}

/// ESRI ASCII grid fixtures.
pub mod ascii {
    /// 4 x 3 grid with one nodata cell, corner-registered.
    pub const SMALL_CORNER: &str = "\
ncols        4
nrows        3
xllcorner    100.0
yllcorner    200.0
cellsize     10.0
NODATA_value -9999
1 2 3 4
5 -9999 7 8
9 10 11 12
";

    /// The same grid registered on cell centres.
    pub const SMALL_CENTRE: &str = "\
ncols 4
nrows 3
xllcenter 105.0
yllcenter 205.0
cellsize 10.0
NODATA_value -9999
1 2 3 4
5 -9999 7 8
9 10 11 12
";

    /// Header promises more rows than the body holds.
    pub const TRUNCATED: &str = "\
ncols 2
nrows 3
xllcorner 0
yllcorner 0
cellsize 1
1 2
3 4
";
}

/// XYZ point file fixtures.
pub mod xyz {
    pub const COMMA_WITH_HEADER: &str = "x,y,z\n0.0,0.0,1.5\n10.0,0.0,2.5\n20.0,0.0,3.5\n";

    pub const WHITESPACE: &str = "0 0 1.5\n10 0 2.5\n\n20\t0\t3.5\n";

    pub const WITH_DUPLICATES: &str = "x,y,z\n0,0,1\n0,0,1\n5,5,2\n0,0,1\n";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_grids_share_extent() {
        let (x, tl_y, _, ny, px) = grid::SMALL_TOP_LEFT;
        let (llx, lly, _, _, _) = grid::SMALL_LOWER_LEFT;
        assert_eq!(x, llx);
        assert_eq!(tl_y - px * ny as f64, lly);
    }

    #[test]
    fn test_ascii_fixtures_have_headers() {
        assert!(ascii::SMALL_CORNER.starts_with("ncols"));
        assert!(ascii::SMALL_CENTRE.contains("xllcenter"));
    }
}
