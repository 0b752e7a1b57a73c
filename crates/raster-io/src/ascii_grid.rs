//! ESRI ArcInfo ASCII grid format.
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    100.0
//! yllcorner    200.0
//! cellsize     10.0
//! NODATA_value -9999
//! 1 2 3 4
//! 5 -9999 7 8
//! 9 10 11 12
//! ```
//!
//! The body lists `nrows` rows of `ncols` values, top row first. The origin
//! may be given as the lower-left outer corner (`xllcorner`/`yllcorner`) or
//! as the centre of the lower-left cell (`xllcenter`/`yllcenter`).

use std::fmt;
use std::fs;
use std::path::Path;

use grid_common::{AnchorCorner, GeoTransform, GridDescriptor};
use ndarray::Array2;
use tracing::{debug, info};

use crate::{RasterIoError, RasterIoResult};

const HEADER_KEYS: [&str; 9] = [
    "ncols",
    "nrows",
    "xllcorner",
    "xllcenter",
    "yllcorner",
    "yllcenter",
    "cellsize",
    "nodata_value",
    "nodata",
];

/// A regular raster read from or destined for an ASCII grid file.
///
/// `data` has shape `(nrows, ncols)` with row 0 at the top. Cells equal to
/// the nodata value are held as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub descriptor: GridDescriptor,
    pub nodata: Option<f64>,
    pub data: Array2<f64>,
}

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    x: Option<(f64, bool)>,
    y: Option<(f64, bool)>,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

impl AsciiGrid {
    /// Wrap an array with its grid geometry. The array shape must be
    /// `(ny, nx)` of the descriptor.
    pub fn new(
        descriptor: GridDescriptor,
        data: Array2<f64>,
        nodata: Option<f64>,
    ) -> RasterIoResult<Self> {
        if data.dim() != descriptor.shape() {
            return Err(RasterIoError::ShapeMismatch {
                expected: descriptor.shape(),
                actual: data.dim(),
            });
        }

        Ok(Self {
            descriptor: descriptor.with_corner(AnchorCorner::LowerLeft),
            nodata,
            data,
        })
    }

    pub fn parse(text: &str) -> RasterIoResult<Self> {
        let mut header = Header::default();
        let mut values = Vec::new();
        let mut in_body = false;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let mut tokens = line.split_whitespace().peekable();
            let Some(first) = tokens.peek().copied() else {
                continue;
            };

            let key = first.to_ascii_lowercase();
            if !in_body && HEADER_KEYS.contains(&key.as_str()) {
                tokens.next();
                let value = tokens.next().ok_or_else(|| RasterIoError::InvalidHeader {
                    line: line_no,
                    message: format!("no value for '{}'", first),
                })?;
                if tokens.next().is_some() {
                    return Err(RasterIoError::InvalidHeader {
                        line: line_no,
                        message: format!("trailing tokens after '{}'", first),
                    });
                }
                header.set(&key, value, line_no)?;
                continue;
            }

            in_body = true;
            for token in tokens {
                values.push(parse_f64(token, line_no)?);
            }
        }

        let ncols = header.ncols.ok_or(RasterIoError::MissingHeader("ncols"))?;
        let nrows = header.nrows.ok_or(RasterIoError::MissingHeader("nrows"))?;
        let (x, x_centre) = header.x.ok_or(RasterIoError::MissingHeader("xllcorner"))?;
        let (y, y_centre) = header.y.ok_or(RasterIoError::MissingHeader("yllcorner"))?;
        let cellsize = header
            .cellsize
            .ok_or(RasterIoError::MissingHeader("cellsize"))?;

        let expected = ncols.checked_mul(nrows).ok_or_else(|| {
            RasterIoError::InvalidFormat(format!("grid size {} x {} is too large", ncols, nrows))
        })?;
        if values.len() != expected {
            return Err(RasterIoError::ValueCount {
                expected,
                found: values.len(),
            });
        }

        let half = cellsize / 2.0;
        let x = if x_centre { x - half } else { x };
        let y = if y_centre { y - half } else { y };
        let descriptor =
            GridDescriptor::new(x, y, ncols, nrows, cellsize, AnchorCorner::LowerLeft)?;

        if let Some(nodata) = header.nodata {
            for v in values.iter_mut() {
                if *v == nodata {
                    *v = f64::NAN;
                }
            }
        }

        let data = Array2::from_shape_vec((nrows, ncols), values)
            .map_err(|e| RasterIoError::InvalidFormat(e.to_string()))?;

        debug!(ncols, nrows, x, y, cellsize, "Parsed ASCII grid");

        Ok(Self {
            descriptor,
            nodata: header.nodata,
            data,
        })
    }

    pub fn read(path: impl AsRef<Path>) -> RasterIoResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let grid = Self::parse(&text)?;
        info!(
            path = %path.display(),
            ncols = grid.descriptor.nx(),
            nrows = grid.descriptor.ny(),
            "Read ASCII grid"
        );
        Ok(grid)
    }

    /// Write the grid, creating the parent directory if needed.
    pub fn write(&self, path: impl AsRef<Path>) -> RasterIoResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_string())?;
        info!(
            path = %path.display(),
            ncols = self.descriptor.nx(),
            nrows = self.descriptor.ny(),
            "Wrote ASCII grid"
        );
        Ok(())
    }

    pub fn geotransform(&self) -> GeoTransform {
        GeoTransform::from(&self.descriptor)
    }

    /// Number of cells holding data.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }
}

impl fmt::Display for AsciiGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.descriptor.lower_left();
        writeln!(f, "{:<13}{}", "ncols", self.descriptor.nx())?;
        writeln!(f, "{:<13}{}", "nrows", self.descriptor.ny())?;
        writeln!(f, "{:<13}{}", "xllcorner", x)?;
        writeln!(f, "{:<13}{}", "yllcorner", y)?;
        writeln!(f, "{:<13}{}", "cellsize", self.descriptor.pixel_width())?;
        if let Some(nodata) = self.nodata {
            writeln!(f, "{:<13}{}", "NODATA_value", nodata)?;
        }

        for row in self.data.rows() {
            let mut first = true;
            for &v in row.iter() {
                if !first {
                    f.write_str(" ")?;
                }
                first = false;
                match (v.is_nan(), self.nodata) {
                    (true, Some(nodata)) => write!(f, "{}", nodata)?,
                    _ => write!(f, "{}", v)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Header {
    fn set(&mut self, key: &str, value: &str, line: usize) -> RasterIoResult<()> {
        match key {
            "ncols" => self.ncols = Some(parse_usize(value, line)?),
            "nrows" => self.nrows = Some(parse_usize(value, line)?),
            "xllcorner" => self.x = Some((parse_f64(value, line)?, false)),
            "xllcenter" => self.x = Some((parse_f64(value, line)?, true)),
            "yllcorner" => self.y = Some((parse_f64(value, line)?, false)),
            "yllcenter" => self.y = Some((parse_f64(value, line)?, true)),
            "cellsize" => self.cellsize = Some(parse_f64(value, line)?),
            _ => self.nodata = Some(parse_f64(value, line)?),
        }
        Ok(())
    }
}

fn parse_f64(token: &str, line: usize) -> RasterIoResult<f64> {
    token.parse().map_err(|_| RasterIoError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

fn parse_usize(token: &str, line: usize) -> RasterIoResult<usize> {
    token.parse().map_err(|_| RasterIoError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}
