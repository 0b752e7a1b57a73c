//! Scattered `x,y,z` point files.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use grid_common::CoordinateMesh;
use ndarray::{Array2, Zip};
use tracing::{debug, info};

use crate::{RasterIoError, RasterIoResult};

/// A single sounding or mesh node.
///
/// Files without a third column are read with `z = NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XyzPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl XyzPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal distance to another point.
    pub fn distance_xy(&self, other: &XyzPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn bits(&self) -> (u64, u64, u64) {
        (self.x.to_bits(), self.y.to_bits(), self.z.to_bits())
    }
}

/// Flatten a coordinate mesh and a value array of the same shape into
/// points, row-major. Cells whose value is NaN are skipped.
pub fn xyz_triples(mesh: &CoordinateMesh, z: &Array2<f64>) -> RasterIoResult<Vec<XyzPoint>> {
    let expected = mesh.x.dim();
    for actual in [mesh.y.dim(), z.dim()] {
        if actual != expected {
            return Err(RasterIoError::ShapeMismatch { expected, actual });
        }
    }

    let mut points = Vec::with_capacity(z.len());
    Zip::from(&mesh.x)
        .and(&mesh.y)
        .and(z)
        .for_each(|&x, &y, &z| {
            if !z.is_nan() {
                points.push(XyzPoint { x, y, z });
            }
        });

    let dropped = z.len() - points.len();
    if dropped > 0 {
        debug!(dropped, kept = points.len(), "Skipped NaN cells");
    }

    Ok(points)
}

/// Write points as CSV with an `x,y,z` header, creating the parent
/// directory if needed.
pub fn write_xyz(path: impl AsRef<Path>, points: &[XyzPoint]) -> RasterIoResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "x,y,z")?;
    for p in points {
        writeln!(out, "{:.6},{:.6},{:.2}", p.x, p.y, p.z)?;
    }
    out.flush()?;

    info!(path = %path.display(), count = points.len(), "Wrote XYZ points");
    Ok(())
}

/// Read a point file. See [`parse_points`] for the accepted layout.
pub fn read_points(path: impl AsRef<Path>) -> RasterIoResult<Vec<XyzPoint>> {
    let path = path.as_ref();
    let points = parse_points(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), count = points.len(), "Read XYZ points");
    Ok(points)
}

/// Parse comma or whitespace separated points.
///
/// An optional header line is recognised when its first field is not a
/// number. Blank lines and lines starting with `#` are ignored. Columns
/// past the third are ignored.
pub fn parse_points(text: &str) -> RasterIoResult<Vec<XyzPoint>> {
    let mut points = Vec::new();
    let mut seen_data = false;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = if trimmed.contains(',') {
            trimmed.split(',').map(str::trim).collect()
        } else {
            trimmed.split_whitespace().collect()
        };

        if !seen_data && fields[0].parse::<f64>().is_err() {
            // header
            seen_data = true;
            continue;
        }
        seen_data = true;

        if fields.len() < 2 {
            return Err(RasterIoError::InvalidFormat(format!(
                "line {}: expected at least 2 columns, found {}",
                line_no,
                fields.len()
            )));
        }

        let x = parse_field(fields[0], line_no)?;
        let y = parse_field(fields[1], line_no)?;
        let z = match fields.get(2) {
            Some(f) => parse_field(f, line_no)?,
            None => f64::NAN,
        };
        points.push(XyzPoint { x, y, z });
    }

    Ok(points)
}

/// Keep every `n`th row, starting with the first.
pub fn subsample_rows<T: Clone>(rows: &[T], n: usize) -> RasterIoResult<Vec<T>> {
    if n == 0 {
        return Err(RasterIoError::InvalidArgument(
            "subsample step must be at least 1".to_string(),
        ));
    }
    Ok(rows.iter().step_by(n).cloned().collect())
}

/// Drop repeated points, keeping the first instance of each. Returns the
/// unique points in their original order and the number removed.
pub fn strip_duplicates(points: &[XyzPoint]) -> (Vec<XyzPoint>, usize) {
    let mut seen = HashSet::with_capacity(points.len());
    let unique: Vec<XyzPoint> = points
        .iter()
        .filter(|p| seen.insert(p.bits()))
        .copied()
        .collect();
    let removed = points.len() - unique.len();
    if removed > 0 {
        debug!(removed, "Stripped duplicate points");
    }
    (unique, removed)
}

fn parse_field(token: &str, line: usize) -> RasterIoResult<f64> {
    token.parse().map_err(|_| RasterIoError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_xyz_triples_row_major_without_nan() {
        let mesh = CoordinateMesh {
            x: array![[0.0, 1.0], [0.0, 1.0]],
            y: array![[1.0, 1.0], [0.0, 0.0]],
        };
        let z = array![[5.0, f64::NAN], [7.0, 8.0]];
        let points = xyz_triples(&mesh, &z).unwrap();
        assert_eq!(
            points,
            vec![
                XyzPoint::new(0.0, 1.0, 5.0),
                XyzPoint::new(0.0, 0.0, 7.0),
                XyzPoint::new(1.0, 0.0, 8.0),
            ]
        );
    }

    #[test]
    fn test_xyz_triples_shape_mismatch() {
        let mesh = CoordinateMesh {
            x: Array2::zeros((2, 2)),
            y: Array2::zeros((2, 2)),
        };
        let z = Array2::zeros((3, 2));
        assert!(matches!(
            xyz_triples(&mesh, &z),
            Err(RasterIoError::ShapeMismatch {
                expected: (2, 2),
                actual: (3, 2)
            })
        ));
    }

    #[test]
    fn test_parse_points_without_z() {
        let points = parse_points("x,y\n1,2\n3,4\n").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!((points[1].x, points[1].y), (3.0, 4.0));
        assert!(points[0].z.is_nan());
    }

    #[test]
    fn test_parse_points_rejects_single_column() {
        assert!(matches!(
            parse_points("1\n"),
            Err(RasterIoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_header_only_on_first_line() {
        let err = parse_points("1,2,3\nx,y,z\n").unwrap_err();
        assert!(matches!(err, RasterIoError::InvalidNumber { line: 2, .. }));
    }

    #[test]
    fn test_subsample_rows() {
        let rows: Vec<u32> = (0..10).collect();
        assert_eq!(subsample_rows(&rows, 3).unwrap(), vec![0, 3, 6, 9]);
        assert_eq!(subsample_rows(&rows, 1).unwrap(), rows);
        assert!(subsample_rows(&rows, 0).is_err());
    }

    #[test]
    fn test_strip_duplicates_keeps_first() {
        let a = XyzPoint::new(0.0, 0.0, 1.0);
        let b = XyzPoint::new(1.0, 0.0, 1.0);
        let (unique, removed) = strip_duplicates(&[a, b, a, a, b]);
        assert_eq!(unique, vec![a, b]);
        assert_eq!(removed, 3);
    }
}
