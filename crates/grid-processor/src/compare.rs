//! Nearest-neighbour comparison of two point sets.
//!
//! Each observed point is paired with the closest reference point within a
//! search radius and the elevation difference `observed - reference` is
//! recorded. Observations with no reference point in range are dropped.

use std::collections::HashMap;

use raster_io::XyzPoint;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{GridProcessorError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointDifference {
    pub observed: XyzPoint,
    pub reference: XyzPoint,
    /// Horizontal distance between the pair.
    pub distance: f64,
    /// `observed.z - reference.z`
    pub difference: f64,
}

/// Summary statistics of a set of differences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifferenceSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl DifferenceSummary {
    /// Summary of `differences`; NaN statistics when empty.
    pub fn from_differences(differences: &[PointDifference]) -> Self {
        let count = differences.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }

        let n = count as f64;
        let mean = differences.iter().map(|d| d.difference).sum::<f64>() / n;
        let var = differences
            .iter()
            .map(|d| (d.difference - mean).powi(2))
            .sum::<f64>()
            / n;
        let (min, max) = differences
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d.difference), hi.max(d.difference))
            });

        Self {
            count,
            mean,
            std: var.sqrt(),
            min,
            max,
        }
    }
}

/// Uniform bucket grid over reference points with cell size equal to the
/// search radius, so any neighbour in range lies in the 3x3 cells around a
/// query point.
pub(crate) struct NeighbourIndex<'a> {
    points: &'a [XyzPoint],
    cell: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl<'a> NeighbourIndex<'a> {
    pub(crate) fn new(points: &'a [XyzPoint], cell: f64) -> Self {
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            if p.x.is_finite() && p.y.is_finite() && !p.z.is_nan() {
                buckets.entry(Self::key(p.x, p.y, cell)).or_default().push(i);
            }
        }
        Self {
            points,
            cell,
            buckets,
        }
    }

    fn key(x: f64, y: f64, cell: f64) -> (i64, i64) {
        ((x / cell).floor() as i64, (y / cell).floor() as i64)
    }

    /// Closest point within `radius`; ties go to the lower index.
    pub(crate) fn nearest(&self, x: f64, y: f64, radius: f64) -> Option<(usize, f64)> {
        let (kx, ky) = Self::key(x, y, self.cell);
        let mut best: Option<(usize, f64)> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.buckets.get(&(kx + dx, ky + dy)) else {
                    continue;
                };
                for &i in bucket {
                    let p = &self.points[i];
                    let d = (p.x - x).hypot(p.y - y);
                    if d > radius {
                        continue;
                    }
                    best = match best {
                        Some((bi, bd)) if bd < d || (bd == d && bi < i) => Some((bi, bd)),
                        _ => Some((i, d)),
                    };
                }
            }
        }
        best
    }
}

/// Pair each observed point with its nearest reference point within
/// `search_dist` and compute `observed.z - reference.z`.
///
/// Output preserves the order of `observed`.
pub fn point_differences(
    reference: &[XyzPoint],
    observed: &[XyzPoint],
    search_dist: f64,
) -> Result<Vec<PointDifference>> {
    if !(search_dist.is_finite() && search_dist > 0.0) {
        return Err(GridProcessorError::invalid_input(format!(
            "search distance must be positive, got {}",
            search_dist
        )));
    }

    let index = NeighbourIndex::new(reference, search_dist);

    let differences: Vec<PointDifference> = observed
        .par_iter()
        .filter(|o| o.x.is_finite() && o.y.is_finite() && !o.z.is_nan())
        .filter_map(|o| {
            index.nearest(o.x, o.y, search_dist).map(|(i, distance)| {
                let r = reference[i];
                PointDifference {
                    observed: *o,
                    reference: r,
                    distance,
                    difference: o.z - r.z,
                }
            })
        })
        .collect();

    let dropped = observed.len() - differences.len();
    info!(
        observed = observed.len(),
        matched = differences.len(),
        search_dist,
        "Compared point sets"
    );
    if dropped > 0 {
        warn!(dropped, search_dist, "Observations without a neighbour in range");
    }

    Ok(differences)
}
