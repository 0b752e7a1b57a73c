//! Distances along a profile of points.

use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// Step and running distances along a sequence of points.
#[derive(Debug, Clone, PartialEq)]
pub struct TransectDistances {
    /// Distance from the previous point. The first entry is NaN.
    pub spacing: Vec<f64>,
    /// Distance from the first point.
    pub cumulative: Vec<f64>,
}

impl TransectDistances {
    pub fn len(&self) -> usize {
        self.spacing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spacing.is_empty()
    }

    /// Mean step between consecutive points, `None` for fewer than two.
    pub fn mean_spacing(&self) -> Option<f64> {
        if self.spacing.len() < 2 {
            return None;
        }
        let steps = &self.spacing[1..];
        Some(steps.iter().sum::<f64>() / steps.len() as f64)
    }

    /// Total length of the profile.
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }
}

/// Euclidean step and cumulative distances for `(x, y)` points in order.
pub fn xy_distances(points: &[(f64, f64)]) -> TransectDistances {
    let mut spacing = Vec::with_capacity(points.len());
    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;

    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            spacing.push(f64::NAN);
            cumulative.push(0.0);
            continue;
        }
        let (px, py) = points[i - 1];
        let step = (x - px).hypot(y - py);
        total += step;
        spacing.push(step);
        cumulative.push(total);
    }

    debug!(points = points.len(), length = total, "Computed transect distances");
    TransectDistances {
        spacing,
        cumulative,
    }
}

/// Fail unless the two sequences have the same length.
pub fn check_length_equality<A, B>(a: &[A], b: &[B]) -> Result<()> {
    if a.len() != b.len() {
        return Err(GridProcessorError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}
