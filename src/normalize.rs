//! Per-dimension min-max scaling.
//!
//! ```text
//! x' = (x - min) / (max - min)
//! ```
//!
//! A dimension whose values are all equal has no range; every value in it
//! maps to `0.5`.

use crate::point::PointSet;
use crate::result::ClusteringResult;
use ndarray::Axis;

/// Observed range of one dimension before scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest value seen.
    pub min: f64,
    /// Largest value seen.
    pub max: f64,
}

impl Bounds {
    /// `max - min`.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Scale every dimension of `points` into `[0, 1]`.
///
/// Returns the original bounds per dimension (empty for an empty set).
pub fn normalize(points: &mut PointSet) -> Vec<Bounds> {
    if points.is_empty() {
        return Vec::new();
    }

    let coords = points.coords_mut();
    let mut bounds = Vec::with_capacity(coords.ncols());
    for mut column in coords.axis_iter_mut(Axis(1)) {
        let b = column.iter().fold(
            Bounds {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |b, &v| Bounds {
                min: b.min.min(v),
                max: b.max.max(v),
            },
        );
        let range = b.range();
        if range > 0.0 {
            column.mapv_inplace(|v| (v - b.min) / range);
        } else {
            column.fill(0.5);
        }
        bounds.push(b);
    }
    bounds
}

/// Map normalized coordinates back to the original scale.
///
/// `bounds` must come from [`normalize`] on the same dimensions. A constant
/// dimension maps back to its single value.
pub fn denormalize(values: &mut [f64], bounds: &[Bounds]) {
    for (v, b) in values.iter_mut().zip(bounds) {
        *v = restore(*v, b);
    }
}

/// Map the points and centroids of a result back to the original scale.
///
/// Labels, timing and `total_cost` are left alone, so the cost still
/// describes the normalized space the clustering ran in.
pub fn denormalize_result(result: &mut ClusteringResult, bounds: &[Bounds]) {
    for mut row in result.points.coords_mut().rows_mut() {
        for (v, b) in row.iter_mut().zip(bounds) {
            *v = restore(*v, b);
        }
    }
    for centroid in &mut result.centroids {
        for (v, b) in centroid.coordinates.iter_mut().zip(bounds) {
            *v = restore(*v, b);
        }
    }
}

fn restore(v: f64, b: &Bounds) -> f64 {
    let range = b.range();
    if range > 0.0 {
        b.min + v * range
    } else {
        b.min
    }
}
