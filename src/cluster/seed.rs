//! K-means++ seeding.
//!
//! 1. Choose the first centroid uniformly at random.
//! 2. Choose each next centroid with probability proportional to D(x)², the
//!    squared distance from x to its nearest already-chosen centroid.
//!
//! D(x)² is kept in one vector and lowered in place after every pick, so a
//! round costs O(n·d) instead of O(n·i·d).

use crate::error::{Error, Result};
use crate::geometry::squared_distance;
use crate::point::{Centroid, PointSet};
use rand::Rng;

/// Pick `k` initial centroids from `points`.
///
/// Centroid ids are `0..k` in pick order. Fails if `k` exceeds the number
/// of points or is zero.
pub fn kmeans_plus_plus<R: Rng>(
    points: &PointSet,
    k: usize,
    rng: &mut R,
) -> Result<Vec<Centroid>> {
    let n = points.len();
    if k == 0 {
        return Err(Error::InvalidParameter {
            name: "k",
            message: "must be at least 1",
        });
    }
    if k > n {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: n,
        });
    }

    let mut centroids = Vec::with_capacity(k);
    let first = rng.random_range(0..n);
    centroids.push(Centroid::new(0, points.row(first).to_owned()));

    let mut min_dist_sq: Vec<f64> = (0..n)
        .map(|i| squared_distance(&points.row(i), &centroids[0].coordinates.view()))
        .collect();

    for id in 1..k {
        let total: f64 = min_dist_sq.iter().sum();

        let selected = if total > 0.0 && total.is_finite() {
            let threshold = rng.random_range(0.0..total);
            pick_by_weight(&min_dist_sq, threshold)
        } else {
            // Every point already coincides with a centroid.
            rng.random_range(0..n)
        };

        let chosen = points.row(selected).to_owned();
        for (i, d) in min_dist_sq.iter_mut().enumerate() {
            let candidate = squared_distance(&points.row(i), &chosen.view());
            if candidate < *d {
                *d = candidate;
            }
        }
        centroids.push(Centroid::new(id, chosen));
    }

    Ok(centroids)
}

/// Walk the weights until the running total exceeds `threshold`.
///
/// Rounding can leave the total short of the threshold; the last index is
/// returned in that case.
fn pick_by_weight(weights: &[f64], threshold: f64) -> usize {
    let mut cumsum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumsum += w;
        if cumsum > threshold {
            return i;
        }
    }
    weights.len() - 1
}
