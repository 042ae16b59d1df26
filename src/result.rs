use crate::point::{Centroid, PointSet};
use serde::Serialize;
use std::time::Duration;

/// Snapshot of a finished clustering run.
///
/// Owns its points and centroids; cloning yields an independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringResult {
    /// Points with their final labels.
    pub points: PointSet,
    /// Final centroids, ids `0..k`.
    pub centroids: Vec<Centroid>,
    /// Wall-clock time spent computing.
    pub elapsed: Duration,
    /// Cost under the model it was priced with (0 until priced).
    pub total_cost: f64,
    /// Assign/update rounds performed.
    pub iterations: usize,
    /// False if the iteration budget ran out first.
    pub converged: bool,
}

impl ClusteringResult {
    /// Result for input that needed no clustering: points untouched, no
    /// centroids, zero cost.
    pub fn unclustered(points: PointSet) -> Self {
        Self {
            points,
            centroids: Vec::new(),
            elapsed: Duration::ZERO,
            total_cost: 0.0,
            iterations: 0,
            converged: true,
        }
    }

    /// Number of centroids.
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Elapsed time in whole milliseconds.
    pub fn time_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Final labels in point order.
    pub fn labels(&self) -> &[usize] {
        self.points.labels()
    }

    /// Number of points per centroid id.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k()];
        for &label in self.labels() {
            if let Some(s) = sizes.get_mut(label) {
                *s += 1;
            }
        }
        sizes
    }

    /// Compact, serializable description of the result.
    pub fn summary(&self) -> Summary {
        Summary {
            k: self.k(),
            n_points: self.points.len(),
            dimension: self.points.dimension(),
            total_cost: self.total_cost,
            time_ms: self.time_ms(),
            cluster_sizes: self.cluster_sizes(),
            centroids: self.centroids.iter().map(|c| c.coordinates.to_vec()).collect(),
        }
    }
}

/// Serializable digest of a [`ClusteringResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of clusters.
    pub k: usize,
    /// Number of points clustered.
    pub n_points: usize,
    /// Point dimension.
    pub dimension: usize,
    /// Total cost.
    pub total_cost: f64,
    /// Elapsed milliseconds.
    pub time_ms: u64,
    /// Points per cluster, by id.
    pub cluster_sizes: Vec<usize>,
    /// Centroid coordinates, by id.
    pub centroids: Vec<Vec<f64>>,
}
