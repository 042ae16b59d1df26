//! Clustering traits.

use crate::error::Result;

/// Trait for hard clustering algorithms.
pub trait Clustering {
    /// Fit the model to raw rows and return cluster assignments.
    ///
    /// Returns a vector of cluster labels, one per input row.
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}
