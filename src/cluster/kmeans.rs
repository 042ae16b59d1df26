//! K-means clustering for a fixed number of clusters.
//!
//! Partitions points into k clusters by minimizing **within-cluster sum of
//! squares** (WCSS):
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Seed k centroids with k-means++ ([`super::seed`])
//! 2. **Assign**: each point → nearest centroid ([`super::assign`])
//! 3. **Update**: each centroid → mean of its points ([`super::update`])
//! 4. Repeat until no label changes *and* no centroid moves more than the
//!    tolerance ([`super::convergence`]), or the iteration budget runs out
//!
//! Running out of iterations is not an error: the last labelling is returned
//! with `converged == false`.
//!
//! # Degenerate Input
//!
//! An empty point set, `k == 0`, or fewer points than `k` produce a result
//! with no centroids, zero cost, and the points untouched.

use super::assign::{assign, ExecutionMode};
use super::convergence::{has_converged, DEFAULT_TOL};
use super::seed::kmeans_plus_plus;
use super::traits::Clustering;
use super::update::{reseed_empty, update_centroids, EmptyClusterPolicy};
use crate::error::{Error, Result};
use crate::point::PointSet;
use crate::result::ClusteringResult;
use rand::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default iteration budget.
pub const DEFAULT_MAX_ITER: usize = 100;

/// K-means clustering engine.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations.
    max_iter: usize,
    /// Convergence tolerance (squared centroid shift).
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
    /// Assignment strategy.
    mode: ExecutionMode,
    /// Empty-cluster handling.
    empty_cluster: EmptyClusterPolicy,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            seed: None,
            mode: ExecutionMode::Sequential,
            empty_cluster: EmptyClusterPolicy::default(),
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the assignment strategy.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the empty-cluster policy.
    pub fn with_empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be finite and non-negative",
            });
        }
        if let ExecutionMode::Parallel { workers: 0 } = self.mode {
            return Err(Error::InvalidParameter {
                name: "workers",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Cluster `points` in place, seeding from the configured seed.
    ///
    /// Labels in `points` are overwritten; coordinates are never touched.
    /// The returned result holds its own copy of the labelled points and is
    /// not priced (`total_cost == 0`).
    pub fn run(&self, points: &mut PointSet) -> Result<ClusteringResult> {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        self.run_with_rng(points, &mut rng)
    }

    /// Cluster `points` in place, drawing seeding randomness from `rng`.
    pub fn run_with_rng<R: Rng>(
        &self,
        points: &mut PointSet,
        rng: &mut R,
    ) -> Result<ClusteringResult> {
        self.validate()?;

        let n = points.len();
        if n == 0 || self.k == 0 || n < self.k {
            debug!(n, k = self.k, "nothing to cluster");
            return Ok(ClusteringResult::unclustered(points.clone()));
        }

        let start = Instant::now();

        // Incoming labels are carried data, not a starting assignment.
        points.clear_labels();
        let mut centroids = kmeans_plus_plus(points, self.k, rng)?;

        let mut iterations = 0;
        let mut converged = false;
        for iter in 0..self.max_iter {
            iterations = iter + 1;

            let changed = assign(points, &centroids, self.mode);
            let (mut next, mut counts) = update_centroids(points, self.k);

            let reseeded = match self.empty_cluster {
                EmptyClusterPolicy::FarthestPoint => {
                    reseed_empty(points, &centroids, &mut next, &mut counts)
                }
                EmptyClusterPolicy::Zero => Vec::new(),
            };
            if !reseeded.is_empty() {
                warn!(iteration = iter, clusters = ?reseeded, "re-seeded empty clusters");
            }

            let stable = reseeded.is_empty() && has_converged(&centroids, &next, self.tol);
            debug!(iteration = iter, changed, stable, "k-means iteration");
            centroids = next;

            if !changed && stable {
                converged = true;
                break;
            }
        }

        let elapsed = start.elapsed();
        if !converged {
            warn!(
                k = self.k,
                max_iter = self.max_iter,
                "k-means did not converge, keeping last labelling"
            );
        }
        info!(
            k = self.k,
            n,
            iterations,
            converged,
            mode = %self.mode,
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            "k-means finished"
        );

        Ok(ClusteringResult {
            points: points.clone(),
            centroids,
            elapsed,
            total_cost: 0.0,
            iterations,
            converged,
        })
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        let mut points = PointSet::from_rows(data)?;
        let result = self.run(&mut points)?;
        Ok(result.labels().to_vec())
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point, UNASSIGNED};
    use ndarray::array;

    fn separated() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 10.0],
            vec![10.0, 11.0],
        ]
    }

    #[test]
    fn test_kmeans_separated_clusters() -> Result<()> {
        for seed in 0..20 {
            let mut points = PointSet::from_rows(&separated())?;
            let result = Kmeans::new(2).with_seed(seed).run(&mut points)?;

            assert!(result.converged, "seed {seed} did not converge");
            assert!(result.iterations <= DEFAULT_MAX_ITER);
            let labels = result.labels();
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);

            let low = &result.centroids[labels[0]].coordinates;
            let high = &result.centroids[labels[2]].coordinates;
            assert!((low - &array![0.0, 0.5]).iter().all(|d| d.abs() < 1e-9));
            assert!((high - &array![10.0, 10.5]).iter().all(|d| d.abs() < 1e-9));
        }
        Ok(())
    }

    #[test]
    fn test_kmeans_all_points_assigned() -> Result<()> {
        let data: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![i as f64 * 0.1, (i % 5) as f64])
            .collect();

        let labels = Kmeans::new(5).with_seed(123).fit_predict(&data)?;

        assert_eq!(labels.len(), data.len());
        for &label in &labels {
            assert!(label < 5, "label {} out of range", label);
        }
        Ok(())
    }

    #[test]
    fn test_kmeans_k_equals_n() -> Result<()> {
        let data = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];

        let labels = Kmeans::new(3).with_seed(42).fit_predict(&data)?;

        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), 3);
        Ok(())
    }

    #[test]
    fn test_kmeans_deterministic_with_seed() -> Result<()> {
        let data: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![(i * 7 % 13) as f64, (i * 5 % 11) as f64])
            .collect();

        let labels1 = Kmeans::new(4).with_seed(42).fit_predict(&data)?;
        let labels2 = Kmeans::new(4).with_seed(42).fit_predict(&data)?;

        assert_eq!(labels1, labels2, "same seed should give same result");
        Ok(())
    }

    #[test]
    fn test_kmeans_parallel_matches_sequential() -> Result<()> {
        let data: Vec<Vec<f64>> = (0..200)
            .map(|i| vec![(i * 37 % 101) as f64 / 101.0, (i * 17 % 89) as f64 / 89.0])
            .collect();

        let mut seq = PointSet::from_rows(&data)?;
        let a = Kmeans::new(6).with_seed(9).run(&mut seq)?;

        for workers in [1, 3, 7, 16] {
            let mut par = PointSet::from_rows(&data)?;
            let b = Kmeans::new(6)
                .with_seed(9)
                .with_mode(ExecutionMode::Parallel { workers })
                .run(&mut par)?;
            assert_eq!(a.labels(), b.labels());
            assert_eq!(a.centroids, b.centroids);
            assert_eq!(a.iterations, b.iterations);
        }
        Ok(())
    }

    #[test]
    fn test_kmeans_mutates_labels_in_place() -> Result<()> {
        let mut points = PointSet::from_rows(&separated())?;
        let result = Kmeans::new(2).with_seed(3).run(&mut points)?;
        assert_eq!(points.labels(), result.labels());
        assert_eq!(points.coords(), result.points.coords());
        Ok(())
    }

    #[test]
    fn test_kmeans_ignores_incoming_labels() -> Result<()> {
        let points: Vec<Point> = separated()
            .into_iter()
            .map(|c| Point::new(c).with_cluster_id(7))
            .collect();
        let mut points = PointSet::from_points(points)?;
        let result = Kmeans::new(2).with_seed(5).run(&mut points)?;
        assert!(result.labels().iter().all(|&l| l < 2));
        Ok(())
    }

    #[test]
    fn test_kmeans_empty_input_is_degenerate() -> Result<()> {
        let mut points = PointSet::from_rows(&[])?;
        let result = Kmeans::new(2).run(&mut points)?;
        assert!(result.centroids.is_empty());
        assert_eq!(result.total_cost, 0.0);
        Ok(())
    }

    #[test]
    fn test_kmeans_fewer_points_than_k_is_degenerate() -> Result<()> {
        let mut points = PointSet::from_points(vec![
            Point::new(vec![0.0, 0.0]).with_cluster_id(4),
            Point::new(vec![1.0, 1.0]),
        ])?;
        let result = Kmeans::new(5).run(&mut points)?;

        assert!(result.centroids.is_empty());
        assert_eq!(result.labels(), &[4, UNASSIGNED]);
        Ok(())
    }

    #[test]
    fn test_kmeans_zero_k_is_degenerate() -> Result<()> {
        let mut points = PointSet::from_rows(&separated())?;
        let result = Kmeans::new(0).run(&mut points)?;
        assert_eq!(result.k(), 0);
        Ok(())
    }

    #[test]
    fn test_kmeans_budget_exhaustion_is_not_an_error() -> Result<()> {
        let data: Vec<Vec<f64>> = (0..100)
            .map(|i| vec![(i * 31 % 97) as f64, (i * 13 % 89) as f64])
            .collect();
        let mut points = PointSet::from_rows(&data)?;
        let result = Kmeans::new(8).with_seed(1).with_max_iter(1).run(&mut points)?;

        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
        assert_eq!(result.k(), 8);
        assert!(result.labels().iter().all(|&l| l < 8));
        Ok(())
    }

    #[test]
    fn test_kmeans_rejects_bad_parameters() -> Result<()> {
        let mut points = PointSet::from_rows(&separated())?;
        assert!(Kmeans::new(2).with_max_iter(0).run(&mut points).is_err());
        assert!(Kmeans::new(2).with_tol(-1.0).run(&mut points).is_err());
        assert!(Kmeans::new(2)
            .with_mode(ExecutionMode::Parallel { workers: 0 })
            .run(&mut points)
            .is_err());
        Ok(())
    }

    #[test]
    fn test_kmeans_more_clusters_than_locations() -> Result<()> {
        // Three distinct locations, five clusters: two centroids can never
        // win a point, and there is no donor point to re-seed them from.
        let mut rows = vec![vec![0.0, 0.0]; 6];
        rows.extend(vec![vec![1.0, 1.0]; 6]);
        rows.extend(vec![vec![5.0, 5.0]; 6]);
        let mut points = PointSet::from_rows(&rows)?;

        let result = Kmeans::new(5).with_seed(2).run(&mut points)?;
        assert!(result.converged);
        assert_eq!(result.k(), 5);
        assert!(result.labels().iter().all(|&l| l < 5));
        assert_eq!(result.labels()[0..6], [result.labels()[0]; 6]);
        Ok(())
    }
}
