//! Cost-driven choice of k.
//!
//! [`AutoKSelector`] runs the k-means engine for k = 1, 2, … and prices every
//! outcome with [`crate::cost::total_cost`]. Small k pays in transport, large
//! k pays in build cost, so the cost curve is expected to fall and then rise.
//! The search stops once the cost has risen `patience` times in a row
//! (compared with the previous k, not with the best so far) and returns the
//! cheapest result seen.
//!
//! The early exit is a heuristic: a curve with several dips can hide a
//! cheaper k past the stopping point.

use crate::cluster::{EmptyClusterPolicy, ExecutionMode, Kmeans, DEFAULT_MAX_ITER, DEFAULT_TOL};
use crate::cost::{total_cost, CostModel};
use crate::error::{Error, Result};
use crate::point::PointSet;
use crate::result::ClusteringResult;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default number of consecutive cost increases that ends the search.
pub const DEFAULT_PATIENCE: usize = 2;

/// Cost of one evaluated k.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KEvaluation {
    /// Number of clusters.
    pub k: usize,
    /// Total cost of the run.
    pub cost: f64,
    /// Time spent on this k.
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Outcome of a search: the cheapest result plus every k that was tried.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Cheapest result; its `elapsed` covers the whole search.
    pub best: ClusteringResult,
    /// Evaluated k values in order.
    pub evaluated: Vec<KEvaluation>,
}

/// Searches k = 1..=max_k for the cheapest clustering.
#[derive(Debug, Clone)]
pub struct AutoKSelector {
    max_k: usize,
    cost_model: CostModel,
    mode: ExecutionMode,
    max_iter: usize,
    tol: f64,
    seed: Option<u64>,
    patience: usize,
    empty_cluster: EmptyClusterPolicy,
}

impl AutoKSelector {
    /// Create a selector over `1..=max_k`.
    pub fn new(max_k: usize, cost_model: CostModel) -> Self {
        Self {
            max_k,
            cost_model,
            mode: ExecutionMode::Sequential,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            seed: None,
            patience: DEFAULT_PATIENCE,
            empty_cluster: EmptyClusterPolicy::default(),
        }
    }

    /// Set the assignment strategy used for every k.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the per-k iteration budget.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the base seed; k is seeded with `seed + k`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set how many consecutive cost increases end the search.
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Set the empty-cluster policy.
    pub fn with_empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    /// Engine configured for one k.
    fn engine(&self, k: usize) -> Kmeans {
        let engine = Kmeans::new(k)
            .with_max_iter(self.max_iter)
            .with_tol(self.tol)
            .with_mode(self.mode)
            .with_empty_cluster_policy(self.empty_cluster);
        match self.seed {
            Some(seed) => engine.with_seed(seed.wrapping_add(k as u64)),
            None => engine,
        }
    }

    /// Cheapest clustering of `points`.
    pub fn select(&self, points: &PointSet) -> Result<ClusteringResult> {
        Ok(self.select_with_trace(points)?.best)
    }

    /// Cheapest clustering of `points`, with the cost of every k tried.
    ///
    /// `points` is left untouched; the returned result carries its own
    /// labelled copy. k never exceeds the number of points.
    pub fn select_with_trace(&self, points: &PointSet) -> Result<Selection> {
        if self.max_k == 0 {
            return Err(Error::InvalidParameter {
                name: "max_k",
                message: "must be at least 1",
            });
        }
        if points.is_empty() {
            return Ok(Selection {
                best: ClusteringResult::unclustered(points.clone()),
                evaluated: Vec::new(),
            });
        }

        let upper = self.max_k.min(points.len());
        if upper < self.max_k {
            debug!(max_k = self.max_k, n = points.len(), "capping k at the number of points");
        }

        let mut work = points.clone();
        self.search(upper, |k| {
            let mut result = self.engine(k).run(&mut work)?;
            result.total_cost = total_cost(&result.points, &result.centroids, &self.cost_model)?;
            Ok(result)
        })
    }

    /// Drive the search over `1..=upper` with a caller-supplied evaluator.
    ///
    /// `evaluate(k)` must return a priced result. The first error aborts the
    /// search and is returned as is.
    pub fn search<F>(&self, upper: usize, mut evaluate: F) -> Result<Selection>
    where
        F: FnMut(usize) -> Result<ClusteringResult>,
    {
        if self.patience == 0 {
            return Err(Error::InvalidParameter {
                name: "patience",
                message: "must be at least 1",
            });
        }

        let start = Instant::now();
        let mut best: Option<ClusteringResult> = None;
        let mut evaluated = Vec::new();
        let mut previous_cost: Option<f64> = None;
        let mut growth = 0;

        for k in 1..=upper {
            let step = Instant::now();
            let result = evaluate(k)?;
            let cost = result.total_cost;
            evaluated.push(KEvaluation {
                k,
                cost,
                elapsed: step.elapsed(),
            });
            info!(k, cost, "evaluated k");

            growth = match previous_cost {
                Some(prev) if cost > prev => growth + 1,
                _ => 0,
            };
            previous_cost = Some(cost);

            if best.as_ref().map_or(true, |b| cost < b.total_cost) {
                best = Some(result);
            }

            if growth >= self.patience {
                debug!(k, growth, "cost kept rising, stopping search");
                break;
            }
        }

        let mut best = best.ok_or(Error::EmptyInput)?;
        best.elapsed = start.elapsed();
        info!(
            k = best.k(),
            cost = best.total_cost,
            evaluated = evaluated.len(),
            "selected k"
        );
        Ok(Selection { best, evaluated })
    }
}
