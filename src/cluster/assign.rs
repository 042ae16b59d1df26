//! Nearest-centroid assignment.
//!
//! Both strategies run the same per-point kernel. The parallel one splits
//! the label vector into contiguous chunks of `ceil(n / workers)` and hands
//! each chunk to one task; coordinates are only read. Because a point's
//! label depends on nothing but its own coordinates, its previous label and
//! the centroids, both strategies produce identical labels.

use crate::geometry::squared_distance;
use crate::point::{Centroid, PointSet, UNASSIGNED};
use ndarray::{Array2, ArrayView1};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How the assignment step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Single pass on the calling thread.
    #[default]
    Sequential,
    /// Contiguous chunks, one per worker, processed concurrently.
    Parallel {
        /// Number of chunks the points are split into.
        workers: usize,
    },
}

impl ExecutionMode {
    /// Parallel mode with one chunk per available thread.
    pub fn parallel() -> Self {
        Self::Parallel {
            workers: default_workers(),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel { workers } => write!(f, "parallel({workers})"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::parallel()),
            other => Err(crate::error::Error::Parse(format!(
                "unknown execution mode '{other}'"
            ))),
        }
    }
}

#[cfg(feature = "parallel")]
fn default_workers() -> usize {
    rayon::current_num_threads().max(1)
}

#[cfg(not(feature = "parallel"))]
fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, usize::from)
}

/// Label every point with its nearest centroid.
///
/// Returns `true` if any label changed. On equal distances a point keeps its
/// previous label when that label is among the tied centroids, otherwise it
/// takes the lowest tied id.
pub fn assign(points: &mut PointSet, centroids: &[Centroid], mode: ExecutionMode) -> bool {
    if points.is_empty() || centroids.is_empty() {
        return false;
    }
    match mode {
        ExecutionMode::Sequential => assign_sequential(points, centroids),
        ExecutionMode::Parallel { workers } => assign_parallel(points, centroids, workers),
    }
}

fn assign_sequential(points: &mut PointSet, centroids: &[Centroid]) -> bool {
    let (coords, labels) = points.split_mut();
    assign_chunk(coords, 0, labels, centroids)
}

fn assign_parallel(points: &mut PointSet, centroids: &[Centroid], workers: usize) -> bool {
    let (coords, labels) = points.split_mut();
    let chunk = labels.len().div_ceil(workers.max(1));

    // Fold rather than `any`: every chunk must be processed.
    #[cfg(feature = "parallel")]
    let changed = labels
        .par_chunks_mut(chunk)
        .enumerate()
        .map(|(c, chunk_labels)| assign_chunk(coords, c * chunk, chunk_labels, centroids))
        .reduce(|| false, |a, b| a | b);

    #[cfg(not(feature = "parallel"))]
    let changed = labels
        .chunks_mut(chunk)
        .enumerate()
        .map(|(c, chunk_labels)| assign_chunk(coords, c * chunk, chunk_labels, centroids))
        .fold(false, |a, b| a | b);

    changed
}

/// Assign the points `start..start + labels.len()`.
fn assign_chunk(
    coords: &Array2<f64>,
    start: usize,
    labels: &mut [usize],
    centroids: &[Centroid],
) -> bool {
    let mut changed = false;
    for (offset, label) in labels.iter_mut().enumerate() {
        let nearest = nearest_centroid(&coords.row(start + offset), centroids, *label);
        if nearest != *label {
            *label = nearest;
            changed = true;
        }
    }
    changed
}

/// Id of the nearest centroid, honouring the tie rule.
pub(crate) fn nearest_centroid(
    point: &ArrayView1<'_, f64>,
    centroids: &[Centroid],
    previous: usize,
) -> usize {
    let mut best_id = UNASSIGNED;
    let mut best_dist = f64::INFINITY;
    let mut previous_dist = None;

    for centroid in centroids {
        let dist = squared_distance(point, &centroid.coordinates.view());
        if centroid.id == previous {
            previous_dist = Some(dist);
        }
        if dist < best_dist || (dist == best_dist && centroid.id < best_id) {
            best_dist = dist;
            best_id = centroid.id;
        }
    }

    match previous_dist {
        Some(d) if d == best_dist => previous,
        _ => best_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use ndarray::array;
    use proptest::prelude::*;

    fn two_centroids() -> Vec<Centroid> {
        vec![
            Centroid::new(0, array![0.0, 0.0]),
            Centroid::new(1, array![10.0, 10.0]),
        ]
    }

    #[test]
    fn assigns_nearest_and_reports_change() -> Result<()> {
        let mut points =
            PointSet::from_rows(&[vec![0.0, 1.0], vec![9.0, 9.0], vec![1.0, 0.0]])?;
        let centroids = two_centroids();

        assert!(assign(&mut points, &centroids, ExecutionMode::Sequential));
        assert_eq!(points.labels(), &[0, 1, 0]);

        // Second pass: nothing moves.
        assert!(!assign(&mut points, &centroids, ExecutionMode::Sequential));
        Ok(())
    }

    #[test]
    fn ties_keep_previous_label_else_lowest_id() -> Result<()> {
        let centroids = vec![
            Centroid::new(0, array![0.0, 0.0]),
            Centroid::new(1, array![2.0, 0.0]),
            Centroid::new(2, array![1.0, 5.0]),
        ];
        // (1, 0) is equidistant from centroids 0 and 1.
        let midpoint = array![1.0, 0.0];

        assert_eq!(nearest_centroid(&midpoint.view(), &centroids, UNASSIGNED), 0);
        assert_eq!(nearest_centroid(&midpoint.view(), &centroids, 1), 1);
        assert_eq!(nearest_centroid(&midpoint.view(), &centroids, 2), 0);
        Ok(())
    }

    #[test]
    fn tie_rule_ignores_centroid_order() {
        let centroids = vec![
            Centroid::new(1, array![2.0, 0.0]),
            Centroid::new(0, array![0.0, 0.0]),
        ];
        let midpoint = array![1.0, 0.0];
        assert_eq!(nearest_centroid(&midpoint.view(), &centroids, UNASSIGNED), 0);
    }

    #[test]
    fn more_workers_than_points() -> Result<()> {
        let rows = vec![vec![0.0, 0.0], vec![10.0, 10.0], vec![0.5, 0.5]];
        let mut seq = PointSet::from_rows(&rows)?;
        let mut par = seq.clone();
        let centroids = two_centroids();

        let a = assign(&mut seq, &centroids, ExecutionMode::Sequential);
        let b = assign(&mut par, &centroids, ExecutionMode::Parallel { workers: 8 });
        assert_eq!(a, b);
        assert_eq!(seq.labels(), par.labels());
        Ok(())
    }

    #[test]
    fn change_in_last_chunk_only_is_reported() -> Result<()> {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 0.0]).collect();
        let mut points = PointSet::from_rows(&rows)?;
        let centroids = vec![Centroid::new(0, array![0.0, 0.0])];

        assert!(assign(&mut points, &centroids, ExecutionMode::Parallel { workers: 3 }));
        assert!(!assign(&mut points, &centroids, ExecutionMode::Parallel { workers: 3 }));

        let moved = vec![
            Centroid::new(0, array![0.0, 0.0]),
            Centroid::new(1, array![15.5, 0.0]),
        ];
        // Chunks are [0, 4), [4, 8), [8, 10); only points 8 and 9 move.
        assert!(assign(&mut points, &moved, ExecutionMode::Parallel { workers: 3 }));
        assert_eq!(points.labels(), &[0, 0, 0, 0, 0, 0, 0, 0, 1, 1]);
        Ok(())
    }

    #[test]
    fn mode_parses_from_str() -> Result<()> {
        assert_eq!("sequential".parse::<ExecutionMode>()?, ExecutionMode::Sequential);
        assert!(matches!(
            " Parallel ".parse::<ExecutionMode>()?,
            ExecutionMode::Parallel { .. }
        ));
        assert!("gpu".parse::<ExecutionMode>().is_err());
        Ok(())
    }

    fn grid_points() -> impl Strategy<Value = Vec<Vec<f64>>> {
        // Coarse coordinates make exact ties common.
        proptest::collection::vec(proptest::collection::vec(0u8..6, 2), 1..120).prop_map(
            |rows| {
                rows.into_iter()
                    .map(|r| r.into_iter().map(f64::from).collect())
                    .collect()
            },
        )
    }

    fn grid_centroids() -> impl Strategy<Value = Vec<Centroid>> {
        proptest::collection::vec(proptest::collection::vec(0u8..6, 2), 1..8).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(id, r)| {
                    Centroid::new(id, r.into_iter().map(f64::from).collect::<Vec<_>>().into())
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn parallel_matches_sequential(
            rows in grid_points(),
            centroids in grid_centroids(),
            workers in 1usize..16,
        ) {
            let mut seq = PointSet::from_rows(&rows).unwrap();
            let mut par = seq.clone();

            let a = assign(&mut seq, &centroids, ExecutionMode::Sequential);
            let b = assign(&mut par, &centroids, ExecutionMode::Parallel { workers });
            prop_assert_eq!(a, b);
            prop_assert_eq!(seq.labels(), par.labels());
        }

        #[test]
        fn assignment_is_idempotent(
            rows in grid_points(),
            centroids in grid_centroids(),
            workers in 1usize..16,
        ) {
            let mut points = PointSet::from_rows(&rows).unwrap();
            assign(&mut points, &centroids, ExecutionMode::Parallel { workers });
            let labels = points.labels().to_vec();

            prop_assert!(!assign(&mut points, &centroids, ExecutionMode::Sequential));
            prop_assert_eq!(points.labels(), labels.as_slice());
        }
    }
}
