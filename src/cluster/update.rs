//! Centroid recomputation and empty-cluster handling.

use crate::geometry::squared_distance;
use crate::point::{Centroid, PointSet};
use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

/// What to do with a centroid that ended an iteration with no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Move the centroid onto the point farthest from its own centroid.
    #[default]
    FarthestPoint,
    /// Leave the all-zero centroid in place.
    Zero,
}

impl fmt::Display for EmptyClusterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyClusterPolicy::FarthestPoint => write!(f, "farthest"),
            EmptyClusterPolicy::Zero => write!(f, "zero"),
        }
    }
}

impl FromStr for EmptyClusterPolicy {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "farthest" | "farthest-point" => Ok(Self::FarthestPoint),
            "zero" => Ok(Self::Zero),
            other => Err(crate::error::Error::Parse(format!(
                "unknown empty-cluster policy '{other}'"
            ))),
        }
    }
}

/// Mean of each cluster in one pass, plus the member count per cluster.
///
/// Points whose label is not in `0..k` contribute nothing. A cluster with no
/// members gets an all-zero centroid; see [`reseed_empty`].
pub fn update_centroids(points: &PointSet, k: usize) -> (Vec<Centroid>, Vec<usize>) {
    let d = points.dimension();
    let mut sums = Array2::<f64>::zeros((k, d));
    let mut counts = vec![0usize; k];

    for (i, &label) in points.labels().iter().enumerate() {
        if label >= k {
            continue;
        }
        let mut sum = sums.row_mut(label);
        sum += &points.row(i);
        counts[label] += 1;
    }

    let centroids = sums
        .rows()
        .into_iter()
        .zip(&counts)
        .enumerate()
        .map(|(id, (sum, &count))| {
            if count > 0 {
                Centroid::new(id, &sum / count as f64)
            } else {
                Centroid::new(id, sum.to_owned())
            }
        })
        .collect();

    (centroids, counts)
}

/// Move every empty centroid onto a distinct far-away point.
///
/// Candidates are points whose cluster keeps at least one other member and
/// that do not sit exactly on the centroid they were assigned against
/// (`previous`). They are ranked by that distance, farthest first, ties to the
/// lower index. Returns the ids that were moved.
pub fn reseed_empty(
    points: &PointSet,
    previous: &[Centroid],
    centroids: &mut [Centroid],
    counts: &mut [usize],
) -> Vec<usize> {
    let empty: Vec<usize> = (0..counts.len()).filter(|&id| counts[id] == 0).collect();
    if empty.is_empty() {
        return empty;
    }

    let mut candidates: Vec<(usize, f64)> = points
        .labels()
        .iter()
        .enumerate()
        .filter_map(|(i, &label)| {
            let centroid = previous.get(label).filter(|c| c.id == label)?;
            let dist = squared_distance(&points.row(i), &centroid.coordinates.view());
            (dist > 0.0).then_some((i, dist))
        })
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut moved = Vec::with_capacity(empty.len());
    let mut next = candidates.into_iter();
    for id in empty {
        let donor = next.find(|&(i, _)| counts[points.label(i)] > 1);
        let Some((i, _)) = donor else {
            break;
        };
        counts[points.label(i)] -= 1;
        counts[id] = 1;
        centroids[id].coordinates = points.row(i).to_owned();
        moved.push(id);
    }
    moved
}
