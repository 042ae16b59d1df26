//! Synthetic point sets for demos and stress tests.

use crate::error::{Error, Result};
use crate::point::Point;
use rand::Rng;
use rand_distr::Normal;

/// Half-width of the uniform noise added around each blob centre.
pub const BLOB_SPREAD: f64 = 0.8;

/// Blob centres are drawn from `[0, BLOB_EXTENT)` in every dimension.
pub const BLOB_EXTENT: f64 = 10.0;

/// `n` points scattered around `k` random centres.
///
/// Each point picks a centre uniformly and adds uniform noise of at most
/// [`BLOB_SPREAD`] per dimension. The centre index is kept as the label.
pub fn blobs<R: Rng>(n: usize, dim: usize, k: usize, rng: &mut R) -> Result<Vec<Point>> {
    if dim == 0 {
        return Err(Error::InvalidParameter {
            name: "dim",
            message: "must be at least 1",
        });
    }
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

    let centres: Vec<Vec<f64>> = (0..k)
        .map(|_| (0..dim).map(|_| rng.random_range(0.0..BLOB_EXTENT)).collect())
        .collect();

    let points = (0..n)
        .map(|_| {
            let label = rng.random_range(0..k);
            let coordinates = centres[label]
                .iter()
                .map(|&c| c + rng.random_range(-BLOB_SPREAD..BLOB_SPREAD))
                .collect();
            Point::new(coordinates).with_cluster_id(label)
        })
        .collect();

    Ok(points)
}

/// `n` unlabelled points with no cluster structure.
///
/// The first `dim / 2` dimensions are uniform on `[lo, hi)`; the rest are
/// normal with mean `(lo + hi) / 2` and standard deviation `(hi - lo) / 6`.
pub fn statistical<R: Rng>(
    n: usize,
    dim: usize,
    lo: f64,
    hi: f64,
    rng: &mut R,
) -> Result<Vec<Point>> {
    if dim == 0 {
        return Err(Error::InvalidParameter {
            name: "dim",
            message: "must be at least 1",
        });
    }
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(Error::InvalidParameter {
            name: "range",
            message: "bounds must be finite with lo < hi",
        });
    }

    let uniform_dims = dim / 2;
    let normal = Normal::new((lo + hi) / 2.0, (hi - lo) / 6.0).map_err(|_| {
        Error::InvalidParameter {
            name: "range",
            message: "cannot build normal distribution",
        }
    })?;

    let points = (0..n)
        .map(|_| {
            let coordinates = (0..dim)
                .map(|d| {
                    if d < uniform_dims {
                        rng.random_range(lo..hi)
                    } else {
                        rng.sample(normal)
                    }
                })
                .collect();
            Point::new(coordinates)
        })
        .collect();

    Ok(points)
}
