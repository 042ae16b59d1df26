//! Centroid-shift convergence test.

use crate::geometry::squared_distance;
use crate::point::Centroid;

/// Default squared-shift tolerance.
pub const DEFAULT_TOL: f64 = 1e-4;

/// True if every centroid moved by at most `tol` (squared distance).
///
/// Sets of different size never converge. Centroids are compared
/// position by position, which is id order for sets built by this crate.
pub fn has_converged(previous: &[Centroid], current: &[Centroid], tol: f64) -> bool {
    if previous.len() != current.len() {
        return false;
    }
    previous.iter().zip(current).all(|(old, new)| {
        squared_distance(&old.coordinates.view(), &new.coordinates.view()) <= tol
    })
}
