//! Distance primitive.

use ndarray::ArrayView1;

/// Squared Euclidean distance.
///
/// Used for every nearest-centroid comparison; the root is only taken when a
/// true distance is priced (see [`crate::cost`]).
#[inline]
pub fn squared_distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    if let (Some(a), Some(b)) = (a.as_slice(), b.as_slice()) {
        // Contiguous rows: the common case, and the D=2 case avoids the loop.
        if a.len() == 2 && b.len() == 2 {
            let dx = a[0] - b[0];
            let dy = a[1] - b[1];
            return dx * dx + dy * dy;
        }
        return a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    }
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Euclidean distance.
#[inline]
pub fn distance(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    squared_distance(a, b).sqrt()
}
