//! Point and centroid storage.
//!
//! Points live in a [`PointSet`]: one `(n, d)` coordinate matrix plus a
//! parallel label vector. Clustering never touches the coordinates; it only
//! rewrites labels, and the parallel assignment step hands out disjoint
//! ranges of the label vector to its workers.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1};

/// Label carried by a point that belongs to no cluster.
pub const UNASSIGNED: usize = usize::MAX;

/// A single point as produced by ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Coordinates, one per dimension.
    pub coordinates: Vec<f64>,
    /// Cluster label, or [`UNASSIGNED`].
    pub cluster_id: usize,
}

impl Point {
    /// Create an unassigned point.
    pub fn new(coordinates: Vec<f64>) -> Self {
        Self {
            coordinates,
            cluster_id: UNASSIGNED,
        }
    }

    /// Attach a label.
    pub fn with_cluster_id(mut self, cluster_id: usize) -> Self {
        self.cluster_id = cluster_id;
        self
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }
}

/// A cluster centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    /// Cluster id in `[0, k)`; also the label of points assigned here.
    pub id: usize,
    /// Mean of the assigned points.
    pub coordinates: Array1<f64>,
}

impl Centroid {
    /// Create a centroid.
    pub fn new(id: usize, coordinates: Array1<f64>) -> Self {
        Self { id, coordinates }
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }
}

/// Points sharing one dimension, stored row-major with a label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    coords: Array2<f64>,
    labels: Vec<usize>,
}

impl PointSet {
    /// Build from owned points. All points must share one dimension.
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        let n = points.len();
        let d = points.first().map_or(0, Point::dimension);

        let mut flat: Vec<f64> = Vec::with_capacity(n * d);
        let mut labels = Vec::with_capacity(n);
        for point in points {
            if point.dimension() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: point.dimension(),
                });
            }
            flat.extend(point.coordinates);
            labels.push(point.cluster_id);
        }

        let coords = Array2::from_shape_vec((n, d), flat)
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Self { coords, labels })
    }

    /// Build unassigned points from raw rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::from_points(rows.iter().cloned().map(Point::new).collect())
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if the set has no points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Shared dimension of the points (0 for an empty set).
    pub fn dimension(&self) -> usize {
        self.coords.ncols()
    }

    /// Coordinates of point `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.coords.row(i)
    }

    /// The full coordinate matrix.
    pub fn coords(&self) -> &Array2<f64> {
        &self.coords
    }

    pub(crate) fn coords_mut(&mut self) -> &mut Array2<f64> {
        &mut self.coords
    }

    /// Label of point `i`.
    pub fn label(&self, i: usize) -> usize {
        self.labels[i]
    }

    /// All labels in point order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Coordinates (shared) and labels (exclusive) at once, for the
    /// assignment step.
    pub(crate) fn split_mut(&mut self) -> (&Array2<f64>, &mut [usize]) {
        (&self.coords, &mut self.labels)
    }

    /// Mark every point unassigned.
    pub fn clear_labels(&mut self) {
        self.labels.fill(UNASSIGNED);
    }

    /// Copy back out into owned points.
    pub fn to_points(&self) -> Vec<Point> {
        self.coords
            .rows()
            .into_iter()
            .zip(&self.labels)
            .map(|(row, &cluster_id)| Point {
                coordinates: row.to_vec(),
                cluster_id,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_keeps_order_and_labels() -> Result<()> {
        let set = PointSet::from_points(vec![
            Point::new(vec![1.0, 2.0]).with_cluster_id(3),
            Point::new(vec![3.0, 4.0]),
        ])?;

        assert_eq!(set.len(), 2);
        assert_eq!(set.dimension(), 2);
        assert_eq!(set.row(1).to_vec(), vec![3.0, 4.0]);
        assert_eq!(set.labels(), &[3, UNASSIGNED]);
        assert_eq!(set.to_points()[0].coordinates, vec![1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let result = PointSet::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0, 1.0]]);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn empty_set_has_zero_dimension() -> Result<()> {
        let set = PointSet::from_points(Vec::new())?;
        assert!(set.is_empty());
        assert_eq!(set.dimension(), 0);
        Ok(())
    }
}
