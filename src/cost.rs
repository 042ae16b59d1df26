//! Pricing a clustering.
//!
//! Each centroid is a facility that costs `build_cost` to establish; each
//! point is served from its centroid at `transport_cost_per_unit` per unit
//! of Euclidean distance:
//!
//! ```text
//! total = k · build_cost + Σᵢ transport_cost_per_unit · ‖xᵢ − μ(xᵢ)‖
//! ```
//!
//! Few centroids make transport expensive; many make building expensive.
//! [`crate::select::AutoKSelector`] searches for the balance.

use crate::error::{Error, Result};
use crate::geometry::distance;
use crate::point::{Centroid, PointSet};
use serde::Serialize;

/// Economic parameters of a clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostModel {
    /// Cost per established centroid.
    pub build_cost: f64,
    /// Cost per unit of distance between a point and its centroid.
    pub transport_cost_per_unit: f64,
}

impl CostModel {
    /// Create a cost model. Both costs must be finite and non-negative.
    pub fn new(build_cost: f64, transport_cost_per_unit: f64) -> Result<Self> {
        if !(build_cost.is_finite() && build_cost >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "build_cost",
                message: "must be finite and non-negative",
            });
        }
        if !(transport_cost_per_unit.is_finite() && transport_cost_per_unit >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "transport_cost_per_unit",
                message: "must be finite and non-negative",
            });
        }
        Ok(Self {
            build_cost,
            transport_cost_per_unit,
        })
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            build_cost: 1.0,
            transport_cost_per_unit: 1.0,
        }
    }
}

/// Total cost of `points` served by `centroids`.
///
/// Every point must carry the id of a centroid in the set; a point that does
/// not is reported as [`Error::UnknownCluster`].
pub fn total_cost(points: &PointSet, centroids: &[Centroid], model: &CostModel) -> Result<f64> {
    let build = centroids.len() as f64 * model.build_cost;

    let mut transport = 0.0;
    for (i, &label) in points.labels().iter().enumerate() {
        let centroid = find_centroid(centroids, label).ok_or(Error::UnknownCluster {
            point: i,
            cluster_id: label,
        })?;
        transport += model.transport_cost_per_unit
            * distance(&points.row(i), &centroid.coordinates.view());
    }

    Ok(build + transport)
}

fn find_centroid(centroids: &[Centroid], id: usize) -> Option<&Centroid> {
    centroids
        .get(id)
        .filter(|c| c.id == id)
        .or_else(|| centroids.iter().find(|c| c.id == id))
}
