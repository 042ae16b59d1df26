//! # kselect
//!
//! K-means clustering with a cost-driven choice of k.
//!
//! Points are grouped around centroids; every centroid costs a fixed amount
//! to establish and every point costs a per-unit-distance amount to serve
//! from its centroid. [`AutoKSelector`] walks k = 1, 2, … and keeps the
//! cheapest clustering, stopping once the cost keeps rising.
//!
//! ```rust
//! use kselect::{AutoKSelector, CostModel, PointSet};
//!
//! let points = PointSet::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.0, 0.1],
//!     vec![1.0, 1.0],
//!     vec![1.0, 0.9],
//! ])
//! .unwrap();
//!
//! let best = AutoKSelector::new(4, CostModel::new(0.5, 1.0).unwrap())
//!     .with_seed(1)
//!     .select(&points)
//!     .unwrap();
//! assert_eq!(best.k(), 2);
//! ```
//!
//! **Default build** includes rayon-backed parallel assignment (`parallel`),
//! CSV ingestion/export (`io`) and the `kselect` binary (`cli`).

pub mod cluster;
pub mod cost;
/// Error types used across `kselect`.
pub mod error;
pub mod generate;
pub mod geometry;
#[cfg(feature = "io")]
pub mod io;
pub mod normalize;
pub mod point;
mod result;
pub mod select;

pub use cluster::{Clustering, EmptyClusterPolicy, ExecutionMode, Kmeans};
pub use cost::{total_cost, CostModel};
pub use error::{Error, Result};
pub use normalize::{denormalize, denormalize_result, normalize, Bounds};
pub use point::{Centroid, Point, PointSet, UNASSIGNED};
pub use result::{ClusteringResult, Summary};
pub use select::{AutoKSelector, KEvaluation, Selection};
