//! K-means clustering for a fixed number of clusters.
//!
//! The engine ([`Kmeans`]) is assembled from four steps, each in its own
//! module so it can be tested and reused on its own:
//!
//! | Step | Module | Cost per call |
//! |------|--------|---------------|
//! | k-means++ seeding | [`seed`] | O(n·k·d) |
//! | nearest-centroid assignment | [`assign`] | O(n·k·d) |
//! | centroid recomputation | [`update`] | O(n·d) |
//! | convergence test | [`convergence`] | O(k·d) |
//!
//! Only assignment runs concurrently ([`ExecutionMode::Parallel`]). Every
//! other step runs on the calling thread, and assignment completes for all
//! points before the centroids are recomputed.
//!
//! ## Usage
//!
//! ```rust
//! use kselect::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(7).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);  // First two together
//! assert_ne!(labels[0], labels[2]);  // Separate from last two
//! ```

pub mod assign;
pub mod convergence;
mod kmeans;
pub mod seed;
mod traits;
pub mod update;

pub use assign::{assign, ExecutionMode};
pub use convergence::{has_converged, DEFAULT_TOL};
pub use kmeans::{Kmeans, DEFAULT_MAX_ITER};
pub use seed::kmeans_plus_plus;
pub use traits::Clustering;
pub use update::{reseed_empty, update_centroids, EmptyClusterPolicy};
