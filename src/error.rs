use thiserror::Error;

/// Result alias for `kselect`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by clustering, costing and ingestion.
#[derive(Debug, Error)]
pub enum Error {
    /// Input was empty where at least one point is required.
    #[error("empty input provided")]
    EmptyInput,

    /// Points (or a point and a centroid) disagree on dimension.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A point carries a label with no matching centroid.
    #[error("point {point} is labelled {cluster_id}, which has no centroid")]
    UnknownCluster {
        /// Index of the offending point.
        point: usize,
        /// The label it carries.
        cluster_id: usize,
    },

    /// Malformed input text.
    #[error("parse error: {0}")]
    Parse(String),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV reader/writer failure.
    #[cfg(feature = "io")]
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
