//! Errors raised while building or exporting a time matrix.

use geocluster_core::ClusterError;
use thiserror::Error;

/// Failures that stop a time matrix from being built.
///
/// Problems with a built matrix, such as an unreconciled budget, are not
/// errors; they are recorded in [`MatrixValidation`](crate::MatrixValidation).
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The observed travel-time budget was not a positive, finite number.
    #[error("travel-time budget must be a positive, finite number of minutes (got {value})")]
    InvalidBudget {
        /// Value supplied by the caller.
        value: f64,
    },
    /// Observed distances were negative, non-finite or both zero.
    #[error("observed distances must be finite, non-negative and not both zero (intra {intra_km} km, inter {inter_km} km)")]
    InvalidDistances {
        /// Intra-cluster distance in kilometres.
        intra_km: f64,
        /// Inter-cluster distance in kilometres.
        inter_km: f64,
    },
    /// A configuration value was outside its accepted range.
    #[error("invalid configuration for {field}: {value}")]
    InvalidConfig {
        /// Configuration field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// No speed-ratio candidates were configured.
    #[error("at least one speed-ratio candidate is required")]
    NoAlphaCandidates,
    /// An observed leg referenced a point outside the input.
    #[error("observed leg {leg} references point {index}, but only {len} points were supplied")]
    LegOutOfRange {
        /// Position of the leg in the trip list.
        leg: usize,
        /// Offending point index.
        index: usize,
        /// Number of points available.
        len: usize,
    },
    /// Neither observed legs nor explicit distances were supplied.
    #[error("observed trips must contain at least one leg when no distances are supplied")]
    NoObservedDistance,
    /// Point, label or identifier inputs disagreed in shape.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
    /// Writing the export document failed.
    #[error("failed to serialise time matrix export: {0}")]
    Export(#[from] serde_json::Error),
}
