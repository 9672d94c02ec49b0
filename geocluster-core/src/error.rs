//! Error taxonomy shared by the clustering algorithms and validators.
//!
//! Input errors fail fast at the API boundary. Constraint violations found
//! during validation are not errors; see
//! [`ValidationReport`](crate::ValidationReport).

use thiserror::Error;

/// A latitude/longitude pair that cannot describe a point on Earth.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was NaN, infinite or outside `[-90, 90]`.
    #[error("latitude {latitude} is outside [-90, 90] degrees")]
    Latitude {
        /// Offending value in degrees.
        latitude: f64,
    },
    /// Longitude was NaN, infinite or outside `[-180, 180]`.
    #[error("longitude {longitude} is outside [-180, 180] degrees")]
    Longitude {
        /// Offending value in degrees.
        longitude: f64,
    },
}

/// Invalid call parameters: bounds, empty inputs and mismatched shapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// No points were supplied.
    #[error("at least one point is required")]
    EmptyInput,
    /// The maximum distance was zero, negative or not finite.
    #[error("maximum distance must be a positive, finite number of kilometres (got {value})")]
    NonPositiveDistance {
        /// Value supplied by the caller.
        value: f64,
    },
    /// The validation tolerance was negative or not finite.
    #[error("tolerance must be a non-negative, finite number of kilometres (got {value})")]
    InvalidTolerance {
        /// Value supplied by the caller.
        value: f64,
    },
    /// Two inputs that must describe the same points differ in length.
    #[error("{what} has length {found}, expected {expected}")]
    LengthMismatch {
        /// Name of the mismatched input.
        what: &'static str,
        /// Length implied by the point set.
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },
    /// A label referenced a cluster id outside the accepted range.
    #[error("point {index} has label {label} but only cluster ids below {clusters} are accepted")]
    LabelOutOfRange {
        /// Point index carrying the label.
        index: usize,
        /// Offending label.
        label: usize,
        /// Exclusive upper bound on accepted labels: the number of centers,
        /// or the number of points where no centers are involved.
        clusters: usize,
    },
    /// A point index referenced a point outside the input.
    #[error("point index {index} is out of range for {len} points")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of points available.
        len: usize,
    },
}

/// Errors returned by the clustering API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// A point had an invalid coordinate.
    #[error("point {index}: {source}")]
    InvalidCoordinate {
        /// Index of the offending point (0 for standalone coordinates).
        index: usize,
        /// Coordinate failure.
        #[source]
        source: CoordinateError,
    },
    /// A parameter failed validation.
    #[error(transparent)]
    InvalidParameter(#[from] ParameterError),
    /// A caller-side cardinality requirement cannot be met under the bound.
    ///
    /// The algorithms never raise this themselves; they always produce a
    /// valid, possibly large, clustering.
    #[error(
        "{required} or fewer clusters requested but {found} are needed for a {max_distance_km} km bound"
    )]
    InfeasibleConstraint {
        /// Maximum number of clusters the caller accepts.
        required: usize,
        /// Number of clusters produced.
        found: usize,
        /// Distance bound in kilometres.
        max_distance_km: f64,
    },
}

impl From<CoordinateError> for ClusterError {
    fn from(source: CoordinateError) -> Self {
        Self::InvalidCoordinate { index: 0, source }
    }
}

/// Reject non-positive or non-finite distance bounds.
pub(crate) fn check_max_distance(max_distance_km: f64) -> Result<(), ParameterError> {
    if max_distance_km.is_finite() && max_distance_km > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NonPositiveDistance {
            value: max_distance_km,
        })
    }
}

/// Reject negative or non-finite tolerances.
pub(crate) fn check_tolerance(tolerance_km: f64) -> Result<(), ParameterError> {
    if tolerance_km.is_finite() && tolerance_km >= 0.0 {
        Ok(())
    } else {
        Err(ParameterError::InvalidTolerance {
            value: tolerance_km,
        })
    }
}

/// Reject label slices that do not cover the point set.
pub(crate) const fn check_labels(points: usize, labels: usize) -> Result<(), ParameterError> {
    if points == labels {
        Ok(())
    } else {
        Err(ParameterError::LengthMismatch {
            what: "labels",
            expected: points,
            found: labels,
        })
    }
}
