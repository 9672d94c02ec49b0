//! Core domain types and algorithms for constrained geographic clustering.
//!
//! The crate partitions latitude/longitude points into clusters that respect
//! a maximum-size constraint, expressed either as a maximum distance from a
//! cluster center ([`ClusterMode::CenterRadius`]) or as a maximum pairwise
//! distance within a cluster ([`ClusterMode::Diameter`]). Every operation is
//! a pure function of its inputs: distance matrices and spatial indices are
//! built per call and owned by that call.
//!
//! Constructors and algorithms return `Result` to surface invalid input
//! before any computation runs. Constraint violations found by the
//! validators are reported as data ([`ValidationReport`]), not as errors.
//!
//! # Examples
//!
//! ```
//! use geocluster_core::{GeoPoint, cluster_by_center_radius, validate_center_radius};
//!
//! # fn main() -> Result<(), geocluster_core::ClusterError> {
//! let points = vec![
//!     GeoPoint::new(37.7749, -122.4194)?,
//!     GeoPoint::new(37.8044, -122.2712)?,
//!     GeoPoint::new(37.3382, -121.8863)?,
//! ];
//! let clustering = cluster_by_center_radius(&points, 30.0)?;
//! assert_eq!(clustering.num_clusters(), 2);
//!
//! let report = validate_center_radius(
//!     &points,
//!     clustering.labels(),
//!     clustering.centers(),
//!     30.0,
//!     geocluster_core::DEFAULT_TOLERANCE_KM,
//! )?;
//! assert!(report.is_valid());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cluster;
pub mod distance;
pub mod error;
pub mod point;
pub mod spatial;
pub mod stats;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use cluster::{ClusterMode, Clustering, cluster, cluster_by_center_radius, cluster_by_diameter};
pub use distance::{DistanceMatrix, EARTH_RADIUS_KM, haversine, haversine_km};
pub use error::{ClusterError, CoordinateError, ParameterError};
pub use point::GeoPoint;
pub use spatial::SpatialIndex;
pub use stats::{Aggregate, ClusterStatistics, ClusterSummary, compute_cluster_statistics};
pub use validate::{
    DEFAULT_TOLERANCE_KM, ValidationReport, Violation, validate_center_radius,
    validate_diameter,
};
