//! Facade crate for the geocluster engine.
//!
//! This crate re-exports the core clustering types and exposes the
//! cluster-aware travel-time matrix builder behind the `matrix` feature.

#![forbid(unsafe_code)]

pub use geocluster_core::{
    Aggregate, ClusterError, ClusterMode, ClusterStatistics, ClusterSummary, Clustering,
    CoordinateError, DEFAULT_TOLERANCE_KM, DistanceMatrix, EARTH_RADIUS_KM, GeoPoint,
    ParameterError, SpatialIndex, ValidationReport, Violation, cluster, cluster_by_center_radius,
    cluster_by_diameter, compute_cluster_statistics, haversine, haversine_km,
    validate_center_radius, validate_diameter,
};

#[cfg(feature = "test-support")]
pub use geocluster_core::test_support;

#[cfg(feature = "matrix")]
pub use geocluster_matrix::{
    MatrixError, MatrixMethod, MatrixValidation, ObservedTrips, SpeedEstimate, TimeMatrix,
    TimeMatrixBuilder, TimeMatrixConfig, TimeMatrixExport, TimeMatrixRequest, TimeMatrixResult,
    TripDistances, fragmentation_score,
};
