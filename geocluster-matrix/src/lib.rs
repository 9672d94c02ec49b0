//! Cluster-aware travel-time matrices for route optimisers.
//!
//! Given a set of points, a clustering labeling and an observed travel-time
//! budget, [`TimeMatrixBuilder`] estimates separate speeds for travel within
//! and between clusters and produces a symmetric N×N matrix of travel times
//! in minutes. Two unknown speeds are constrained by a single budget
//! equation, so the builder searches a small fixed set of speed ratios for
//! one whose implied speeds fall inside realistic bounds, and falls back to
//! a fixed ratio when none does.
//!
//! Weakly fragmented point sets skip the cluster-aware model and use a
//! single speed. Every matrix passes through a validation gate whose
//! findings are returned as data alongside it.
//!
//! # Examples
//!
//! ```
//! use geocluster_core::{GeoPoint, cluster_by_center_radius};
//! use geocluster_matrix::{MatrixMethod, ObservedTrips, TimeMatrixBuilder, TimeMatrixRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let points = GeoPoint::from_pairs(&[
//!     (37.7749, -122.4194),
//!     (37.8044, -122.2712),
//!     (37.3382, -121.8863),
//! ])?;
//! let clustering = cluster_by_center_radius(&points, 30.0)?;
//! let trips = ObservedTrips::new(120.0, vec![(0, 1), (1, 2)]);
//! let request = TimeMatrixRequest::new(&points, clustering.labels(), &trips);
//! let result = TimeMatrixBuilder::new().build(&request)?;
//! assert_eq!(result.matrix().len(), 3);
//! assert_eq!(result.method(), MatrixMethod::ClusterAware);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod config;
mod error;
mod export;
mod fragmentation;
mod speed;
mod trips;

pub use builder::{
    MatrixMethod, MatrixValidation, TimeMatrix, TimeMatrixBuilder, TimeMatrixRequest,
    TimeMatrixResult,
};
pub use config::{DEFAULT_ALPHA_CANDIDATES, ROAD_FACTOR_RANGE, SpeedBounds, TimeMatrixConfig};
pub use error::MatrixError;
pub use export::TimeMatrixExport;
pub use fragmentation::fragmentation_score;
pub use speed::{SpeedEstimate, basic_speed, estimate_speeds};
pub use trips::{ObservedTrips, TripDistances};
