//! Persisted export document consumed by route optimisers.

use std::io::Write;

use geocluster_core::{ClusterError, ParameterError};
use serde::{Deserialize, Serialize};

use crate::builder::{MatrixMethod, TimeMatrixResult};
use crate::error::MatrixError;

/// Serialisable time matrix with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMatrixExport {
    /// Identifier of the territory representative the matrix belongs to.
    pub representative_id: String,
    /// Speed model used.
    pub method: MatrixMethod,
    /// Fragmentation score of the labeling.
    pub fragmentation_score: f64,
    /// Number of distinct clusters.
    pub num_clusters: usize,
    /// Intra-cluster speed in km/min.
    pub speed_intra_km_per_min: f64,
    /// Inter-cluster speed in km/min.
    pub speed_inter_km_per_min: f64,
    /// Road circuity factor.
    pub road_factor: f64,
    /// Travel times in minutes, row-major.
    pub time_matrix: Vec<Vec<f64>>,
    /// Store identifier for each matrix row.
    pub store_ids: Vec<String>,
    /// Cluster label for each matrix row.
    pub cluster_assignments: Vec<usize>,
    /// Whether the validation gate passed.
    pub validation_passed: bool,
    /// Validation gate findings.
    pub validation_errors: Vec<String>,
}

impl TimeMatrixExport {
    /// Write the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Export`] when serialisation or the writer
    /// fails.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), MatrixError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl TimeMatrixResult {
    /// Package the result for persistence.
    ///
    /// # Errors
    ///
    /// Returns a wrapped [`ClusterError`] when `store_ids` does not have one
    /// entry per matrix row.
    pub fn to_export(
        &self,
        representative_id: impl Into<String>,
        store_ids: Vec<String>,
    ) -> Result<TimeMatrixExport, MatrixError> {
        if store_ids.len() != self.matrix.len() {
            return Err(ClusterError::from(ParameterError::LengthMismatch {
                what: "store_ids",
                expected: self.matrix.len(),
                found: store_ids.len(),
            })
            .into());
        }
        Ok(TimeMatrixExport {
            representative_id: representative_id.into(),
            method: self.method,
            fragmentation_score: self.fragmentation_score,
            num_clusters: self.num_clusters,
            speed_intra_km_per_min: self.speed_intra,
            speed_inter_km_per_min: self.speed_inter,
            road_factor: self.road_factor,
            time_matrix: self.matrix.to_rows(),
            store_ids,
            cluster_assignments: self.labels.clone(),
            validation_passed: self.validation.passed,
            validation_errors: self.validation.errors.clone(),
        })
    }
}
