//! Command-line interface for the geocluster engine.
//!
//! Subcommands load store locations from JSON, run the clustering engine and
//! write JSON reports. Options are layered from configuration files,
//! `GEOCLUSTER_*` environment variables and flags.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod cluster;
mod error;
mod io;
mod matrix;

pub use error::CliError;

use cluster::{ClusterArgs, CompareArgs};
use matrix::MatrixArgs;

pub(crate) const ARG_POINTS: &str = "points";
pub(crate) const ARG_MAX_DISTANCE_KM: &str = "max-distance-km";
pub(crate) const ARG_MODE: &str = "mode";
pub(crate) const ARG_MAX_CLUSTERS: &str = "max-clusters";
pub(crate) const ARG_TOLERANCE_KM: &str = "tolerance-km";
pub(crate) const ARG_TRIPS: &str = "trips";
pub(crate) const ARG_ROAD_FACTOR: &str = "road-factor";
pub(crate) const ARG_REPRESENTATIVE_ID: &str = "representative-id";
pub(crate) const ARG_OUTPUT: &str = "output";

pub(crate) const ENV_CLUSTER_POINTS: &str = "GEOCLUSTER_CMDS_CLUSTER_POINTS_PATH";
pub(crate) const ENV_CLUSTER_MAX_DISTANCE_KM: &str = "GEOCLUSTER_CMDS_CLUSTER_MAX_DISTANCE_KM";
pub(crate) const ENV_COMPARE_POINTS: &str = "GEOCLUSTER_CMDS_COMPARE_POINTS_PATH";
pub(crate) const ENV_COMPARE_MAX_DISTANCE_KM: &str = "GEOCLUSTER_CMDS_COMPARE_MAX_DISTANCE_KM";
pub(crate) const ENV_MATRIX_POINTS: &str = "GEOCLUSTER_CMDS_MATRIX_POINTS_PATH";
pub(crate) const ENV_MATRIX_MAX_DISTANCE_KM: &str = "GEOCLUSTER_CMDS_MATRIX_MAX_DISTANCE_KM";
pub(crate) const ENV_MATRIX_TRIPS: &str = "GEOCLUSTER_CMDS_MATRIX_TRIPS";

/// Run the geocluster CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, inputs
/// cannot be read, or the engine rejects them.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Cluster(args) => cluster::run_cluster(args),
        Command::Compare(args) => cluster::run_compare(args),
        Command::Matrix(args) => matrix::run_matrix(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geocluster",
    about = "Constrained geographic clustering and travel-time matrices",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cluster points under a maximum-distance constraint.
    Cluster(ClusterArgs),
    /// Run both clustering modes on the same points and compare them.
    Compare(CompareArgs),
    /// Build a cluster-aware travel-time matrix.
    Matrix(MatrixArgs),
}

#[cfg(test)]
mod tests;
