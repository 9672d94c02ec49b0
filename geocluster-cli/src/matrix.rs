//! `matrix` command implementation.

use std::io::{BufWriter, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use geocluster_core::{ClusterMode, cluster};
use geocluster_matrix::{TimeMatrixBuilder, TimeMatrixConfig, TimeMatrixExport, TimeMatrixRequest};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::cluster::parse_mode;
use crate::io::{PointSet, create_utf8_file, load_points, load_trips, require_existing, write_json};
use crate::{
    ARG_MAX_DISTANCE_KM, ARG_MODE, ARG_OUTPUT, ARG_POINTS, ARG_REPRESENTATIVE_ID,
    ARG_ROAD_FACTOR, ARG_TRIPS, CliError, ENV_MATRIX_MAX_DISTANCE_KM, ENV_MATRIX_POINTS,
    ENV_MATRIX_TRIPS,
};

const DEFAULT_REPRESENTATIVE_ID: &str = "representative";

/// CLI arguments for the `matrix` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "matrix",
    long_about = "Cluster a representative's stores, calibrate intra- and \
                 inter-cluster speeds against an observed tour and write the \
                 resulting travel-time matrix as JSON.",
    about = "Build a cluster-aware travel-time matrix"
)]
#[ortho_config(prefix = "GEOCLUSTER")]
pub(crate) struct MatrixArgs {
    /// Path to a JSON array of `{ "id", "latitude", "longitude" }` records.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) points_path: Option<Utf8PathBuf>,
    /// Path to a JSON file with `budget_minutes` and observed `legs`.
    #[arg(long = ARG_TRIPS, value_name = "path")]
    #[serde(default)]
    pub(crate) trips: Option<Utf8PathBuf>,
    /// Maximum distance D in kilometres used to cluster the stores.
    #[arg(long = ARG_MAX_DISTANCE_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) max_distance_km: Option<f64>,
    /// Constraint mode: `center-radius` (default) or `diameter`.
    #[arg(long = ARG_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) mode: Option<String>,
    /// Road factor converting great-circle to road distance (1.3 to 1.6).
    #[arg(long = ARG_ROAD_FACTOR, value_name = "factor")]
    #[serde(default)]
    pub(crate) road_factor: Option<f64>,
    /// Identifier recorded in the export.
    #[arg(long = ARG_REPRESENTATIVE_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) representative_id: Option<String>,
    /// Write the export here instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl MatrixArgs {
    pub(crate) fn into_config(self) -> Result<MatrixConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MatrixConfig::try_from(merged)
    }
}

/// Resolved `matrix` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatrixConfig {
    pub(crate) points_path: Utf8PathBuf,
    pub(crate) trips_path: Utf8PathBuf,
    pub(crate) max_distance_km: f64,
    pub(crate) mode: ClusterMode,
    pub(crate) matrix: TimeMatrixConfig,
    pub(crate) representative_id: String,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl MatrixConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.points_path, ARG_POINTS)?;
        require_existing(&self.trips_path, ARG_TRIPS)?;
        Ok(())
    }
}

impl TryFrom<MatrixArgs> for MatrixConfig {
    type Error = CliError;

    fn try_from(args: MatrixArgs) -> Result<Self, Self::Error> {
        let points_path = args.points_path.ok_or(CliError::MissingArgument {
            field: ARG_POINTS,
            env: ENV_MATRIX_POINTS,
        })?;
        let trips_path = args.trips.ok_or(CliError::MissingArgument {
            field: ARG_TRIPS,
            env: ENV_MATRIX_TRIPS,
        })?;
        let max_distance_km = args.max_distance_km.ok_or(CliError::MissingArgument {
            field: ARG_MAX_DISTANCE_KM,
            env: ENV_MATRIX_MAX_DISTANCE_KM,
        })?;
        let mut matrix = TimeMatrixConfig::default();
        if let Some(road_factor) = args.road_factor {
            matrix = matrix.with_road_factor(road_factor);
        }
        matrix.validate()?;
        Ok(Self {
            points_path,
            trips_path,
            max_distance_km,
            mode: parse_mode(args.mode)?,
            matrix,
            representative_id: args
                .representative_id
                .unwrap_or_else(|| DEFAULT_REPRESENTATIVE_ID.to_owned()),
            output: args.output,
        })
    }
}

pub(crate) fn run_matrix(args: MatrixArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_matrix_with(args, &mut stdout)
}

pub(crate) fn run_matrix_with(args: MatrixArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let export = execute_matrix(&config)?;
    emit_export(&config, &export, writer)
}

/// Write `export` to the configured output file, or to `writer` when none is
/// set.
pub(crate) fn emit_export(
    config: &MatrixConfig,
    export: &TimeMatrixExport,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let Some(path) = &config.output else {
        return write_json(writer, export);
    };
    let file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.clone(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    export.write_json(&mut out)?;
    out.write_all(b"\n").map_err(CliError::WriteOutput)?;
    out.flush().map_err(CliError::WriteOutput)?;
    info!("wrote {} time matrix to {path}", export.method.as_str());
    Ok(())
}

pub(crate) fn execute_matrix(config: &MatrixConfig) -> Result<TimeMatrixExport, CliError> {
    let PointSet { points, ids } = load_points(&config.points_path)?;
    let trips = load_trips(&config.trips_path)?;
    let clustering = cluster(&points, config.max_distance_km, config.mode)?;
    let builder = TimeMatrixBuilder::with_config(config.matrix.clone());
    let result = builder.build(&TimeMatrixRequest::new(&points, clustering.labels(), &trips))?;
    if !result.validation().passed {
        warn!(
            "time matrix for {} failed validation: {}",
            config.representative_id,
            result.validation().errors.join("; ")
        );
    }
    Ok(result.to_export(config.representative_id.clone(), ids)?)
}

#[cfg(test)]
pub(crate) fn matrix_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MatrixConfig, CliError> {
    let merged = MatrixArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MatrixConfig::try_from(merged)
}
