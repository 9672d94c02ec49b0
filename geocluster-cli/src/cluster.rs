//! `cluster` and `compare` command implementations.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geocluster_core::{
    ClusterMode, ClusterStatistics, Clustering, DEFAULT_TOLERANCE_KM, GeoPoint, cluster,
    compute_cluster_statistics,
};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::io::{PointSet, load_points, require_existing, write_json};
use crate::{
    ARG_MAX_CLUSTERS, ARG_MAX_DISTANCE_KM, ARG_MODE, ARG_POINTS, ARG_TOLERANCE_KM, CliError,
    ENV_CLUSTER_MAX_DISTANCE_KM, ENV_CLUSTER_POINTS, ENV_COMPARE_MAX_DISTANCE_KM,
    ENV_COMPARE_POINTS,
};

/// CLI arguments for the `cluster` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "cluster",
    long_about = "Partition the points in a JSON file into clusters whose size \
                 is bounded by a maximum distance, either from each cluster \
                 center or between any two members. Prints the labeling, its \
                 validation and per-cluster statistics as JSON.",
    about = "Cluster points under a maximum-distance constraint"
)]
#[ortho_config(prefix = "GEOCLUSTER")]
pub(crate) struct ClusterArgs {
    /// Path to a JSON array of `{ "id", "latitude", "longitude" }` records.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) points_path: Option<Utf8PathBuf>,
    /// Maximum distance D in kilometres.
    #[arg(long = ARG_MAX_DISTANCE_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) max_distance_km: Option<f64>,
    /// Constraint mode: `center-radius` (default) or `diameter`.
    #[arg(long = ARG_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) mode: Option<String>,
    /// Fail when more than this many clusters are required.
    #[arg(long = ARG_MAX_CLUSTERS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_clusters: Option<usize>,
    /// Validation tolerance in kilometres.
    #[arg(long = ARG_TOLERANCE_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) tolerance_km: Option<f64>,
}

impl ClusterArgs {
    pub(crate) fn into_config(self) -> Result<ClusterConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ClusterConfig::try_from(merged)
    }
}

/// Resolved `cluster` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClusterConfig {
    pub(crate) points_path: Utf8PathBuf,
    pub(crate) max_distance_km: f64,
    pub(crate) mode: ClusterMode,
    pub(crate) max_clusters: Option<usize>,
    pub(crate) tolerance_km: f64,
}

impl TryFrom<ClusterArgs> for ClusterConfig {
    type Error = CliError;

    fn try_from(args: ClusterArgs) -> Result<Self, Self::Error> {
        let points_path = args.points_path.ok_or(CliError::MissingArgument {
            field: ARG_POINTS,
            env: ENV_CLUSTER_POINTS,
        })?;
        let max_distance_km = args.max_distance_km.ok_or(CliError::MissingArgument {
            field: ARG_MAX_DISTANCE_KM,
            env: ENV_CLUSTER_MAX_DISTANCE_KM,
        })?;
        Ok(Self {
            points_path,
            max_distance_km,
            mode: parse_mode(args.mode)?,
            max_clusters: args.max_clusters,
            tolerance_km: args.tolerance_km.unwrap_or(DEFAULT_TOLERANCE_KM),
        })
    }
}

pub(crate) fn parse_mode(raw: Option<String>) -> Result<ClusterMode, CliError> {
    let Some(value) = raw else {
        return Ok(ClusterMode::default());
    };
    value
        .parse()
        .map_err(|reason| CliError::InvalidArgument {
            field: ARG_MODE,
            value: value.clone(),
            reason,
        })
}

/// JSON document printed by `cluster`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ClusterReport {
    pub(crate) mode: ClusterMode,
    pub(crate) max_distance_km: f64,
    pub(crate) num_clusters: usize,
    pub(crate) store_ids: Vec<String>,
    pub(crate) clustering: Clustering,
    pub(crate) valid: bool,
    pub(crate) violations: Vec<String>,
    pub(crate) statistics: ClusterStatistics,
}

pub(crate) fn run_cluster(args: ClusterArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_cluster_with(args, &mut stdout)
}

pub(crate) fn run_cluster_with(args: ClusterArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.points_path, ARG_POINTS)?;
    let report = execute_cluster(&config)?;
    write_json(writer, &report)
}

pub(crate) fn execute_cluster(config: &ClusterConfig) -> Result<ClusterReport, CliError> {
    let PointSet { points, ids } = load_points(&config.points_path)?;
    let clustering = cluster(&points, config.max_distance_km, config.mode)?;
    if let Some(max_clusters) = config.max_clusters {
        clustering.ensure_at_most(max_clusters, config.max_distance_km)?;
    }
    let validation = clustering.validate(&points, config.max_distance_km, config.tolerance_km)?;
    if !validation.is_valid() {
        warn!(
            "{} clustering failed validation with {} violations",
            config.mode,
            validation.violations().len()
        );
    }
    let statistics = compute_cluster_statistics(
        &points,
        clustering.labels(),
        Some(clustering.centers()),
        None,
    )?;
    info!(
        "clustered {} points from {} into {} clusters",
        points.len(),
        config.points_path,
        clustering.num_clusters()
    );
    Ok(ClusterReport {
        mode: config.mode,
        max_distance_km: config.max_distance_km,
        num_clusters: clustering.num_clusters(),
        store_ids: ids,
        valid: validation.is_valid(),
        violations: validation.messages(),
        statistics,
        clustering,
    })
}

/// CLI arguments for the `compare` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "compare",
    about = "Run both clustering modes on the same points and compare them"
)]
#[ortho_config(prefix = "GEOCLUSTER")]
pub(crate) struct CompareArgs {
    /// Path to a JSON array of `{ "id", "latitude", "longitude" }` records.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) points_path: Option<Utf8PathBuf>,
    /// Maximum distance D in kilometres.
    #[arg(long = ARG_MAX_DISTANCE_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) max_distance_km: Option<f64>,
    /// Validation tolerance in kilometres.
    #[arg(long = ARG_TOLERANCE_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) tolerance_km: Option<f64>,
}

impl CompareArgs {
    pub(crate) fn into_config(self) -> Result<CompareConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CompareConfig::try_from(merged)
    }
}

/// Resolved `compare` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompareConfig {
    pub(crate) points_path: Utf8PathBuf,
    pub(crate) max_distance_km: f64,
    pub(crate) tolerance_km: f64,
}

impl TryFrom<CompareArgs> for CompareConfig {
    type Error = CliError;

    fn try_from(args: CompareArgs) -> Result<Self, Self::Error> {
        let points_path = args.points_path.ok_or(CliError::MissingArgument {
            field: ARG_POINTS,
            env: ENV_COMPARE_POINTS,
        })?;
        let max_distance_km = args.max_distance_km.ok_or(CliError::MissingArgument {
            field: ARG_MAX_DISTANCE_KM,
            env: ENV_COMPARE_MAX_DISTANCE_KM,
        })?;
        Ok(Self {
            points_path,
            max_distance_km,
            tolerance_km: args.tolerance_km.unwrap_or(DEFAULT_TOLERANCE_KM),
        })
    }
}

/// Outcome of one mode within a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ModeSummary {
    pub(crate) num_clusters: usize,
    pub(crate) valid: bool,
    pub(crate) cluster_sizes: Vec<usize>,
    pub(crate) max_diameter_km: Option<f64>,
}

/// JSON document printed by `compare`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CompareReport {
    pub(crate) num_points: usize,
    pub(crate) max_distance_km: f64,
    pub(crate) center_radius: ModeSummary,
    pub(crate) diameter: ModeSummary,
    /// Diameter mode needed at least as many clusters as center-radius.
    pub(crate) monotonic: bool,
}

pub(crate) fn run_compare(args: CompareArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_compare_with(args, &mut stdout)
}

pub(crate) fn run_compare_with(args: CompareArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.points_path, ARG_POINTS)?;
    let PointSet { points, .. } = load_points(&config.points_path)?;
    let report = compare_modes(&points, config.max_distance_km, config.tolerance_km)?;
    write_json(writer, &report)
}

pub(crate) fn compare_modes(
    points: &[GeoPoint],
    max_distance_km: f64,
    tolerance_km: f64,
) -> Result<CompareReport, CliError> {
    let center_radius = summarise(points, ClusterMode::CenterRadius, max_distance_km, tolerance_km)?;
    let diameter = summarise(points, ClusterMode::Diameter, max_distance_km, tolerance_km)?;
    let monotonic = diameter.num_clusters >= center_radius.num_clusters;
    if !monotonic {
        warn!(
            "diameter mode produced fewer clusters ({}) than center-radius ({})",
            diameter.num_clusters, center_radius.num_clusters
        );
    }
    Ok(CompareReport {
        num_points: points.len(),
        max_distance_km,
        center_radius,
        diameter,
        monotonic,
    })
}

fn summarise(
    points: &[GeoPoint],
    mode: ClusterMode,
    max_distance_km: f64,
    tolerance_km: f64,
) -> Result<ModeSummary, CliError> {
    let clustering = cluster(points, max_distance_km, mode)?;
    let validation = clustering.validate(points, max_distance_km, tolerance_km)?;
    let statistics = compute_cluster_statistics(points, clustering.labels(), None, None)?;
    info!("{mode}: {} clusters", clustering.num_clusters());
    Ok(ModeSummary {
        num_clusters: clustering.num_clusters(),
        valid: validation.is_valid(),
        cluster_sizes: clustering.cluster_sizes(),
        max_diameter_km: statistics.diameters_km.map(|aggregate| aggregate.max),
    })
}

#[cfg(test)]
pub(crate) fn cluster_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ClusterConfig, CliError> {
    let merged = ClusterArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ClusterConfig::try_from(merged)
}
