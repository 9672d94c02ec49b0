//! Constrained clustering algorithms and their shared result type.
//!
//! Both algorithms are greedy approximations: every cluster they emit
//! satisfies its constraint by construction, but the number of clusters is
//! not guaranteed to be minimal. For identical input and bound the diameter
//! algorithm never produces fewer clusters than the center-radius one.

mod center_radius;
mod diameter;

pub use center_radius::cluster_by_center_radius;
pub use diameter::cluster_by_diameter;

use std::fmt;
use std::str::FromStr;

use crate::error::{ClusterError, ParameterError, check_max_distance};
use crate::point::GeoPoint;
use crate::validate::{ValidationReport, validate_center_radius, validate_diameter};

/// Which size constraint a clustering enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ClusterMode {
    /// Every member lies within the bound of its cluster center.
    #[default]
    CenterRadius,
    /// Every pair of members lies within the bound of each other.
    Diameter,
}

impl ClusterMode {
    /// Stable identifier used in reports and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CenterRadius => "center_radius",
            Self::Diameter => "diameter",
        }
    }
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "center_radius" | "centre_radius" | "radius" => Ok(Self::CenterRadius),
            "diameter" => Ok(Self::Diameter),
            other => Err(format!("unknown cluster mode: {other}")),
        }
    }
}

/// Labels and centers produced by one clustering run.
///
/// Labels form a total function from point index to cluster id in
/// `0..num_clusters()`, and every cluster has at least one member.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clustering {
    labels: Vec<usize>,
    centers: Vec<GeoPoint>,
    mode: ClusterMode,
}

impl Clustering {
    pub(crate) const fn new(labels: Vec<usize>, centers: Vec<GeoPoint>, mode: ClusterMode) -> Self {
        Self {
            labels,
            centers,
            mode,
        }
    }

    /// Cluster id for each input point.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Representative point for each cluster, indexed by cluster id.
    #[must_use]
    pub fn centers(&self) -> &[GeoPoint] {
        &self.centers
    }

    /// Constraint the clustering was built for.
    #[must_use]
    pub const fn mode(&self) -> ClusterMode {
        self.mode
    }

    /// Number of clusters.
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.centers.len()
    }

    /// Point indices belonging to `cluster`, ascending.
    #[must_use]
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == cluster)
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of members in each cluster, indexed by cluster id.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centers.len()];
        for &label in &self.labels {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }

    /// Check the clustering against the constraint of its own mode.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidParameter`] when `points` does not
    /// match the labels or the bound/tolerance are invalid.
    pub fn validate(
        &self,
        points: &[GeoPoint],
        max_distance_km: f64,
        tolerance_km: f64,
    ) -> Result<ValidationReport, ClusterError> {
        match self.mode {
            ClusterMode::CenterRadius => validate_center_radius(
                points,
                &self.labels,
                &self.centers,
                max_distance_km,
                tolerance_km,
            ),
            ClusterMode::Diameter => {
                validate_diameter(points, &self.labels, max_distance_km, tolerance_km)
            }
        }
    }

    /// Require that no more than `max_clusters` clusters were needed.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InfeasibleConstraint`] when the bound forced
    /// more clusters than the caller accepts.
    pub fn ensure_at_most(
        &self,
        max_clusters: usize,
        max_distance_km: f64,
    ) -> Result<(), ClusterError> {
        let found = self.num_clusters();
        if found <= max_clusters {
            Ok(())
        } else {
            Err(ClusterError::InfeasibleConstraint {
                required: max_clusters,
                found,
                max_distance_km,
            })
        }
    }
}

/// Cluster `points` under the constraint selected by `mode`.
///
/// # Errors
///
/// See [`cluster_by_center_radius`] and [`cluster_by_diameter`].
pub fn cluster(
    points: &[GeoPoint],
    max_distance_km: f64,
    mode: ClusterMode,
) -> Result<Clustering, ClusterError> {
    match mode {
        ClusterMode::CenterRadius => cluster_by_center_radius(points, max_distance_km),
        ClusterMode::Diameter => cluster_by_diameter(points, max_distance_km),
    }
}

/// Shared boundary checks run before either algorithm touches the data.
fn check_input(points: &[GeoPoint], max_distance_km: f64) -> Result<(), ClusterError> {
    if points.is_empty() {
        return Err(ParameterError::EmptyInput.into());
    }
    check_max_distance(max_distance_km)?;
    Ok(())
}

/// Mark `index` as assigned and return whether it was previously free.
fn claim(labels: &mut [Option<usize>], index: usize, cluster: usize) -> bool {
    match labels.get_mut(index) {
        Some(slot @ None) => {
            *slot = Some(cluster);
            true
        }
        _ => false,
    }
}

/// Collapse assignment slots into final labels once every point is claimed.
fn finish(labels: Vec<Option<usize>>) -> Vec<usize> {
    labels
        .into_iter()
        .map(|label| label.unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bay_area_points;
    use rstest::rstest;

    #[rstest]
    #[case("center-radius", ClusterMode::CenterRadius)]
    #[case("center_radius", ClusterMode::CenterRadius)]
    #[case("Diameter", ClusterMode::Diameter)]
    fn parses_modes(#[case] raw: &str, #[case] expected: ClusterMode) {
        assert_eq!(raw.parse::<ClusterMode>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_mode() {
        assert!("kmeans".parse::<ClusterMode>().is_err());
    }

    #[rstest]
    #[case(ClusterMode::CenterRadius)]
    #[case(ClusterMode::Diameter)]
    fn dispatch_produces_valid_clustering(#[case] mode: ClusterMode) {
        let points = bay_area_points();
        let clustering = cluster(&points, 30.0, mode).expect("clustering succeeds");
        assert_eq!(clustering.mode(), mode);
        assert_eq!(clustering.num_clusters(), 2);
        assert_eq!(clustering.cluster_sizes(), vec![3, 3]);
        let report = clustering
            .validate(&points, 30.0, crate::DEFAULT_TOLERANCE_KM)
            .expect("shapes match");
        assert!(report.is_valid());
    }

    #[rstest]
    fn members_lists_indices_in_order() {
        let points = bay_area_points();
        let clustering = cluster_by_center_radius(&points, 30.0).expect("clustering succeeds");
        assert_eq!(clustering.members(0), vec![0, 2, 3]);
        assert_eq!(clustering.members(1), vec![1, 4, 5]);
        assert!(clustering.members(2).is_empty());
    }

    #[rstest]
    fn ensure_at_most_reports_infeasible_bound() {
        let points = bay_area_points();
        let clustering = cluster_by_diameter(&points, 30.0).expect("clustering succeeds");
        assert!(clustering.ensure_at_most(2, 30.0).is_ok());
        let err = clustering
            .ensure_at_most(1, 30.0)
            .expect_err("one cluster cannot hold the Bay Area at 30 km");
        assert!(matches!(
            err,
            ClusterError::InfeasibleConstraint {
                required: 1,
                found: 2,
                ..
            }
        ));
    }

    #[rstest]
    fn claim_only_assigns_free_slots() {
        let mut labels = vec![None, Some(0)];
        assert!(claim(&mut labels, 0, 1));
        assert!(!claim(&mut labels, 0, 2));
        assert!(!claim(&mut labels, 1, 2));
        assert!(!claim(&mut labels, 5, 2));
        assert_eq!(finish(labels), vec![1, 0]);
    }
}
