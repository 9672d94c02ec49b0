//! Per-cluster size, radius and diameter summaries.

use crate::distance::{DistanceMatrix, haversine};
use crate::error::{ClusterError, ParameterError, check_labels};
use crate::point::GeoPoint;

/// Minimum, mean and maximum of a set of measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregate {
    /// Smallest value.
    pub min: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Largest value.
    pub max: f64,
}

impl Aggregate {
    /// Summarise `values`; returns `None` when there are none.
    #[must_use]
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0_u32;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        (count > 0).then(|| Self {
            min,
            mean: sum / f64::from(count),
            max,
        })
    }
}

/// Measurements for one cluster id.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterSummary {
    /// Cluster id.
    pub cluster_id: usize,
    /// Number of members; zero for ids skipped by the labeling.
    pub size: usize,
    /// Largest member-to-center distance, when centers were supplied.
    pub radius_km: Option<f64>,
    /// Largest pairwise member distance.
    pub diameter_km: f64,
}

/// Statistics over a whole labeling.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterStatistics {
    /// Number of cluster ids covered, including empty ones.
    pub num_clusters: usize,
    /// One summary per cluster id from 0 to the largest label.
    pub clusters: Vec<ClusterSummary>,
    /// Aggregate over non-empty cluster sizes.
    pub sizes: Option<Aggregate>,
    /// Aggregate over non-empty cluster diameters.
    pub diameters_km: Option<Aggregate>,
    /// Aggregate over non-empty cluster radii, when centers were supplied.
    pub radii_km: Option<Aggregate>,
}

impl ClusterStatistics {
    /// Number of non-empty clusters.
    #[must_use]
    pub fn non_empty(&self) -> usize {
        self.clusters.iter().filter(|c| c.size > 0).count()
    }
}

/// Compute per-cluster sizes, radii and diameters for a labeling.
///
/// Cluster ids run from 0 to the largest label; ids with no members get a
/// zero-sized summary and are left out of the aggregates. A labeling of `n`
/// points can use at most `n` ids, so labels must be below `points.len()`. A precomputed
/// `matrix` is used for diameters when supplied, otherwise distances are
/// computed on demand.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidParameter`] when `labels` does not match
/// `points`, when a label is not below `points.len()`, when `matrix` has the
/// wrong size, or when `centers` does not cover every label.
pub fn compute_cluster_statistics(
    points: &[GeoPoint],
    labels: &[usize],
    centers: Option<&[GeoPoint]>,
    matrix: Option<&DistanceMatrix>,
) -> Result<ClusterStatistics, ClusterError> {
    check_labels(points.len(), labels.len())?;
    // Bounds the per-id buckets below by the input size.
    if let Some((index, &label)) = labels
        .iter()
        .enumerate()
        .find(|&(_, &label)| label >= points.len())
    {
        return Err(ParameterError::LabelOutOfRange {
            index,
            label,
            clusters: points.len(),
        }
        .into());
    }
    if let Some(matrix) = matrix {
        if matrix.len() != points.len() {
            return Err(ParameterError::LengthMismatch {
                what: "distance matrix",
                expected: points.len(),
                found: matrix.len(),
            }
            .into());
        }
    }

    let Some(&max_label) = labels.iter().max() else {
        return Ok(ClusterStatistics::default());
    };
    if let Some(centers) = centers {
        if centers.len() <= max_label {
            return Err(ParameterError::LabelOutOfRange {
                index: labels.iter().position(|&l| l == max_label).unwrap_or_default(),
                label: max_label,
                clusters: centers.len(),
            }
            .into());
        }
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); max_label + 1];
    for (index, &label) in labels.iter().enumerate() {
        if let Some(bucket) = members.get_mut(label) {
            bucket.push(index);
        }
    }

    let distance = |i: usize, j: usize| -> f64 {
        matrix.and_then(|m| m.get(i, j)).unwrap_or_else(|| {
            match (points.get(i), points.get(j)) {
                (Some(a), Some(b)) => haversine(a, b),
                _ => 0.0,
            }
        })
    };

    let clusters: Vec<ClusterSummary> = members
        .iter()
        .enumerate()
        .map(|(cluster_id, group)| {
            let diameter_km = group
                .iter()
                .enumerate()
                .flat_map(|(k, &i)| group.iter().skip(k + 1).map(move |&j| (i, j)))
                .map(|(i, j)| distance(i, j))
                .fold(0.0, f64::max);
            let radius_km = centers.and_then(|c| c.get(cluster_id)).map(|center| {
                group
                    .iter()
                    .filter_map(|&i| points.get(i))
                    .map(|p| haversine(p, center))
                    .fold(0.0, f64::max)
            });
            ClusterSummary {
                cluster_id,
                size: group.len(),
                radius_km,
                diameter_km,
            }
        })
        .collect();

    let occupied = || clusters.iter().filter(|c| c.size > 0);
    Ok(ClusterStatistics {
        num_clusters: clusters.len(),
        sizes: Aggregate::of(occupied().map(|c| c.size as f64)),
        diameters_km: Aggregate::of(occupied().map(|c| c.diameter_km)),
        radii_km: Aggregate::of(occupied().filter_map(|c| c.radius_km)),
        clusters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_by_center_radius;
    use crate::test_support::bay_area_points;
    use rstest::rstest;

    #[rstest]
    fn bay_area_statistics() {
        let points = bay_area_points();
        let clustering = cluster_by_center_radius(&points, 30.0).expect("clustering succeeds");
        let stats = compute_cluster_statistics(
            &points,
            clustering.labels(),
            Some(clustering.centers()),
            None,
        )
        .expect("shapes match");

        assert_eq!(stats.clusters.len(), 2);
        assert_eq!(stats.non_empty(), 2);
        let sizes = stats.sizes.expect("non-empty");
        assert!((sizes.mean - 3.0).abs() < f64::EPSILON);
        for summary in &stats.clusters {
            let radius = summary.radius_km.expect("centers supplied");
            assert!(radius <= 30.0);
            // Triangle inequality through the center.
            assert!(summary.diameter_km <= 2.0 * radius + 1e-9);
        }
    }

    #[rstest]
    fn matrix_and_on_demand_distances_agree() {
        let points = bay_area_points();
        let labels = [0, 1, 0, 0, 1, 1];
        let matrix = DistanceMatrix::from_points(&points);
        let with = compute_cluster_statistics(&points, &labels, None, Some(&matrix))
            .expect("shapes match");
        let without =
            compute_cluster_statistics(&points, &labels, None, None).expect("shapes match");
        assert_eq!(with, without);
        assert_eq!(with.radii_km, None);
    }

    #[rstest]
    fn skipped_ids_are_empty_and_excluded() {
        let points = bay_area_points();
        let labels = [0, 3, 0, 0, 3, 3];
        let stats = compute_cluster_statistics(&points, &labels, None, None).expect("shapes match");
        assert_eq!(stats.num_clusters, 4);
        assert_eq!(stats.non_empty(), 2);
        assert_eq!(stats.clusters.get(1).map(|c| c.size), Some(0));
        let sizes = stats.sizes.expect("non-empty");
        assert!((sizes.min - 3.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn singleton_has_zero_diameter() {
        let points = GeoPoint::from_pairs(&[(1.0, 1.0)]).expect("valid points");
        let stats = compute_cluster_statistics(&points, &[0], Some(&points), None)
            .expect("shapes match");
        let summary = stats.clusters.first().expect("one cluster");
        assert_eq!(summary.diameter_km, 0.0);
        assert_eq!(summary.radius_km, Some(0.0));
    }

    #[rstest]
    fn short_centers_are_rejected() {
        let points = bay_area_points();
        let labels = [0, 1, 0, 0, 1, 1];
        let err = compute_cluster_statistics(&points, &labels, Some(&points[..1]), None)
            .expect_err("label 1 has no center");
        assert!(matches!(
            err,
            ClusterError::InvalidParameter(ParameterError::LabelOutOfRange { label: 1, .. })
        ));
    }

    #[rstest]
    #[case(usize::MAX)]
    #[case(1_000_000_000)]
    #[case(2)]
    fn labels_beyond_point_count_are_rejected(#[case] label: usize) {
        let points = GeoPoint::from_pairs(&[(0.0, 0.0), (0.0, 0.1)]).expect("valid points");
        let err = compute_cluster_statistics(&points, &[0, label], None, None)
            .expect_err("label exceeds the number of points");
        assert_eq!(
            err,
            ClusterError::InvalidParameter(ParameterError::LabelOutOfRange {
                index: 1,
                label,
                clusters: 2,
            })
        );
    }

    #[rstest]
    fn highest_admissible_label_is_accepted() {
        let points = GeoPoint::from_pairs(&[(0.0, 0.0), (0.0, 0.1)]).expect("valid points");
        let stats = compute_cluster_statistics(&points, &[1, 1], None, None)
            .expect("label below point count");
        assert_eq!(stats.num_clusters, 2);
        assert_eq!(stats.non_empty(), 1);
    }

    #[rstest]
    fn aggregate_of_nothing_is_none() {
        assert_eq!(Aggregate::of(std::iter::empty()), None);
        let agg = Aggregate::of([1.0, 2.0, 6.0]).expect("values");
        assert!((agg.mean - 3.0).abs() < f64::EPSILON);
        assert!((agg.min - 1.0).abs() < f64::EPSILON);
        assert!((agg.max - 6.0).abs() < f64::EPSILON);
    }
}
