//! Constraint validators for produced or externally supplied labelings.
//!
//! Validation is strict and boolean: a labeling either satisfies its bound
//! (within the tolerance) or the report lists every offending measurement.
//! The validators are pure and accept any labeling of the right shape, so
//! they double as audit tools for clusterings produced elsewhere.

use std::collections::BTreeMap;
use std::fmt;

use crate::distance::haversine;
use crate::error::{ClusterError, ParameterError, check_labels, check_max_distance, check_tolerance};
use crate::point::GeoPoint;

/// Default numerical tolerance in kilometres.
pub const DEFAULT_TOLERANCE_KM: f64 = 1e-6;

/// One measurement that exceeded the bound plus tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    /// Offending point.
    pub point_index: usize,
    /// Cluster the point is labelled with.
    pub cluster_id: usize,
    /// Measured distance in kilometres.
    pub distance_km: f64,
    /// Partner point for pairwise (diameter) violations.
    pub other_index: Option<usize>,
    /// Bound the measurement was checked against.
    pub max_distance_km: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.other_index {
            Some(other) => write!(
                f,
                "cluster {}, points {}-{}: distance {:.3} km > D={} km",
                self.cluster_id, other, self.point_index, self.distance_km, self.max_distance_km
            ),
            None => write!(
                f,
                "cluster {}, point {}: distance {:.3} km > D={} km",
                self.cluster_id, self.point_index, self.distance_km, self.max_distance_km
            ),
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Whether no violations were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in point order (pairs ordered by their later point).
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Human-readable violation messages.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Check that every point lies within `max_distance_km` of its center.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidParameter`] when `labels` does not match
/// `points`, a label has no center, or the bound or tolerance is invalid.
///
/// # Examples
///
/// ```
/// use geocluster_core::{GeoPoint, validate_center_radius};
///
/// # fn main() -> Result<(), geocluster_core::ClusterError> {
/// let points = GeoPoint::from_pairs(&[(0.0, 0.0), (0.0, 1.0)])?;
/// let report = validate_center_radius(&points, &[0, 0], &points[..1], 50.0, 1e-6)?;
/// assert!(!report.is_valid());
/// assert_eq!(report.violations()[0].point_index, 1);
/// # Ok(())
/// # }
/// ```
pub fn validate_center_radius(
    points: &[GeoPoint],
    labels: &[usize],
    centers: &[GeoPoint],
    max_distance_km: f64,
    tolerance_km: f64,
) -> Result<ValidationReport, ClusterError> {
    check_max_distance(max_distance_km)?;
    check_tolerance(tolerance_km)?;
    check_labels(points.len(), labels.len())?;

    let mut violations = Vec::new();
    for (point_index, (point, &cluster_id)) in points.iter().zip(labels).enumerate() {
        let center = centers
            .get(cluster_id)
            .ok_or(ParameterError::LabelOutOfRange {
                index: point_index,
                label: cluster_id,
                clusters: centers.len(),
            })?;
        let distance_km = haversine(point, center);
        if distance_km > max_distance_km + tolerance_km {
            violations.push(Violation {
                point_index,
                cluster_id,
                distance_km,
                other_index: None,
                max_distance_km,
            });
        }
    }
    Ok(ValidationReport { violations })
}

/// Check that no two points sharing a label are more than
/// `max_distance_km` apart.
///
/// Labels need not be contiguous. Each offending pair is reported once,
/// against its later point, with the earlier point as `other_index`.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidParameter`] when `labels` does not match
/// `points` or the bound or tolerance is invalid.
pub fn validate_diameter(
    points: &[GeoPoint],
    labels: &[usize],
    max_distance_km: f64,
    tolerance_km: f64,
) -> Result<ValidationReport, ClusterError> {
    check_max_distance(max_distance_km)?;
    check_tolerance(tolerance_km)?;
    check_labels(points.len(), labels.len())?;

    let mut seen: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut violations = Vec::new();
    for (point_index, (point, &cluster_id)) in points.iter().zip(labels).enumerate() {
        let earlier = seen.entry(cluster_id).or_default();
        for &other in earlier.iter() {
            let Some(other_point) = points.get(other) else {
                continue;
            };
            let distance_km = haversine(other_point, point);
            if distance_km > max_distance_km + tolerance_km {
                violations.push(Violation {
                    point_index,
                    cluster_id,
                    distance_km,
                    other_index: Some(other),
                    max_distance_km,
                });
            }
        }
        earlier.push(point_index);
    }
    Ok(ValidationReport { violations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn line() -> Vec<GeoPoint> {
        // Points one degree of longitude (~111 km) apart on the equator.
        GeoPoint::from_pairs(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]).expect("valid points")
    }

    #[rstest]
    fn center_radius_flags_distant_members(line: Vec<GeoPoint>) {
        let centers = &line[..1];
        let report =
            validate_center_radius(&line, &[0, 0, 0], centers, 150.0, DEFAULT_TOLERANCE_KM)
                .expect("shapes match");
        assert!(!report.is_valid());
        assert_eq!(report.violations().len(), 1);
        let violation = report.violations().first().expect("one violation");
        assert_eq!(violation.point_index, 2);
        assert_eq!(violation.cluster_id, 0);
        assert!(violation.distance_km > 222.0);
    }

    #[rstest]
    fn center_radius_accepts_valid_labeling(line: Vec<GeoPoint>) {
        let report =
            validate_center_radius(&line, &[0, 1, 2], &line, 1.0, DEFAULT_TOLERANCE_KM)
                .expect("shapes match");
        assert!(report.is_valid());
    }

    #[rstest]
    fn tolerance_absorbs_boundary_noise(line: Vec<GeoPoint>) {
        let exact = haversine(&line[0], &line[1]);
        let report = validate_center_radius(&line[..2], &[0, 0], &line[..1], exact - 1e-9, 1e-6)
            .expect("shapes match");
        assert!(report.is_valid());
        let strict = validate_center_radius(&line[..2], &[0, 0], &line[..1], exact - 1e-3, 1e-6)
            .expect("shapes match");
        assert!(!strict.is_valid());
    }

    #[rstest]
    fn diameter_reports_each_pair_once(line: Vec<GeoPoint>) {
        let report = validate_diameter(&line, &[0, 0, 0], 150.0, DEFAULT_TOLERANCE_KM)
            .expect("shapes match");
        assert_eq!(report.violations().len(), 1);
        let violation = report.violations().first().expect("one violation");
        assert_eq!(violation.point_index, 2);
        assert_eq!(violation.other_index, Some(0));
    }

    #[rstest]
    fn diameter_accepts_non_contiguous_labels(line: Vec<GeoPoint>) {
        let report = validate_diameter(&line, &[7, 3, 11], 1.0, DEFAULT_TOLERANCE_KM)
            .expect("shapes match");
        assert!(report.is_valid());
    }

    #[rstest]
    fn validation_is_idempotent(line: Vec<GeoPoint>) {
        let first = validate_diameter(&line, &[0, 0, 0], 100.0, DEFAULT_TOLERANCE_KM)
            .expect("shapes match");
        let second = validate_diameter(&line, &[0, 0, 0], 100.0, DEFAULT_TOLERANCE_KM)
            .expect("shapes match");
        assert_eq!(first, second);
    }

    #[rstest]
    fn messages_name_cluster_and_points(line: Vec<GeoPoint>) {
        let report = validate_diameter(&line, &[0, 0, 0], 150.0, DEFAULT_TOLERANCE_KM)
            .expect("shapes match");
        let message = report.messages().pop().expect("one message");
        assert!(message.starts_with("cluster 0, points 0-2: distance 222."));
        assert!(message.ends_with("> D=150 km"));
    }

    #[rstest]
    fn mismatched_labels_are_rejected(line: Vec<GeoPoint>) {
        let err = validate_diameter(&line, &[0, 0], 10.0, DEFAULT_TOLERANCE_KM)
            .expect_err("labels too short");
        assert!(matches!(
            err,
            ClusterError::InvalidParameter(ParameterError::LengthMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[rstest]
    fn labels_without_centers_are_rejected(line: Vec<GeoPoint>) {
        let err = validate_center_radius(&line, &[0, 1, 5], &line, 10.0, DEFAULT_TOLERANCE_KM)
            .expect_err("label 5 has no center");
        assert!(matches!(
            err,
            ClusterError::InvalidParameter(ParameterError::LabelOutOfRange { label: 5, .. })
        ));
    }
}
