//! Fragmentation score of a labeling.

use std::collections::BTreeSet;

use geocluster_core::{ClusterError, DistanceMatrix, ParameterError};

use crate::error::MatrixError;

/// Score how geographically split a labeling is.
///
/// The score is `(k / n) × (max inter-cluster distance / mean intra-cluster
/// distance)` where `k` is the number of distinct labels and `n` the number
/// of points. A single cluster scores 0. When no intra-cluster pair has a
/// positive mean distance (every cluster is a singleton or a stack of
/// identical points) the distance ratio is taken as 1.
///
/// # Errors
///
/// Returns a wrapped [`ClusterError`] when `labels` and `matrix` disagree in
/// size.
///
/// # Examples
///
/// ```
/// use geocluster_core::{DistanceMatrix, GeoPoint};
/// use geocluster_matrix::fragmentation_score;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let points = GeoPoint::from_pairs(&[(0.0, 0.0), (0.0, 0.1), (0.0, 1.0)])?;
/// let matrix = DistanceMatrix::from_points(&points);
/// assert_eq!(fragmentation_score(&[0, 0, 0], &matrix)?, 0.0);
/// assert!(fragmentation_score(&[0, 0, 1], &matrix)? > 1.0);
/// # Ok(())
/// # }
/// ```
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "the score is a floating-point ratio of counts and distances"
)]
pub fn fragmentation_score(labels: &[usize], matrix: &DistanceMatrix) -> Result<f64, MatrixError> {
    if labels.len() != matrix.len() {
        return Err(ClusterError::from(ParameterError::LengthMismatch {
            what: "labels",
            expected: matrix.len(),
            found: labels.len(),
        })
        .into());
    }
    let clusters = labels.iter().collect::<BTreeSet<_>>().len();
    if clusters <= 1 {
        return Ok(0.0);
    }

    let mut max_inter = 0.0_f64;
    let mut intra_sum = 0.0_f64;
    let mut intra_pairs = 0_usize;
    for (i, a) in labels.iter().enumerate() {
        for (j, b) in labels.iter().enumerate().skip(i + 1) {
            let Some(d) = matrix.get(i, j) else {
                continue;
            };
            if a == b {
                intra_sum += d;
                intra_pairs += 1;
            } else {
                max_inter = max_inter.max(d);
            }
        }
    }

    let mean_intra = if intra_pairs == 0 {
        0.0
    } else {
        intra_sum / intra_pairs as f64
    };
    let ratio = if mean_intra > 0.0 {
        max_inter / mean_intra
    } else {
        1.0
    };
    Ok(clusters as f64 / labels.len() as f64 * ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocluster_core::test_support::bay_area_points;
    use rstest::rstest;

    #[rstest]
    fn bay_area_is_strongly_fragmented() {
        let points = bay_area_points();
        let matrix = DistanceMatrix::from_points(&points);
        let score = fragmentation_score(&[0, 1, 0, 0, 1, 1], &matrix).expect("shapes match");
        // (2 / 6) × (68.4 km / 17.7 km)
        assert!((score - 1.29).abs() < 0.02, "score was {score}");
    }

    #[rstest]
    fn single_cluster_scores_zero() {
        let points = bay_area_points();
        let matrix = DistanceMatrix::from_points(&points);
        let score = fragmentation_score(&[0; 6], &matrix).expect("shapes match");
        assert_eq!(score, 0.0);
    }

    #[rstest]
    fn singletons_use_unit_ratio() {
        let points = bay_area_points();
        let matrix = DistanceMatrix::from_points(&points);
        let score = fragmentation_score(&[0, 1, 2, 3, 4, 5], &matrix).expect("shapes match");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn mismatched_labels_are_rejected() {
        let points = bay_area_points();
        let matrix = DistanceMatrix::from_points(&points);
        assert!(fragmentation_score(&[0, 1], &matrix).is_err());
    }
}
