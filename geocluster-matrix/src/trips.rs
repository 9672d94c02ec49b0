//! Observed trips and the road distances they imply.

use geocluster_core::{ClusterError, GeoPoint, ParameterError, haversine};
use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

/// Road-adjusted distance travelled within and between clusters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TripDistances {
    /// Total distance of legs whose endpoints share a cluster (km).
    pub intra_km: f64,
    /// Total distance of legs crossing a cluster boundary (km).
    pub inter_km: f64,
}

impl TripDistances {
    /// Construct from explicit totals.
    #[must_use]
    pub const fn new(intra_km: f64, inter_km: f64) -> Self {
        Self { intra_km, inter_km }
    }

    pub(crate) fn validate(&self) -> Result<(), MatrixError> {
        let valid = |d: f64| d.is_finite() && d >= 0.0;
        if valid(self.intra_km) && valid(self.inter_km) && (self.intra_km > 0.0 || self.inter_km > 0.0)
        {
            Ok(())
        } else {
            Err(MatrixError::InvalidDistances {
                intra_km: self.intra_km,
                inter_km: self.inter_km,
            })
        }
    }
}

/// Legs travelled by one territory during the observation window.
///
/// Each leg is an ordered `(from, to)` pair of point indices. The whole set
/// took `budget_minutes` to drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedTrips {
    /// Total observed travel time in minutes.
    pub budget_minutes: f64,
    /// Travelled legs as point-index pairs.
    #[serde(default)]
    pub legs: Vec<(usize, usize)>,
}

impl ObservedTrips {
    /// Construct from a budget and legs.
    #[must_use]
    pub const fn new(budget_minutes: f64, legs: Vec<(usize, usize)>) -> Self {
        Self {
            budget_minutes,
            legs,
        }
    }

    /// Reject budgets that are not positive and finite.
    pub(crate) fn validate_budget(&self) -> Result<(), MatrixError> {
        if self.budget_minutes.is_finite() && self.budget_minutes > 0.0 {
            Ok(())
        } else {
            Err(MatrixError::InvalidBudget {
                value: self.budget_minutes,
            })
        }
    }

    /// Check every leg references a point in `0..len`.
    pub(crate) fn check_legs(&self, len: usize) -> Result<(), MatrixError> {
        for (leg, &(from, to)) in self.legs.iter().enumerate() {
            for index in [from, to] {
                if index >= len {
                    return Err(MatrixError::LegOutOfRange { leg, index, len });
                }
            }
        }
        Ok(())
    }

    /// Sum road distances of the legs, split by whether each leg stays in
    /// one cluster.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::LegOutOfRange`] for a leg outside `points`, or
    /// a wrapped [`ClusterError`] when `labels` does not match `points`.
    #[expect(
        clippy::float_arithmetic,
        reason = "distances are accumulated in floating point"
    )]
    pub fn distances(
        &self,
        points: &[GeoPoint],
        labels: &[usize],
        road_factor: f64,
    ) -> Result<TripDistances, MatrixError> {
        if labels.len() != points.len() {
            return Err(ClusterError::from(ParameterError::LengthMismatch {
                what: "labels",
                expected: points.len(),
                found: labels.len(),
            })
            .into());
        }
        self.check_legs(points.len())?;

        let mut totals = TripDistances::default();
        for &(from, to) in &self.legs {
            let (Some(a), Some(b)) = (points.get(from), points.get(to)) else {
                continue;
            };
            let road_km = haversine(a, b) * road_factor;
            if labels.get(from) == labels.get(to) {
                totals.intra_km += road_km;
            } else {
                totals.inter_km += road_km;
            }
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocluster_core::test_support::bay_area_points;
    use rstest::rstest;

    #[rstest]
    fn legs_are_split_by_cluster() {
        let points = bay_area_points();
        let labels = [0, 1, 0, 0, 1, 1];
        // San Francisco to Oakland stays in cluster 0; Berkeley to Fremont crosses.
        let trips = ObservedTrips::new(60.0, vec![(0, 2), (3, 5)]);
        let totals = trips.distances(&points, &labels, 1.4).expect("valid legs");
        let sf_oakland = haversine(&points[0], &points[2]) * 1.4;
        let berkeley_fremont = haversine(&points[3], &points[5]) * 1.4;
        assert!((totals.intra_km - sf_oakland).abs() < 1e-9);
        assert!((totals.inter_km - berkeley_fremont).abs() < 1e-9);
    }

    #[rstest]
    fn out_of_range_leg_is_rejected() {
        let points = bay_area_points();
        let trips = ObservedTrips::new(60.0, vec![(0, 1), (2, 9)]);
        let err = trips
            .distances(&points, &[0; 6], 1.4)
            .expect_err("leg 1 is out of range");
        assert!(matches!(
            err,
            MatrixError::LegOutOfRange {
                leg: 1,
                index: 9,
                len: 6
            }
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::INFINITY)]
    fn invalid_budget_is_rejected(#[case] budget: f64) {
        let trips = ObservedTrips::new(budget, Vec::new());
        assert!(trips.validate_budget().is_err());
    }

    #[rstest]
    fn zero_distances_are_rejected() {
        assert!(TripDistances::new(0.0, 0.0).validate().is_err());
        assert!(TripDistances::new(0.0, 5.0).validate().is_ok());
    }
}
