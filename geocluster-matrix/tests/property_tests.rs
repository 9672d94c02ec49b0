//! Property-based tests for the time matrix builder.
//!
//! # Invariants tested
//!
//! - **Symmetry:** `t(i, j) == t(j, i)` bitwise for every pair.
//! - **Positivity:** off-diagonal times are positive for distinct points.
//! - **Budget reconciliation:** observed legs sum to the budget within
//!   tolerance whenever the speeds come from the legs themselves.

use geocluster_core::{GeoPoint, cluster_by_center_radius};
use geocluster_matrix::{ObservedTrips, TimeMatrixBuilder, TimeMatrixRequest};
use proptest::prelude::*;

/// Distinct points on a grid, jittered, so no two coincide.
fn points_strategy() -> impl Strategy<Value = Vec<GeoPoint>> {
    prop::collection::vec((0.0_f64..0.009, 0.0_f64..0.009), 2..30).prop_map(|jitter| {
        jitter
            .into_iter()
            .enumerate()
            .filter_map(|(i, (dlat, dlon))| {
                let row = f64::from(u32::try_from(i / 6).unwrap_or_default());
                let col = f64::from(u32::try_from(i % 6).unwrap_or_default());
                GeoPoint::new(37.0 + row * 0.1 + dlat, -122.5 + col * 0.1 + dlon).ok()
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matrix_is_symmetric_positive_and_reconciled(
        points in points_strategy(),
        bound in 5.0_f64..40.0,
        budget in 30.0_f64..600.0,
    ) {
        let clustering = cluster_by_center_radius(&points, bound).expect("valid input");
        let legs: Vec<(usize, usize)> = (1..points.len()).map(|i| (i - 1, i)).collect();
        let trips = ObservedTrips::new(budget, legs);
        let result = TimeMatrixBuilder::new()
            .build(&TimeMatrixRequest::new(&points, clustering.labels(), &trips))
            .expect("build succeeds");

        let matrix = result.matrix();
        for i in 0..matrix.len() {
            for j in (i + 1)..matrix.len() {
                let forward = matrix.get(i, j).expect("in range");
                let backward = matrix.get(j, i).expect("in range");
                prop_assert_eq!(forward.to_bits(), backward.to_bits());
                prop_assert!(forward > 0.0);
            }
        }
        prop_assert!(
            !result
                .validation()
                .errors
                .iter()
                .any(|e| e.contains("against a budget")),
            "errors: {:?}",
            result.validation().errors
        );
    }
}
