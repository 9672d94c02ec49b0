//! Behavioural tests for `TimeMatrixBuilder` using rstest-bdd.

use std::cell::RefCell;

use geocluster_core::test_support::bay_area_points;
use geocluster_core::{GeoPoint, cluster_by_center_radius};
use geocluster_matrix::{
    MatrixMethod, ObservedTrips, TimeMatrixBuilder, TimeMatrixExport, TimeMatrixRequest,
    TimeMatrixResult,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// San Francisco, Oakland, Berkeley, Fremont, San Jose, Palo Alto.
const TOUR: [(usize, usize); 5] = [(0, 2), (2, 3), (3, 5), (5, 1), (1, 4)];

#[derive(Debug, Default)]
struct MatrixWorld {
    points: RefCell<Vec<GeoPoint>>,
    labels: RefCell<Vec<usize>>,
    trips: RefCell<Option<ObservedTrips>>,
    result: RefCell<Option<TimeMatrixResult>>,
    export: RefCell<Option<TimeMatrixExport>>,
}

impl MatrixWorld {
    fn result(&self) -> TimeMatrixResult {
        self.result
            .borrow()
            .clone()
            .unwrap_or_else(|| panic!("the matrix must be built before assertions"))
    }
}

#[fixture]
fn world() -> MatrixWorld {
    MatrixWorld::default()
}

#[given("the Bay Area cities in two clusters")]
fn given_two_clusters(world: &MatrixWorld) {
    let points = bay_area_points();
    let clustering = cluster_by_center_radius(&points, 30.0)
        .unwrap_or_else(|err| panic!("clustering should succeed: {err}"));
    world.labels.replace(clustering.labels().to_vec());
    world.points.replace(points);
}

#[given("the Bay Area cities in one cluster")]
fn given_one_cluster(world: &MatrixWorld) {
    let points = bay_area_points();
    world.labels.replace(vec![0; points.len()]);
    world.points.replace(points);
}

#[given("a 180 minute tour through every city")]
fn given_long_tour(world: &MatrixWorld) {
    world
        .trips
        .replace(Some(ObservedTrips::new(180.0, TOUR.to_vec())));
}

#[given("a 60 minute tour through every city")]
fn given_short_tour(world: &MatrixWorld) {
    world
        .trips
        .replace(Some(ObservedTrips::new(60.0, TOUR.to_vec())));
}

#[when("I build the time matrix")]
fn when_build(world: &MatrixWorld) {
    let points = world.points.borrow();
    let labels = world.labels.borrow();
    let trips = world.trips.borrow();
    let trips = trips
        .as_ref()
        .unwrap_or_else(|| panic!("observed trips must be set"));
    let result = TimeMatrixBuilder::new()
        .build(&TimeMatrixRequest::new(&points, &labels, trips))
        .unwrap_or_else(|err| panic!("build should succeed: {err}"));
    world.result.replace(Some(result));
}

#[when("I export it for representative rep-1")]
fn when_export(world: &MatrixWorld) {
    let ids = (0..world.points.borrow().len())
        .map(|i| format!("store-{i}"))
        .collect();
    let export = world
        .result()
        .to_export("rep-1", ids)
        .unwrap_or_else(|err| panic!("export should succeed: {err}"));
    world.export.replace(Some(export));
}

#[then("the cluster-aware method is used")]
fn then_cluster_aware(world: &MatrixWorld) {
    assert_eq!(world.result().method(), MatrixMethod::ClusterAware);
}

#[then("the basic method is used")]
fn then_basic(world: &MatrixWorld) {
    let result = world.result();
    assert_eq!(result.method(), MatrixMethod::Basic);
    assert!((result.speed_intra() - result.speed_inter()).abs() < f64::EPSILON);
}

#[then("the speed ratio 1.3 is accepted")]
fn then_bounded(world: &MatrixWorld) {
    let estimate = world
        .result()
        .estimate()
        .unwrap_or_else(|| panic!("the speed search should run"));
    assert!(!estimate.is_fallback());
    assert!((estimate.alpha() - 1.3).abs() < f64::EPSILON);
}

#[then("the fallback speed ratio 1.6 is used")]
fn then_fallback(world: &MatrixWorld) {
    let estimate = world
        .result()
        .estimate()
        .unwrap_or_else(|| panic!("the speed search should run"));
    assert!(estimate.is_fallback());
    assert!((estimate.alpha() - 1.6).abs() < f64::EPSILON);
}

#[then("the matrix is symmetric with positive off-diagonal times")]
fn then_symmetric(world: &MatrixWorld) {
    let result = world.result();
    let matrix = result.matrix();
    for i in 0..matrix.len() {
        for j in (i + 1)..matrix.len() {
            let forward = matrix.get(i, j).unwrap_or_default();
            assert!(forward > 0.0);
            assert_eq!(matrix.get(j, i), Some(forward));
        }
    }
}

#[then("the validation gate passes")]
fn then_passes(world: &MatrixWorld) {
    let result = world.result();
    assert!(
        result.validation().passed,
        "errors: {:?}",
        result.validation().errors
    );
}

#[then("the validation gate reports a fine-grained clustering")]
fn then_fine_grained(world: &MatrixWorld) {
    let result = world.result();
    assert!(!result.validation().passed);
    assert!(
        result
            .validation()
            .errors
            .iter()
            .any(|e| e.contains("too fine-grained"))
    );
}

#[then("the export lists six store ids and two clusters")]
fn then_export(world: &MatrixWorld) {
    let export = world
        .export
        .borrow()
        .clone()
        .unwrap_or_else(|| panic!("the matrix must be exported"));
    assert_eq!(export.representative_id, "rep-1");
    assert_eq!(export.store_ids.len(), 6);
    assert_eq!(export.num_clusters, 2);
    assert_eq!(export.cluster_assignments, vec![0, 1, 0, 0, 1, 1]);
    assert_eq!(export.time_matrix.len(), 6);
}

#[scenario(path = "tests/features/time_matrix.feature", index = 0)]
fn bounded_speeds(world: MatrixWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/time_matrix.feature", index = 1)]
fn fallback_ratio(world: MatrixWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/time_matrix.feature", index = 2)]
fn single_cluster(world: MatrixWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/time_matrix.feature", index = 3)]
fn export_fields(world: MatrixWorld) {
    let _ = world;
}
