//! Decision policy, matrix construction and the validation gate.

use std::collections::BTreeSet;

use geocluster_core::{ClusterError, DistanceMatrix, GeoPoint, ParameterError};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::TimeMatrixConfig;
use crate::error::MatrixError;
use crate::fragmentation::fragmentation_score;
use crate::speed::{SpeedEstimate, basic_speed, estimate_speeds};
use crate::trips::{ObservedTrips, TripDistances};

/// Which speed model produced a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixMethod {
    /// One speed for every pair.
    Basic,
    /// Separate intra- and inter-cluster speeds.
    ClusterAware,
}

impl MatrixMethod {
    /// Identifier used in exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::ClusterAware => "cluster_aware",
        }
    }
}

/// Dense symmetric matrix of travel times in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMatrix {
    data: Vec<f64>,
    size: usize,
}

impl TimeMatrix {
    /// Number of points covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the matrix covers no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Travel time from `i` to `j`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        self.data.get(i * self.size + j).copied()
    }

    /// Matrix as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.data.chunks(self.size).map(<[f64]>::to_vec).collect()
    }
}

/// Findings of the validation gate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatrixValidation {
    /// Whether every check passed.
    pub passed: bool,
    /// Description of each failed check.
    pub errors: Vec<String>,
}

/// Inputs to one [`TimeMatrixBuilder::build`] call.
#[derive(Debug, Clone, Copy)]
pub struct TimeMatrixRequest<'a> {
    points: &'a [GeoPoint],
    labels: &'a [usize],
    trips: &'a ObservedTrips,
    distances: Option<TripDistances>,
}

impl<'a> TimeMatrixRequest<'a> {
    /// Request a matrix for `points` labelled by `labels`, calibrated on
    /// `trips`.
    #[must_use]
    pub const fn new(
        points: &'a [GeoPoint],
        labels: &'a [usize],
        trips: &'a ObservedTrips,
    ) -> Self {
        Self {
            points,
            labels,
            trips,
            distances: None,
        }
    }

    /// Use explicit road-adjusted totals instead of deriving them from the
    /// observed legs.
    #[must_use]
    pub const fn with_distances(mut self, distances: TripDistances) -> Self {
        self.distances = Some(distances);
        self
    }
}

/// Matrix plus everything needed to audit how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMatrixResult {
    pub(crate) method: MatrixMethod,
    pub(crate) fragmentation_score: f64,
    pub(crate) num_clusters: usize,
    pub(crate) speed_intra: f64,
    pub(crate) speed_inter: f64,
    pub(crate) road_factor: f64,
    pub(crate) estimate: Option<SpeedEstimate>,
    pub(crate) matrix: TimeMatrix,
    pub(crate) labels: Vec<usize>,
    pub(crate) validation: MatrixValidation,
}

impl TimeMatrixResult {
    /// Speed model used.
    #[must_use]
    pub const fn method(&self) -> MatrixMethod {
        self.method
    }

    /// Fragmentation score of the labeling.
    #[must_use]
    pub const fn fragmentation_score(&self) -> f64 {
        self.fragmentation_score
    }

    /// Number of distinct labels.
    #[must_use]
    pub const fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Intra-cluster speed in km/min (the single speed for the basic method).
    #[must_use]
    pub const fn speed_intra(&self) -> f64 {
        self.speed_intra
    }

    /// Inter-cluster speed in km/min (the single speed for the basic method).
    #[must_use]
    pub const fn speed_inter(&self) -> f64 {
        self.speed_inter
    }

    /// Road circuity factor applied.
    #[must_use]
    pub const fn road_factor(&self) -> f64 {
        self.road_factor
    }

    /// Speed-ratio search outcome, when the search ran.
    #[must_use]
    pub const fn estimate(&self) -> Option<SpeedEstimate> {
        self.estimate
    }

    /// Travel times in minutes.
    #[must_use]
    pub const fn matrix(&self) -> &TimeMatrix {
        &self.matrix
    }

    /// Labels the matrix was built for.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Validation gate findings.
    #[must_use]
    pub const fn validation(&self) -> &MatrixValidation {
        &self.validation
    }
}

/// Builds cluster-aware travel-time matrices.
#[derive(Debug, Clone, Default)]
pub struct TimeMatrixBuilder {
    config: TimeMatrixConfig,
}

impl TimeMatrixBuilder {
    /// Construct a builder using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a builder with explicit configuration.
    #[must_use]
    pub const fn with_config(config: TimeMatrixConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &TimeMatrixConfig {
        &self.config
    }

    /// Build and validate a travel-time matrix.
    ///
    /// Labelings whose fragmentation score is below the configured threshold
    /// use a single speed. Otherwise speeds are estimated per cluster
    /// relation; when the resulting ratio is below the configured minimum
    /// the distinction is dropped and a single speed is used, with a logged
    /// warning. Validation failures are recorded in the result and never
    /// abort the build.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError`] for an invalid configuration, empty or
    /// mismatched inputs, out-of-range legs, or an unusable budget or
    /// distance total.
    pub fn build(&self, request: &TimeMatrixRequest<'_>) -> Result<TimeMatrixResult, MatrixError> {
        self.config.validate()?;
        let TimeMatrixRequest {
            points,
            labels,
            trips,
            distances,
        } = *request;
        check_shapes(points, labels)?;
        trips.validate_budget()?;
        trips.check_legs(points.len())?;

        let distances = match distances {
            Some(explicit) => explicit,
            None if trips.legs.is_empty() => return Err(MatrixError::NoObservedDistance),
            None => trips.distances(points, labels, self.config.road_factor)?,
        };

        let distance_matrix = DistanceMatrix::from_points(points);
        let score = fragmentation_score(labels, &distance_matrix)?;
        let num_clusters = labels.iter().collect::<BTreeSet<_>>().len();

        let (method, speed_intra, speed_inter, estimate) =
            self.choose_speeds(score, trips.budget_minutes, distances)?;
        info!(
            "building {} time matrix for {} points in {num_clusters} clusters \
             (fragmentation {score:.3}, intra {speed_intra:.3} km/min, inter {speed_inter:.3} km/min)",
            method.as_str(),
            points.len()
        );

        let matrix = fill_matrix(
            &distance_matrix,
            labels,
            self.config.road_factor,
            speed_intra,
            speed_inter,
        );
        let validation = Gate {
            config: &self.config,
            matrix: &matrix,
            labels,
            trips,
            distances,
            speeds: (speed_intra, speed_inter),
            method,
        }
        .run();
        if !validation.passed {
            for error in &validation.errors {
                warn!("time matrix validation: {error}");
            }
        }

        Ok(TimeMatrixResult {
            method,
            fragmentation_score: score,
            num_clusters,
            speed_intra,
            speed_inter,
            road_factor: self.config.road_factor,
            estimate,
            matrix,
            labels: labels.to_vec(),
            validation,
        })
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "the speed ratio is a floating-point quotient"
    )]
    fn choose_speeds(
        &self,
        score: f64,
        budget_minutes: f64,
        distances: TripDistances,
    ) -> Result<(MatrixMethod, f64, f64, Option<SpeedEstimate>), MatrixError> {
        if score < self.config.fragmentation_threshold {
            let speed = basic_speed(budget_minutes, distances)?;
            return Ok((MatrixMethod::Basic, speed, speed, None));
        }

        let estimate = estimate_speeds(budget_minutes, distances, &self.config)?;
        let ratio = estimate.inter() / estimate.intra();
        if ratio < self.config.min_speed_ratio {
            warn!(
                "speed ratio {ratio:.3} is below {}; using a single speed",
                self.config.min_speed_ratio
            );
            let speed = basic_speed(budget_minutes, distances)?;
            return Ok((MatrixMethod::Basic, speed, speed, Some(estimate)));
        }
        Ok((
            MatrixMethod::ClusterAware,
            estimate.intra(),
            estimate.inter(),
            Some(estimate),
        ))
    }
}

fn check_shapes(points: &[GeoPoint], labels: &[usize]) -> Result<(), ClusterError> {
    if points.is_empty() {
        return Err(ParameterError::EmptyInput.into());
    }
    if labels.len() != points.len() {
        return Err(ParameterError::LengthMismatch {
            what: "labels",
            expected: points.len(),
            found: labels.len(),
        }
        .into());
    }
    Ok(())
}

/// Fill the upper triangle and mirror it so the matrix is exactly symmetric.
#[expect(
    clippy::float_arithmetic,
    reason = "travel times are road distances divided by speeds"
)]
fn fill_matrix(
    distances: &DistanceMatrix,
    labels: &[usize],
    road_factor: f64,
    speed_intra: f64,
    speed_inter: f64,
) -> TimeMatrix {
    let size = distances.len();
    let mut data = vec![0.0; size * size];
    for (i, a) in labels.iter().enumerate() {
        for (j, b) in labels.iter().enumerate().skip(i + 1) {
            let Some(d) = distances.get(i, j) else {
                continue;
            };
            let speed = if a == b { speed_intra } else { speed_inter };
            let minutes = d * road_factor / speed;
            if let Some(cell) = data.get_mut(i * size + j) {
                *cell = minutes;
            }
            if let Some(cell) = data.get_mut(j * size + i) {
                *cell = minutes;
            }
        }
    }
    TimeMatrix { data, size }
}

/// Checks a built matrix must pass before it is considered usable.
struct Gate<'a> {
    config: &'a TimeMatrixConfig,
    matrix: &'a TimeMatrix,
    labels: &'a [usize],
    trips: &'a ObservedTrips,
    distances: TripDistances,
    speeds: (f64, f64),
    method: MatrixMethod,
}

impl Gate<'_> {
    fn run(&self) -> MatrixValidation {
        let mut errors = Vec::new();
        self.check_entries(&mut errors);
        self.check_budget(&mut errors);
        if self.method == MatrixMethod::ClusterAware {
            self.check_separation(&mut errors);
        }
        MatrixValidation {
            passed: errors.is_empty(),
            errors,
        }
    }

    fn check_entries(&self, errors: &mut Vec<String>) {
        let size = self.matrix.len();
        for i in 0..size {
            for j in (i + 1)..size {
                let (Some(forward), Some(backward)) = (self.matrix.get(i, j), self.matrix.get(j, i))
                else {
                    continue;
                };
                if !(forward.is_finite() && forward > 0.0) {
                    errors.push(format!(
                        "travel time between points {i} and {j} is {forward} min; expected a positive value"
                    ));
                }
                if forward.to_bits() != backward.to_bits() {
                    errors.push(format!(
                        "travel time between points {i} and {j} is asymmetric ({forward} vs {backward} min)"
                    ));
                }
            }
        }
    }

    /// Reconcile implied trip time with the observed budget.
    ///
    /// Uses the observed legs when there are any, otherwise the aggregate
    /// distances.
    #[expect(
        clippy::float_arithmetic,
        reason = "budget reconciliation sums floating-point times"
    )]
    fn check_budget(&self, errors: &mut Vec<String>) {
        let budget = self.trips.budget_minutes;
        let implied = if self.trips.legs.is_empty() {
            let (intra, inter) = self.speeds;
            self.distances.intra_km / intra + self.distances.inter_km / inter
        } else {
            self.trips
                .legs
                .iter()
                .filter_map(|&(from, to)| self.matrix.get(from, to))
                .sum()
        };
        let deviation = (implied - budget).abs() / budget;
        if deviation > self.config.budget_tolerance {
            errors.push(format!(
                "observed trips take {implied:.1} min against a budget of {budget:.1} min \
                 ({:.1}% off, tolerance {:.1}%)",
                deviation * 100.0,
                self.config.budget_tolerance * 100.0
            ));
        }
    }

    /// Require inter-cluster travel to take clearly longer than intra-cluster
    /// travel on average.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "mean travel times are floating-point averages"
    )]
    fn check_separation(&self, errors: &mut Vec<String>) {
        let mut intra = (0.0, 0_usize);
        let mut inter = (0.0, 0_usize);
        for (i, a) in self.labels.iter().enumerate() {
            for (j, b) in self.labels.iter().enumerate().skip(i + 1) {
                let Some(t) = self.matrix.get(i, j) else {
                    continue;
                };
                let bucket = if a == b { &mut intra } else { &mut inter };
                bucket.0 += t;
                bucket.1 += 1;
            }
        }
        if intra.1 == 0 || inter.1 == 0 {
            return;
        }
        let mean_intra = intra.0 / intra.1 as f64;
        let mean_inter = inter.0 / inter.1 as f64;
        let required = self.config.min_inter_intra_time_ratio;
        if mean_inter <= required * mean_intra {
            errors.push(format!(
                "mean inter-cluster time {mean_inter:.2} min is not more than {required}x the mean \
                 intra-cluster time {mean_intra:.2} min; the clustering may be too fine-grained"
            ));
        }
    }
}
