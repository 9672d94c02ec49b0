//! Builder configuration with validated defaults.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

/// Accepted range for the road circuity factor.
pub const ROAD_FACTOR_RANGE: RangeInclusive<f64> = 1.3..=1.6;

/// Speed ratios tried, in order, when estimating intra and inter speeds.
pub const DEFAULT_ALPHA_CANDIDATES: [f64; 5] = [1.3, 1.5, 1.7, 2.0, 2.2];

/// Inclusive range of realistic speeds in km/min.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBounds {
    /// Slowest realistic speed.
    pub min: f64,
    /// Fastest realistic speed.
    pub max: f64,
}

impl SpeedBounds {
    /// Construct bounds from a minimum and maximum speed.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `speed` lies within the bounds.
    #[must_use]
    pub fn contains(&self, speed: f64) -> bool {
        (self.min..=self.max).contains(&speed)
    }

    fn validate(&self, field: &'static str) -> Result<(), MatrixError> {
        if !(self.min.is_finite() && self.min > 0.0) {
            return Err(MatrixError::InvalidConfig {
                field,
                value: self.min,
            });
        }
        if !(self.max.is_finite() && self.max >= self.min) {
            return Err(MatrixError::InvalidConfig {
                field,
                value: self.max,
            });
        }
        Ok(())
    }
}

/// Configuration for [`TimeMatrixBuilder`](crate::TimeMatrixBuilder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeMatrixConfig {
    /// Multiplier from great-circle to road distance.
    pub road_factor: f64,
    /// Inter/intra speed ratios tried in order.
    pub alpha_candidates: Vec<f64>,
    /// Realistic speeds within a cluster (km/min).
    pub intra_speed: SpeedBounds,
    /// Realistic speeds between clusters (km/min).
    pub inter_speed: SpeedBounds,
    /// Ratio used when no candidate yields realistic speeds.
    pub fallback_alpha: f64,
    /// Fragmentation below which a single speed is used.
    pub fragmentation_threshold: f64,
    /// Speed ratio below which the cluster-aware model is abandoned.
    pub min_speed_ratio: f64,
    /// Relative tolerance when reconciling observed trips with the budget.
    pub budget_tolerance: f64,
    /// Required ratio of mean inter- to mean intra-cluster time.
    pub min_inter_intra_time_ratio: f64,
}

impl Default for TimeMatrixConfig {
    fn default() -> Self {
        Self {
            road_factor: 1.4,
            alpha_candidates: DEFAULT_ALPHA_CANDIDATES.to_vec(),
            intra_speed: SpeedBounds::new(0.6, 0.9),
            inter_speed: SpeedBounds::new(1.0, 1.4),
            fallback_alpha: 1.6,
            fragmentation_threshold: 0.1,
            min_speed_ratio: 1.2,
            budget_tolerance: 0.15,
            min_inter_intra_time_ratio: 2.0,
        }
    }
}

impl TimeMatrixConfig {
    /// Replace the road circuity factor.
    #[must_use]
    pub const fn with_road_factor(mut self, road_factor: f64) -> Self {
        self.road_factor = road_factor;
        self
    }

    /// Replace the speed-ratio candidates.
    #[must_use]
    pub fn with_alpha_candidates(mut self, candidates: Vec<f64>) -> Self {
        self.alpha_candidates = candidates;
        self
    }

    /// Check every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidConfig`] naming the first offending
    /// field, or [`MatrixError::NoAlphaCandidates`] when the candidate list
    /// is empty.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if !ROAD_FACTOR_RANGE.contains(&self.road_factor) {
            return Err(invalid("road_factor", self.road_factor));
        }
        if self.alpha_candidates.is_empty() {
            return Err(MatrixError::NoAlphaCandidates);
        }
        if let Some(&alpha) = self
            .alpha_candidates
            .iter()
            .find(|alpha| !is_positive(**alpha))
        {
            return Err(invalid("alpha_candidates", alpha));
        }
        self.intra_speed.validate("intra_speed")?;
        self.inter_speed.validate("inter_speed")?;
        if !is_positive(self.fallback_alpha) {
            return Err(invalid("fallback_alpha", self.fallback_alpha));
        }
        if !is_non_negative(self.fragmentation_threshold) {
            return Err(invalid(
                "fragmentation_threshold",
                self.fragmentation_threshold,
            ));
        }
        if !is_non_negative(self.min_speed_ratio) {
            return Err(invalid("min_speed_ratio", self.min_speed_ratio));
        }
        if !(0.0..1.0).contains(&self.budget_tolerance) {
            return Err(invalid("budget_tolerance", self.budget_tolerance));
        }
        if !is_non_negative(self.min_inter_intra_time_ratio) {
            return Err(invalid(
                "min_inter_intra_time_ratio",
                self.min_inter_intra_time_ratio,
            ));
        }
        Ok(())
    }
}

const fn invalid(field: &'static str, value: f64) -> MatrixError {
    MatrixError::InvalidConfig { field, value }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
