//! Speed estimation from a single observed time budget.
//!
//! The budget equation `intra / v_intra + inter / v_inter = T` has two
//! unknowns. Fixing the ratio `alpha = v_inter / v_intra` leaves one, so the
//! estimator walks a short list of ratios and keeps the first whose implied
//! speeds are both realistic.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::TimeMatrixConfig;
use crate::error::MatrixError;
use crate::trips::TripDistances;

/// Outcome of the speed-ratio search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeedEstimate {
    /// A configured candidate produced speeds inside both bounds.
    Bounded {
        /// Accepted inter/intra speed ratio.
        alpha: f64,
        /// Intra-cluster speed in km/min.
        intra: f64,
        /// Inter-cluster speed in km/min.
        inter: f64,
    },
    /// No candidate fitted; the fallback ratio was applied regardless.
    Fallback {
        /// Fallback inter/intra speed ratio.
        alpha: f64,
        /// Intra-cluster speed in km/min.
        intra: f64,
        /// Inter-cluster speed in km/min.
        inter: f64,
    },
}

impl SpeedEstimate {
    /// Ratio of inter- to intra-cluster speed.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        match *self {
            Self::Bounded { alpha, .. } | Self::Fallback { alpha, .. } => alpha,
        }
    }

    /// Intra-cluster speed in km/min.
    #[must_use]
    pub const fn intra(&self) -> f64 {
        match *self {
            Self::Bounded { intra, .. } | Self::Fallback { intra, .. } => intra,
        }
    }

    /// Inter-cluster speed in km/min.
    #[must_use]
    pub const fn inter(&self) -> f64 {
        match *self {
            Self::Bounded { inter, .. } | Self::Fallback { inter, .. } => inter,
        }
    }

    /// Whether the fallback ratio was used.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "speeds are solved from the floating-point budget equation"
)]
fn solve(budget_minutes: f64, distances: TripDistances, alpha: f64) -> (f64, f64) {
    let intra = (distances.intra_km + distances.inter_km / alpha) / budget_minutes;
    (intra, alpha * intra)
}

fn check_inputs(budget_minutes: f64, distances: TripDistances) -> Result<(), MatrixError> {
    if !(budget_minutes.is_finite() && budget_minutes > 0.0) {
        return Err(MatrixError::InvalidBudget {
            value: budget_minutes,
        });
    }
    distances.validate()
}

/// Search the configured ratios for realistic intra and inter speeds.
///
/// Candidates are tried in order and the first whose implied speeds both
/// fall inside their bounds is returned as [`SpeedEstimate::Bounded`]. When
/// none fits, the configured fallback ratio is applied and a warning is
/// logged; the speeds it implies are not checked against the bounds.
///
/// # Errors
///
/// Returns [`MatrixError::InvalidBudget`] or
/// [`MatrixError::InvalidDistances`] for unusable inputs.
///
/// # Examples
///
/// ```
/// use geocluster_matrix::{SpeedEstimate, TimeMatrixConfig, TripDistances, estimate_speeds};
///
/// # fn main() -> Result<(), geocluster_matrix::MatrixError> {
/// let distances = TripDistances::new(100.0, 60.0);
/// let estimate = estimate_speeds(180.0, distances, &TimeMatrixConfig::default())?;
/// assert!(matches!(estimate, SpeedEstimate::Bounded { alpha, .. } if alpha == 1.3));
/// # Ok(())
/// # }
/// ```
pub fn estimate_speeds(
    budget_minutes: f64,
    distances: TripDistances,
    config: &TimeMatrixConfig,
) -> Result<SpeedEstimate, MatrixError> {
    check_inputs(budget_minutes, distances)?;

    for &alpha in &config.alpha_candidates {
        let (intra, inter) = solve(budget_minutes, distances, alpha);
        if config.intra_speed.contains(intra) && config.inter_speed.contains(inter) {
            debug!("accepted speed ratio {alpha}: intra {intra:.3} km/min, inter {inter:.3} km/min");
            return Ok(SpeedEstimate::Bounded {
                alpha,
                intra,
                inter,
            });
        }
        debug!("rejected speed ratio {alpha}: intra {intra:.3} km/min, inter {inter:.3} km/min");
    }

    let alpha = config.fallback_alpha;
    let (intra, inter) = solve(budget_minutes, distances, alpha);
    warn!(
        "no speed ratio produced realistic speeds; falling back to {alpha} \
         (intra {intra:.3} km/min, inter {inter:.3} km/min)"
    );
    Ok(SpeedEstimate::Fallback {
        alpha,
        intra,
        inter,
    })
}

/// Single speed that covers all observed distance within the budget.
///
/// # Errors
///
/// Returns [`MatrixError::InvalidBudget`] or
/// [`MatrixError::InvalidDistances`] for unusable inputs.
#[expect(
    clippy::float_arithmetic,
    reason = "the basic speed is a floating-point ratio"
)]
pub fn basic_speed(budget_minutes: f64, distances: TripDistances) -> Result<f64, MatrixError> {
    check_inputs(budget_minutes, distances)?;
    Ok((distances.intra_km + distances.inter_km) / budget_minutes)
}
