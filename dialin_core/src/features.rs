//! Feature vectors and the scalar taste score.
//!
//! Two fixed-order encodings of a trial's parameters feed the two
//! modeling subsystems:
//!
//! - the ridge vector `[1, grind, tamp, dose, time, ratio]` for the
//!   prior-regularized regressions;
//! - the control vector `[grind, dose, beverage, time, temp, tamp]` for
//!   the surrogate and the Bayesian optimizer, of which a 4-dim
//!   projection (grind, dose, time, tamp) is the actual search space.

use crate::types::{BrewParams, Defects, Positives};

/// Ridge feature dimension: intercept + grind + tamp + dose + time + ratio.
pub const RIDGE_DIM: usize = 6;
/// Control-subspace dimension: grind, dose, beverage, time, temp, tamp.
pub const CONTROL_DIM: usize = 6;
/// Indices of the control vector kept for Bayesian-optimization search
/// (grind, dose, time, tamp); beverage mass and temperature stay fixed.
pub const SEARCH_IDX: [usize; 4] = [0, 1, 3, 5];
/// Ratio assumed when dose or beverage mass is not recorded.
pub const DEFAULT_RATIO: f64 = 2.0;

/// Ridge regression features for one trial.
pub fn ridge_features(p: &BrewParams) -> [f64; RIDGE_DIM] {
    let ratio = p.ratio().unwrap_or(DEFAULT_RATIO);
    [
        1.0,
        p.grind_size,
        p.tamp_pressure,
        p.dose_coffee,
        p.time,
        ratio,
    ]
}

/// Control-subspace features for one trial (no intercept).
pub fn control_features(p: &BrewParams) -> [f64; CONTROL_DIM] {
    [
        p.grind_size,
        p.dose_coffee,
        p.beverage_mass,
        p.time,
        p.temp,
        p.tamp_pressure,
    ]
}

/// Project a control vector onto the 4-dim search subspace.
pub fn project_search(row: &[f64; CONTROL_DIM]) -> [f64; 4] {
    [row[SEARCH_IDX[0]], row[SEARCH_IDX[1]], row[SEARCH_IDX[2]], row[SEARCH_IDX[3]]]
}

/// Normalized positives minus normalized defects, roughly in [-1, 1].
/// Higher is better; used as the regression target and the optimization
/// objective.
pub fn taste_score(positives: &Positives, defects: &Defects) -> f64 {
    positives.sum() / 40.0 - defects.sum() / 50.0
}
