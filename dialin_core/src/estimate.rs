//! Heuristic extraction estimates for trials without a refractometer.

use crate::types::{BrewParams, PrepFlags};

/// Clamp window for the EY estimate (%).
pub const EY_CLAMP: (f64, f64) = (10.0, 30.0);
/// Clamp window for the TDS estimate (%).
pub const TDS_CLAMP: (f64, f64) = (4.0, 14.0);
/// Reference target window for EY (%), used by the recommender thresholds
/// and the optimizer feasibility filter.
pub const EY_WINDOW: (f64, f64) = (18.0, 22.0);
/// Reference target window for TDS (%).
pub const TDS_WINDOW: (f64, f64) = (8.0, 12.0);
/// EY assumed when the caller has no estimate at all.
pub const ASSUMED_EY: f64 = 20.0;

/// Estimate extraction yield (%) from brew parameters and prep
/// observations. Starts from a 19.5% baseline shot and applies linear
/// adjustments per deviation, then flat penalties per prep fault.
/// Clamped to [10, 30].
pub fn estimate_ey(p: &BrewParams, extras: &PrepFlags, ratio: Option<f64>) -> f64 {
    let mut ey = 19.5;
    if let Some(r) = ratio {
        ey += (r - 2.0) * 1.5;
    }
    ey += (5.0 - p.grind_size) * 0.8;
    ey += (p.time - 28.0) * 0.25;
    ey += (p.temp - 93.0) * 0.15;
    ey -= (p.tamp_pressure - 5.0).abs() * 0.05;
    if extras.freshness {
        ey -= 1.0;
    }
    if extras.bad_distribution {
        ey -= 1.5;
    }
    if extras.uneven_tamp {
        ey -= 1.2;
    }
    if extras.broken_puck {
        ey -= 1.5;
    }
    ey.clamp(EY_CLAMP.0, EY_CLAMP.1)
}

/// Estimate TDS (%) from the mass balance `dose * EY / beverage`, clamped
/// to [4, 14]. Returns `None` when dose or beverage mass is missing or
/// zero; an absent `ey` falls back to an assumed 20%.
pub fn estimate_tds(p: &BrewParams, ey: Option<f64>) -> Option<f64> {
    if p.beverage_mass <= 0.0 || p.dose_coffee <= 0.0 {
        return None;
    }
    let ey = ey.unwrap_or(ASSUMED_EY);
    Some((p.dose_coffee * ey / p.beverage_mass).clamp(TDS_CLAMP.0, TDS_CLAMP.1))
}
