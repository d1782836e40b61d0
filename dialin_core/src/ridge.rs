//! Informative-prior ridge regression over trial history.
//!
//! Three independent regressions predict TDS, EY and taste score from the
//! ridge feature vector. Each carries a per-feature regularization vector
//! and a prior weight vector; the solve is
//! `(XᵀX + diag(λ)) w = Xᵀy + diag(λ)·w_prior`, so with no data (or
//! λ → ∞) the weights collapse to the prior, and with plentiful data and
//! λ → 0 they approach ordinary least squares.

use crate::estimate;
use crate::features::{self, RIDGE_DIM};
use crate::history::History;
use crate::linalg;

/// TDS prior: a 2:1 shot near 10% strength, finer grind raising strength.
pub const TDS_PRIOR: [f64; RIDGE_DIM] = [10.0, -0.55, 0.00, 0.15, 0.05, 0.00];
pub const TDS_LAMBDA: [f64; RIDGE_DIM] = [0.01, 0.08, 4.0, 0.25, 0.25, 0.30];
/// EY prior: ~20% extraction, finer grind extracting more.
pub const EY_PRIOR: [f64; RIDGE_DIM] = [20.0, -0.50, 0.00, 0.10, 0.12, 0.00];
pub const EY_LAMBDA: [f64; RIDGE_DIM] = [0.01, 0.06, 4.0, 0.20, 0.22, 0.25];
/// Taste prior: neutral, slightly favoring finer grind and longer shots.
pub const TASTE_PRIOR: [f64; RIDGE_DIM] = [0.00, -0.12, 0.00, 0.05, 0.05, 0.00];
pub const TASTE_LAMBDA: [f64; RIDGE_DIM] = [0.01, 0.10, 3.5, 0.30, 0.30, 0.30];

/// Minimum fully-determined samples before fitting instead of using priors.
pub const MIN_SAMPLES: usize = 3;

/// The three fitted weight vectors plus provenance. A pure function of
/// the history; recomputed whenever it changes, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveModel {
    pub w_tds: [f64; RIDGE_DIM],
    pub w_ey: [f64; RIDGE_DIM],
    pub w_taste: [f64; RIDGE_DIM],
    /// True when the weights are the priors (not enough usable samples).
    pub using_priors: bool,
    /// Samples actually used by the fit.
    pub n: usize,
}

impl PredictiveModel {
    /// The zero-data model: pure priors.
    pub fn priors() -> Self {
        Self {
            w_tds: TDS_PRIOR,
            w_ey: EY_PRIOR,
            w_taste: TASTE_PRIOR,
            using_priors: true,
            n: 0,
        }
    }

    pub fn predict_tds(&self, feats: &[f64; RIDGE_DIM]) -> f64 {
        linalg::dot(&self.w_tds, feats)
    }

    pub fn predict_ey(&self, feats: &[f64; RIDGE_DIM]) -> f64 {
        linalg::dot(&self.w_ey, feats)
    }

    pub fn predict_taste(&self, feats: &[f64; RIDGE_DIM]) -> f64 {
        linalg::dot(&self.w_taste, feats)
    }
}

/// Solve one prior-regularized ridge regression.
pub fn ridge_solve_prior(
    x: &[[f64; RIDGE_DIM]],
    y: &[f64],
    lambda: &[f64; RIDGE_DIM],
    prior: &[f64; RIDGE_DIM],
) -> [f64; RIDGE_DIM] {
    debug_assert_eq!(x.len(), y.len());
    let mut a = vec![vec![0.0; RIDGE_DIM]; RIDGE_DIM];
    let mut b = vec![0.0; RIDGE_DIM];
    for (xi, &yi) in x.iter().zip(y) {
        for j in 0..RIDGE_DIM {
            b[j] += xi[j] * yi;
            for k in 0..RIDGE_DIM {
                a[j][k] += xi[j] * xi[k];
            }
        }
    }
    for j in 0..RIDGE_DIM {
        a[j][j] += lambda[j];
        b[j] += lambda[j] * prior[j];
    }
    let sol = linalg::solve_lenient(&a, &b, linalg::RIDGE_PIVOT_EPS);
    if sol.skipped_pivots > 0 {
        tracing::warn!(
            skipped = sol.skipped_pivots,
            "ridge normal equations were near-singular; check trial data quality"
        );
    }
    let mut w = [0.0; RIDGE_DIM];
    w.copy_from_slice(&sol.x);
    w
}

/// Fit the predictive model from history, or fall back to the priors when
/// fewer than [`MIN_SAMPLES`] trials have finite TDS, EY and taste values.
pub fn compute_model(history: &History) -> PredictiveModel {
    if history.len() < MIN_SAMPLES {
        return PredictiveModel::priors();
    }

    let mut x: Vec<[f64; RIDGE_DIM]> = Vec::with_capacity(history.len());
    let mut y_tds = Vec::with_capacity(history.len());
    let mut y_ey = Vec::with_capacity(history.len());
    let mut y_taste = Vec::with_capacity(history.len());
    for rec in history.iter() {
        let feats = features::ridge_features(&rec.params);
        let ratio = rec.params.ratio();
        let ey = rec
            .ey
            .unwrap_or_else(|| estimate::estimate_ey(&rec.params, &rec.extras, ratio));
        let tds = match rec.tds {
            Some(t) => Some(t),
            None => estimate::estimate_tds(&rec.params, Some(ey)),
        };
        let taste = features::taste_score(&rec.positives, &rec.defects);
        let Some(tds) = tds else { continue };
        if !(tds.is_finite() && ey.is_finite() && taste.is_finite()) {
            continue;
        }
        x.push(feats);
        y_tds.push(tds);
        y_ey.push(ey);
        y_taste.push(taste);
    }

    if x.len() < MIN_SAMPLES {
        let mut model = PredictiveModel::priors();
        model.n = x.len();
        return model;
    }

    tracing::debug!(n = x.len(), "fitting ridge model from history");
    PredictiveModel {
        w_tds: ridge_solve_prior(&x, &y_tds, &TDS_LAMBDA, &TDS_PRIOR),
        w_ey: ridge_solve_prior(&x, &y_ey, &EY_LAMBDA, &EY_PRIOR),
        w_taste: ridge_solve_prior(&x, &y_taste, &TASTE_LAMBDA, &TASTE_PRIOR),
        using_priors: false,
        n: x.len(),
    }
}

/// One entry of the influence ranking diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Influence {
    pub name: &'static str,
    pub weight: f64,
}

/// Names of the non-intercept ridge features, in vector order.
pub const FEATURE_NAMES: [&str; RIDGE_DIM - 1] = ["grind", "tamp", "dose", "time", "ratio"];

/// Rank feature importance as the mean absolute weight across the three
/// regressions, descending. Diagnostic output only, not a decision input.
pub fn rank_influence(model: &PredictiveModel) -> Vec<Influence> {
    let mut out: Vec<Influence> = FEATURE_NAMES
        .into_iter()
        .enumerate()
        .map(|(i, name)| Influence {
            name,
            weight: (model.w_tds[i + 1].abs()
                + model.w_ey[i + 1].abs()
                + model.w_taste[i + 1].abs())
                / 3.0,
        })
        .collect();
    out.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    out
}
