//! Expected-Improvement search over the 4-dim control subspace.
//!
//! The loop fits a GP on (grind, dose, time, tamp) -> taste score, seeds
//! the search from the most recent trial shifted along the elastic-net
//! gradient signs, then evaluates EI over random candidates with a
//! physical feasibility filter and refines the winner by local jitter.
//! Sampling is injectable via `rand::Rng`, so tests run seeded.

use rand::Rng;

use crate::elastic_net::{self, ElasticNetCfg};
use crate::estimate::{self, EY_WINDOW, TDS_WINDOW};
use crate::features::{self, CONTROL_DIM};
use crate::gp::{self, Gp};
use crate::history::History;
use crate::types::{BrewParams, PrepFlags};
use dialin_config::Ranges;

/// Training pairs required before a suggestion is attempted.
pub const MIN_TRAIN: usize = 3;
/// Random candidates evaluated (the first is the seeded one).
pub const CANDIDATES: usize = 600;
/// Local jitter refinement iterations.
pub const REFINEMENTS: usize = 60;
/// Seed step, as a fraction of each dimension's range.
pub const SEED_STEP_FRACTION: f64 = 0.05;
/// Jitter half-width, as a fraction of each dimension's range.
pub const JITTER_FRACTION: f64 = 0.03;
/// EI exploration margin.
pub const EI_XI: f64 = 0.01;

/// The 4-parameter suggestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoSuggestion {
    pub grind_size: f64,
    pub dose_coffee: f64,
    pub time: f64,
    pub tamp_pressure: f64,
}

/// Acquisition diagnostics for the winning candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoDiagnostics {
    pub mu: f64,
    pub sigma: f64,
    pub ei: f64,
    pub lengthscale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoOutcome {
    Suggestion {
        suggestion: BoSuggestion,
        diagnostics: BoDiagnostics,
    },
    /// Not enough usable history yet; `need` is the minimum trial count.
    NeedMoreData { need: usize },
}

/// Search bounds in control-vector order.
fn bounds_from_ranges(r: &Ranges) -> [(f64, f64); CONTROL_DIM] {
    [
        (r.grind_size.min, r.grind_size.max),
        (r.dose_coffee.min, r.dose_coffee.max),
        (r.beverage_mass.min, r.beverage_mass.max),
        (r.time.min, r.time.max),
        (r.temp.min, r.temp.max),
        (r.tamp_pressure.min, r.tamp_pressure.max),
    ]
}

fn normalize(row: &[f64; 4], bounds: &[(f64, f64); 4]) -> Vec<f64> {
    row.iter()
        .zip(bounds)
        .map(|(v, (lo, hi))| (v - lo) / (hi - lo).max(1e-9))
        .collect()
}

/// Forward-simulate a candidate with the session's temperature and
/// beverage mass (assumed dose x 2 when the session has none) and accept
/// it only when the estimated shot lands in the reference windows.
fn feasible(cand: &[f64; 4], current: &BrewParams, extras: &PrepFlags) -> bool {
    let beverage = if current.beverage_mass > 0.0 {
        current.beverage_mass
    } else {
        let dose = if current.dose_coffee > 0.0 {
            current.dose_coffee
        } else {
            18.0
        };
        dose * 2.0
    };
    let p = BrewParams {
        grind_size: cand[0],
        dose_coffee: cand[1],
        time: cand[2],
        tamp_pressure: cand[3],
        temp: current.temp,
        beverage_mass: beverage,
        ..BrewParams::default()
    };
    let ey = estimate::estimate_ey(&p, extras, p.ratio());
    let Some(tds) = estimate::estimate_tds(&p, Some(ey)) else {
        return false;
    };
    (EY_WINDOW.0..=EY_WINDOW.1).contains(&ey) && (TDS_WINDOW.0..=TDS_WINDOW.1).contains(&tds)
}

/// Run the optimization. Returns `NeedMoreData` below [`MIN_TRAIN`]
/// usable trials or when the feasibility filter rejects every candidate.
pub fn suggest<R: Rng + ?Sized>(
    history: &History,
    ranges: &Ranges,
    current: &BrewParams,
    extras: &PrepFlags,
    rng: &mut R,
) -> BoOutcome {
    // Training set, newest first (matching history order).
    let mut x: Vec<[f64; 4]> = Vec::with_capacity(history.len());
    let mut y: Vec<f64> = Vec::with_capacity(history.len());
    for rec in history.iter() {
        let row = features::control_features(&rec.params);
        let score = features::taste_score(&rec.positives, &rec.defects);
        if score.is_finite() {
            x.push(features::project_search(&row));
            y.push(score);
        }
    }
    if x.len() < MIN_TRAIN {
        return BoOutcome::NeedMoreData { need: MIN_TRAIN };
    }

    // Min-max normalize targets to [0, 1].
    let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (y_max - y_min).max(1e-9);
    let yn: Vec<f64> = y.iter().map(|v| (v - y_min) / span).collect();
    let best_yn = yn.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let bounds_full = bounds_from_ranges(ranges);
    let bounds: [(f64, f64); 4] = [
        bounds_full[features::SEARCH_IDX[0]],
        bounds_full[features::SEARCH_IDX[1]],
        bounds_full[features::SEARCH_IDX[2]],
        bounds_full[features::SEARCH_IDX[3]],
    ];
    let xn: Vec<Vec<f64>> = x.iter().map(|row| normalize(row, &bounds)).collect();

    let lengthscale = gp::lengthscale_from(&xn);
    let gp = Gp::fit(xn, &yn, lengthscale);

    // Elastic net on the raw projected rows decides the seed direction.
    let x_raw: Vec<Vec<f64>> = x.iter().map(|row| row.to_vec()).collect();
    let en = elastic_net::fit(&x_raw, &yn, &ElasticNetCfg::default());

    // Seed: most recent trial stepped 5% of range along each weight sign.
    let newest = x[0];
    let mut seed = [0.0; 4];
    for j in 0..4 {
        let (lo, hi) = bounds[j];
        let step = SEED_STEP_FRACTION * (hi - lo) * if en.weights[j] >= 0.0 { 1.0 } else { -1.0 };
        seed[j] = (newest[j] + step).clamp(lo, hi);
    }

    let mut best_cand: Option<[f64; 4]> = None;
    let mut best_ei = f64::NEG_INFINITY;
    let mut best_post = gp::Posterior { mean: 0.0, sd: 0.0 };
    for t in 0..CANDIDATES {
        let cand = if t == 0 {
            seed
        } else {
            let mut c = [0.0; 4];
            for j in 0..4 {
                let (lo, hi) = bounds[j];
                c[j] = rng.gen_range(lo..hi);
            }
            c
        };
        let post = gp.posterior(&normalize(&cand, &bounds));
        let ei = if feasible(&cand, current, extras) {
            gp::expected_improvement(post.mean, post.sd, best_yn, EI_XI)
        } else {
            f64::NEG_INFINITY
        };
        if ei > best_ei {
            best_ei = ei;
            best_cand = Some(cand);
            best_post = post;
        }
    }

    let Some(mut best) = best_cand else {
        // Every candidate was infeasible under the current session.
        return BoOutcome::NeedMoreData { need: MIN_TRAIN };
    };

    // Local refinement: jitter within 3% of each range, keep improvements.
    // The feasibility filter applies here too so the returned point always
    // lands in the target windows.
    for _ in 0..REFINEMENTS {
        let mut jittered = [0.0; 4];
        for j in 0..4 {
            let (lo, hi) = bounds[j];
            let half = (hi - lo) * JITTER_FRACTION;
            jittered[j] = (best[j] + rng.gen_range(-1.0..1.0) * half).clamp(lo, hi);
        }
        if !feasible(&jittered, current, extras) {
            continue;
        }
        let post = gp.posterior(&normalize(&jittered, &bounds));
        let ei = gp::expected_improvement(post.mean, post.sd, best_yn, EI_XI);
        if ei > best_ei {
            best_ei = ei;
            best = jittered;
            best_post = post;
        }
    }

    tracing::debug!(
        ei = best_ei,
        mu = best_post.mean,
        sigma = best_post.sd,
        lengthscale,
        "optimizer selected candidate"
    );
    BoOutcome::Suggestion {
        suggestion: BoSuggestion {
            grind_size: best[0],
            dose_coffee: best[1],
            time: best[2],
            tamp_pressure: best[3],
        },
        diagnostics: BoDiagnostics {
            mu: best_post.mean,
            sigma: best_post.sd,
            ei: best_ei,
            lengthscale,
        },
    }
}

/// Dead zones below which a dimension's change is not worth mentioning.
const GRIND_DEAD_ZONE: f64 = 0.1;
const DOSE_DEAD_ZONE: f64 = 0.2;
const TIME_DEAD_ZONE: f64 = 0.5;
const TAMP_DEAD_ZONE: f64 = 0.5;

fn signed(x: f64) -> String {
    if x > 0.0 {
        format!("+{x:.1}")
    } else {
        format!("{x:.1}")
    }
}

fn dir(x: f64) -> &'static str {
    if x > 0.0 { "Increase" } else { "Decrease" }
}

/// Compare a suggestion to the current parameters and emit one
/// directional statement per dimension whose change exceeds its dead
/// zone, each with the brewing-physics rationale for that direction.
pub fn explain(
    current: &BrewParams,
    suggestion: &BoSuggestion,
    high_dial_means_coarser: bool,
) -> Vec<String> {
    let mut out = Vec::new();

    let d = suggestion.grind_size - current.grind_size;
    if d.abs() >= GRIND_DEAD_ZONE {
        let coarser = if high_dial_means_coarser { d > 0.0 } else { d < 0.0 };
        let effect = if coarser {
            "Less extraction: lowers bitterness and astringency."
        } else {
            "More extraction: reduces sourness and lifts sweetness (watch for over-extraction)."
        };
        out.push(format!(
            "{} grind by {} dial points ({}). {}",
            dir(d),
            signed(d),
            if coarser { "coarser" } else { "finer" },
            effect
        ));
    }

    let d = suggestion.dose_coffee - current.dose_coffee;
    if d.abs() >= DOSE_DEAD_ZONE {
        out.push(format!(
            "{} dose by {} g. More dose raises resistance and body; less dose speeds up the flow and can lighten the profile.",
            dir(d),
            signed(d)
        ));
    }

    let d = suggestion.time - current.time;
    if d.abs() >= TIME_DEAD_ZONE {
        out.push(format!(
            "{} shot time by {} s. Longer shots extract more and taste sweeter, up to a point; shorter shots extract less and cut bitterness.",
            dir(d),
            signed(d)
        ));
    }

    let d = suggestion.tamp_pressure - current.tamp_pressure;
    if d.abs() >= TAMP_DEAD_ZONE {
        out.push(format!(
            "{} tamp pressure by {}. More pressure reduces the flow (longer shots); less pressure speeds it up.",
            dir(d),
            signed(d)
        ));
    }

    out
}
