//! Rule-based recommender: fuses hard constraints, sensory thresholds,
//! metric thresholds and the ridge model's predictive gradient into a
//! ranked action list.
//!
//! Three composable stages keep the numeric core testable independent of
//! presentation text: [`score_actions`] accumulates a non-negative score
//! per action, [`rank`] orders the keys, and [`analyze`] renders the
//! ranked keys into human-readable actions.

use crate::features;
use crate::grinder::{self, GrinderState};
use crate::ridge::PredictiveModel;
use crate::types::{BrewParams, Defects, Metrics, Positives, PrepFlags};

/// Grind move per suggestion, in grind-setting units (0..10 scale).
pub const GRIND_STEP: f64 = 0.2;
/// Dose move per suggestion (g).
pub const DOSE_STEP: f64 = 0.5;
/// Shot-time move per suggestion (s).
pub const TIME_STEP: f64 = 2.0;
/// Temperature move per suggestion (°C).
pub const TEMP_STEP: f64 = 1.0;
/// Beverage-mass move per suggestion (g).
pub const BEVERAGE_STEP: f64 = 4.0;
/// Tamp move per suggestion (pressure units).
pub const TAMP_STEP: f64 = 1.0;

/// Score multiplier applied to numeric-tuning actions while a physical
/// prep fault is flagged.
pub const EXTRAS_DAMPENING: f64 = 0.6;

/// Named actions the recommender can score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKey {
    RespectBasketDose,
    FixChanneling,
    FixDistribution,
    GrindFiner,
    GrindCoarser,
    IncreaseRatio,
    DecreaseRatio,
    IncreaseTemp,
    DecreaseTemp,
    IncreaseDose,
    DecreaseDose,
    IncreaseTime,
    DecreaseTime,
    IncreaseTamp,
    DecreaseTamp,
}

impl ActionKey {
    /// Physical-prep fixes outrank numeric tuning in the final ordering.
    pub fn is_fix(self) -> bool {
        matches!(self, Self::FixChanneling | Self::FixDistribution)
    }

    /// Stable snake_case name for logs and JSON output.
    pub fn name(self) -> &'static str {
        match self {
            Self::RespectBasketDose => "respect_basket_dose",
            Self::FixChanneling => "fix_channeling",
            Self::FixDistribution => "fix_distribution",
            Self::GrindFiner => "grind_finer",
            Self::GrindCoarser => "grind_coarser",
            Self::IncreaseRatio => "increase_ratio",
            Self::DecreaseRatio => "decrease_ratio",
            Self::IncreaseTemp => "increase_temp",
            Self::DecreaseTemp => "decrease_temp",
            Self::IncreaseDose => "increase_dose",
            Self::DecreaseDose => "decrease_dose",
            Self::IncreaseTime => "increase_time",
            Self::DecreaseTime => "decrease_time",
            Self::IncreaseTamp => "increase_tamp",
            Self::DecreaseTamp => "decrease_tamp",
        }
    }
}

/// Allowed dose window for a nominal basket: [max(5, size-1), size+1],
/// rounded to 0.1 g.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketWindow {
    pub size: f64,
    pub min: f64,
    pub max: f64,
}

impl BasketWindow {
    pub fn for_basket(size: f64) -> Self {
        let round10 = |x: f64| (x * 10.0).round() / 10.0;
        Self {
            size,
            min: round10(size - 1.0).max(5.0),
            max: round10(size + 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Flags {
    /// Set when a prep fault dominates the ranking.
    pub extras_priority: bool,
    /// Set when the current dose violates the basket window.
    pub basket: Option<BasketWindow>,
}

/// A rendered, ranked suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub key: ActionKey,
    /// The parameter this action moves, when it targets a single one.
    pub variable: Option<&'static str>,
    /// Human-readable change, including the target value.
    pub change: String,
    /// Metrics line the change was based on.
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub principal: Action,
    pub secondary: Vec<Action>,
    pub flags: Flags,
}

/// Add `v` to an action's accumulated score, inserting it on first use.
/// Insertion order is kept so equal scores rank deterministically.
fn bump(scores: &mut Vec<(ActionKey, f64)>, key: ActionKey, v: f64) {
    if let Some(entry) = scores.iter_mut().find(|(k, _)| *k == key) {
        entry.1 += v;
    } else {
        scores.push((key, v));
    }
}

/// Stage 1: accumulate scores per action key.
pub fn score_actions(
    params: &BrewParams,
    defects: &Defects,
    extras: &PrepFlags,
    metrics: &Metrics,
    model: &PredictiveModel,
) -> (Vec<(ActionKey, f64)>, Flags) {
    let mut scores: Vec<(ActionKey, f64)> = Vec::new();
    let mut flags = Flags::default();

    // Basket rule (±1 g), highest priority.
    let basket = params.basket_size;
    if basket > 0.0 {
        let window = BasketWindow::for_basket(basket);
        if params.dose_coffee < window.min - 1e-6 || params.dose_coffee > window.max + 1e-6 {
            bump(&mut scores, ActionKey::RespectBasketDose, 100.0);
            flags.basket = Some(window);
        }
    }

    // Physical prep faults override numeric tuning.
    if extras.broken_puck {
        bump(&mut scores, ActionKey::FixChanneling, 60.0);
        flags.extras_priority = true;
    }
    if extras.bad_distribution || extras.uneven_tamp {
        bump(&mut scores, ActionKey::FixDistribution, 40.0);
        flags.extras_priority = true;
    }
    if extras.inaccurate_dose {
        bump(&mut scores, ActionKey::RespectBasketDose, 30.0);
        flags.extras_priority = true;
    }

    // Sensory thresholds.
    if defects.sour >= 7.0 {
        bump(&mut scores, ActionKey::GrindFiner, 4.0);
        bump(&mut scores, ActionKey::IncreaseTemp, 1.2);
    }
    if defects.bitter >= 7.0 {
        bump(&mut scores, ActionKey::GrindCoarser, 4.0);
        bump(&mut scores, ActionKey::DecreaseTemp, 1.2);
    }

    // Metric thresholds: ratio/time drive grind direction predictably.
    let ratio = metrics.ratio.or_else(|| params.ratio());
    let time = params.time;
    if let Some(r) = ratio {
        if r >= 2.6 || time <= 22.0 {
            bump(&mut scores, ActionKey::GrindFiner, 5.0);
        }
        if r <= 1.6 || time >= 35.0 {
            bump(&mut scores, ActionKey::GrindCoarser, 5.0);
        }
    }
    if let Some(ey) = metrics.ey {
        if ey < 18.0 {
            bump(&mut scores, ActionKey::GrindFiner, 2.2);
            bump(&mut scores, ActionKey::IncreaseRatio, 1.0);
        }
        if ey > 22.0 {
            bump(&mut scores, ActionKey::GrindCoarser, 2.2);
            bump(&mut scores, ActionKey::DecreaseRatio, 1.0);
        }
    }
    if let Some(tds) = metrics.tds {
        if tds < 8.0 {
            bump(&mut scores, ActionKey::DecreaseRatio, 1.8);
        }
        if tds > 12.0 {
            bump(&mut scores, ActionKey::IncreaseRatio, 1.8);
        }
    }

    // Predictive gradient: push each control feature toward lower
    // TDS/EY error and higher predicted taste.
    let feats = features::ridge_features(params);
    let t_err = model.predict_tds(&feats) - 10.0;
    let e_err = model.predict_ey(&feats) - 20.0;
    let c_taste = 1.2;
    for i in 1..=4usize {
        let g = 2.0 * t_err * model.w_tds[i] + 2.0 * e_err * model.w_ey[i]
            - c_taste * model.w_taste[i];
        match i {
            1 => {
                if g > 0.0 {
                    bump(&mut scores, ActionKey::GrindFiner, 3.0);
                } else {
                    bump(&mut scores, ActionKey::GrindCoarser, 3.0);
                }
            }
            2 => {
                // Tamp only matters at extremes or with uneven prep.
                let tamp = params.tamp_pressure;
                let relevant = !(4.0..=6.0).contains(&tamp)
                    || extras.uneven_tamp
                    || extras.bad_distribution;
                let scale = if relevant { 1.0 } else { 0.3 };
                if g > 0.0 {
                    bump(&mut scores, ActionKey::DecreaseTamp, 1.0 * scale);
                } else {
                    bump(&mut scores, ActionKey::IncreaseTamp, 1.0 * scale);
                }
            }
            3 => {
                if g > 0.0 {
                    bump(&mut scores, ActionKey::DecreaseDose, 1.5);
                } else {
                    bump(&mut scores, ActionKey::IncreaseDose, 1.5);
                }
            }
            _ => {
                if g > 0.0 {
                    bump(&mut scores, ActionKey::DecreaseTime, 1.2);
                } else {
                    bump(&mut scores, ActionKey::IncreaseTime, 1.2);
                }
            }
        }
    }

    // While a prep fault is active, numeric tuning is dampened so the
    // fixes dominate the ranking.
    if flags.extras_priority {
        for (key, score) in &mut scores {
            if !key.is_fix() && *key != ActionKey::RespectBasketDose {
                *score *= EXTRAS_DAMPENING;
            }
        }
    }

    (scores, flags)
}

/// Stage 2: rank keys by score descending, then force the basket
/// correction to the front and stable-partition fixes before the rest.
pub fn rank(scores: &[(ActionKey, f64)]) -> Vec<ActionKey> {
    let mut entries: Vec<(ActionKey, f64)> = scores.to_vec();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut ranked: Vec<ActionKey> = entries.into_iter().map(|(k, _)| k).collect();
    if let Some(pos) = ranked.iter().position(|k| *k == ActionKey::RespectBasketDose) {
        let key = ranked.remove(pos);
        ranked.insert(0, key);
    }
    let (fixes, rest): (Vec<_>, Vec<_>) = ranked.into_iter().partition(|k| k.is_fix());
    fixes.into_iter().chain(rest).collect()
}

/// Metrics line shown as each action's rationale.
fn describe(metrics: &Metrics) -> String {
    let mut parts = Vec::new();
    if let Some(ey) = metrics.ey {
        parts.push(format!("EY {ey:.1}%"));
    }
    if let Some(tds) = metrics.tds {
        parts.push(format!("TDS {tds:.1}%"));
    }
    if let Some(r) = metrics.ratio {
        parts.push(format!("{r:.2}:1"));
    }
    parts.join(" · ")
}

/// Stage 3: render one ranked key into a concrete target-value change.
pub fn render_action(
    key: ActionKey,
    params: &BrewParams,
    grinder: &GrinderState,
    metrics: &Metrics,
) -> Action {
    let reason = describe(metrics);
    let pr = grinder.per_rev_max.max(1.0);
    let curr_abs = grinder.dial_abs();
    let delta_dial = GRIND_STEP * pr;
    let coarse_sign = if grinder.high_dial_means_coarser { 1.0 } else { -1.0 };
    let finer_abs = (curr_abs - coarse_sign * delta_dial).max(0.0);
    let coarser_abs = (curr_abs + coarse_sign * delta_dial).max(0.0);
    let fmt_dial = |abs: f64| {
        let pos = grinder::abs_to_dial(abs, pr);
        grinder::dial_string(pos.dial_number, pos.extra_turns)
    };

    let (variable, change) = match key {
        ActionKey::FixDistribution => (
            None,
            "Fix distribution and leveling: WDT, even grounds, level tamp (4-6). Do this before changing grind.".to_string(),
        ),
        ActionKey::FixChanneling => (
            None,
            "Resolve channeling: improve distribution and leveling, check puck integrity; consider slightly coarser grind and a short preinfusion.".to_string(),
        ),
        ActionKey::RespectBasketDose => {
            let window = BasketWindow::for_basket(params.basket_size);
            let target = params.dose_coffee.clamp(window.min, window.max);
            (
                Some("dose_coffee"),
                format!(
                    "Adjust dose to {target:.1} g to respect a {} g basket (±1 g)",
                    params.basket_size
                ),
            )
        }
        ActionKey::GrindFiner => (
            Some("grind_size"),
            format!(
                "Grind finer: {:.1} → {:.1} (≈ dial: {} → {})",
                params.grind_size,
                params.grind_size - GRIND_STEP,
                fmt_dial(curr_abs),
                fmt_dial(finer_abs)
            ),
        ),
        ActionKey::GrindCoarser => (
            Some("grind_size"),
            format!(
                "Grind coarser: {:.1} → {:.1} (≈ dial: {} → {})",
                params.grind_size,
                params.grind_size + GRIND_STEP,
                fmt_dial(curr_abs),
                fmt_dial(coarser_abs)
            ),
        ),
        ActionKey::IncreaseRatio => (
            Some("beverage_mass"),
            format!(
                "Increase output: {} → {} g",
                params.beverage_mass,
                params.beverage_mass + BEVERAGE_STEP
            ),
        ),
        ActionKey::DecreaseRatio => (
            Some("beverage_mass"),
            format!(
                "Decrease output: {} → {} g",
                params.beverage_mass,
                params.beverage_mass - BEVERAGE_STEP
            ),
        ),
        ActionKey::IncreaseTemp => (
            Some("temp"),
            format!(
                "Raise temperature: {} → {} °C",
                params.temp,
                params.temp + TEMP_STEP
            ),
        ),
        ActionKey::DecreaseTemp => (
            Some("temp"),
            format!(
                "Lower temperature: {} → {} °C",
                params.temp,
                params.temp - TEMP_STEP
            ),
        ),
        ActionKey::DecreaseDose => {
            let mut target = params.dose_coffee - DOSE_STEP;
            if params.basket_size > 0.0 {
                target = target.max(BasketWindow::for_basket(params.basket_size).min);
            }
            (
                Some("dose_coffee"),
                format!("Decrease dose: {} → {target:.1} g", params.dose_coffee),
            )
        }
        ActionKey::IncreaseDose => {
            let mut target = params.dose_coffee + DOSE_STEP;
            if params.basket_size > 0.0 {
                target = target.min(BasketWindow::for_basket(params.basket_size).max);
            }
            (
                Some("dose_coffee"),
                format!("Increase dose: {} → {target:.1} g", params.dose_coffee),
            )
        }
        ActionKey::DecreaseTime => (
            Some("time"),
            format!("Decrease time: {} → {} s", params.time, params.time - TIME_STEP),
        ),
        ActionKey::IncreaseTime => (
            Some("time"),
            format!("Increase time: {} → {} s", params.time, params.time + TIME_STEP),
        ),
        ActionKey::IncreaseTamp => (
            Some("tamp_pressure"),
            format!(
                "Increase tamp: {} → {}",
                params.tamp_pressure,
                params.tamp_pressure + TAMP_STEP
            ),
        ),
        ActionKey::DecreaseTamp => (
            Some("tamp_pressure"),
            format!(
                "Decrease tamp: {} → {}",
                params.tamp_pressure,
                params.tamp_pressure - TAMP_STEP
            ),
        ),
    };

    Action {
        key,
        variable,
        change,
        reason,
    }
}

/// Full pipeline: score, rank, render. Returns the principal suggestion
/// (a slight grind-finer nudge when nothing scored) plus up to two
/// alternates and the priority flags.
pub fn analyze(
    params: &BrewParams,
    defects: &Defects,
    _positives: &Positives,
    extras: &PrepFlags,
    grinder: &GrinderState,
    metrics: &Metrics,
    model: &PredictiveModel,
) -> Recommendation {
    let (scores, flags) = score_actions(params, defects, extras, metrics, model);
    let ranked = rank(&scores);
    let principal_key = ranked.first().copied().unwrap_or(ActionKey::GrindFiner);
    let principal = render_action(principal_key, params, grinder, metrics);
    let secondary = ranked
        .iter()
        .skip(1)
        .take(2)
        .map(|&k| render_action(k, params, grinder, metrics))
        .collect();
    Recommendation {
        principal,
        secondary,
        flags,
    }
}
