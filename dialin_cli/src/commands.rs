//! Subcommand implementations: wire config + history into the core and
//! render the results as text or JSON lines.

use crate::cli::{PrepArgs, SensoryArgs};
use crate::store;
use dialin_config::{Config, GrinderKindCfg};
use dialin_core::features::ridge_features;
use dialin_core::grinder::{GrinderKind, GrinderState};
use dialin_core::history::TrialRecord;
use dialin_core::optimize::{self, BoOutcome};
use dialin_core::recommend::{self, Action};
use dialin_core::ridge;
use dialin_core::types::{BrewParams, Defects, Metrics, Positives, PrepFlags};
use eyre::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

pub fn session_params(cfg: &Config) -> BrewParams {
    let s = &cfg.session;
    BrewParams {
        grind_size: s.grind_size,
        dose_coffee: s.dose_coffee,
        basket_size: s.basket_size,
        time: s.time,
        beverage_mass: s.beverage_mass,
        tds: s.tds,
        temp: s.temp,
        tamp_pressure: s.tamp_pressure,
    }
}

pub fn session_grinder(cfg: &Config) -> GrinderState {
    let g = &cfg.grinder;
    GrinderState {
        kind: match g.kind {
            GrinderKindCfg::Stepless => GrinderKind::Stepless,
            GrinderKindCfg::Stepped => GrinderKind::Stepped,
        },
        per_rev_max: g.per_rev_max,
        dial_number: g.dial_number,
        extra_turns: g.extra_turns,
        high_dial_means_coarser: g.high_dial_means_coarser,
    }
}

fn defects_from(args: &SensoryArgs) -> Defects {
    Defects {
        sour: args.sour,
        bitter: args.bitter,
        astringent: args.astringent,
        weak: args.weak,
        harsh: args.harsh,
    }
}

fn positives_from(args: &SensoryArgs) -> Positives {
    Positives {
        balanced: args.balanced,
        body: args.body,
        aroma: args.aroma,
        sweetness: args.sweetness,
    }
}

pub fn prep_from(args: &PrepArgs) -> PrepFlags {
    PrepFlags {
        freshness: args.freshness,
        bad_distribution: args.bad_distribution,
        uneven_tamp: args.uneven_tamp,
        inaccurate_dose: args.inaccurate_dose,
        broken_puck: args.broken_puck,
    }
}

fn action_json(action: &Action) -> serde_json::Value {
    serde_json::json!({
        "key": action.key.name(),
        "variable": action.variable,
        "change": action.change,
        "reason": action.reason,
    })
}

pub fn run_analyze(
    cfg: &Config,
    history_path: &Path,
    sensory: &SensoryArgs,
    prep: &PrepArgs,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let params = session_params(cfg);
    let grinder = session_grinder(cfg);
    let defects = defects_from(sensory);
    let positives = positives_from(sensory);
    let extras = prep_from(prep);
    let use_measured = cfg.session.use_measured_tds;

    let mut history = store::load_history(history_path)?;
    let model = ridge::compute_model(&history);
    let metrics = Metrics::derive(&params, &extras, use_measured);
    let rec = recommend::analyze(&params, &defects, &positives, &extras, &grinder, &metrics, &model);

    let feats = ridge_features(&params);
    let influence = ridge::rank_influence(&model);

    if json {
        let out = serde_json::json!({
            "principal": action_json(&rec.principal),
            "secondary": rec.secondary.iter().map(action_json).collect::<Vec<_>>(),
            "flags": {
                "extras_priority": rec.flags.extras_priority,
                "basket": rec.flags.basket.map(|b| serde_json::json!({
                    "size": b.size, "min": b.min, "max": b.max,
                })),
            },
            "metrics": { "ey": metrics.ey, "tds": metrics.tds, "ratio": metrics.ratio },
            "model": {
                "using_priors": model.using_priors,
                "n": model.n,
                "pred_tds": model.predict_tds(&feats),
                "pred_ey": model.predict_ey(&feats),
                "pred_taste": model.predict_taste(&feats),
                "influence": influence.iter().map(|i| serde_json::json!({
                    "name": i.name, "weight": i.weight,
                })).collect::<Vec<_>>(),
            },
            "recorded": !dry_run,
        });
        println!("{out}");
    } else {
        println!("Suggestion: {}", rec.principal.change);
        if !rec.principal.reason.is_empty() {
            println!("  metrics: {}", rec.principal.reason);
        }
        for alt in &rec.secondary {
            println!("  also: {}", alt.change);
        }
        if rec.flags.extras_priority {
            println!(
                "  note: prep faults (distribution, channeling, leveling) take priority over numeric tuning"
            );
        }
        if let Some(b) = rec.flags.basket {
            println!(
                "  basket rule active: {} g basket wants {:.1}-{:.1} g",
                b.size, b.min, b.max
            );
        }
        println!(
            "Model: {} (n = {})",
            if model.using_priors { "priors" } else { "fitted" },
            model.n
        );
        for inf in &influence {
            println!("  influence {:<6} {:.3}", inf.name, inf.weight);
        }
        if history.len() < 5 {
            println!("note: the predictive engine performs better after at least 5 logged trials");
        }
    }

    if !dry_run {
        let measured_ey = if use_measured {
            metrics.ey
        } else {
            None
        };
        let record = TrialRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            params,
            grinder,
            defects,
            positives,
            extras,
            use_measured_tds: use_measured,
            ey: measured_ey,
            tds: if use_measured { params.tds } else { None },
            result: Some(rec.principal.change.clone()),
        };
        history.record(record);
        store::save_history(history_path, &history)?;
        tracing::info!(trials = history.len(), "trial appended to history");
    }
    Ok(())
}

pub fn run_suggest(
    cfg: &Config,
    history_path: &Path,
    seed: Option<u64>,
    prep: &PrepArgs,
    json: bool,
) -> Result<()> {
    let history = store::load_history(history_path)?;
    let params = session_params(cfg);
    let extras = prep_from(prep);

    let outcome = match seed {
        Some(s) => {
            let mut rng = StdRng::seed_from_u64(s);
            optimize::suggest(&history, &cfg.ranges, &params, &extras, &mut rng)
        }
        None => {
            let mut rng = rand::thread_rng();
            optimize::suggest(&history, &cfg.ranges, &params, &extras, &mut rng)
        }
    };

    match outcome {
        BoOutcome::NeedMoreData { need } => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "suggestion": null, "need": need, "have": history.len() })
                );
            } else {
                println!(
                    "Not enough history yet: need {need} trials, have {}. Log more shots with `dialin analyze`.",
                    history.len()
                );
            }
        }
        BoOutcome::Suggestion {
            suggestion,
            diagnostics,
        } => {
            let rationale =
                optimize::explain(&params, &suggestion, cfg.grinder.high_dial_means_coarser);
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "suggestion": {
                            "grind_size": suggestion.grind_size,
                            "dose_coffee": suggestion.dose_coffee,
                            "time": suggestion.time,
                            "tamp_pressure": suggestion.tamp_pressure,
                        },
                        "diagnostics": {
                            "mu": diagnostics.mu,
                            "sigma": diagnostics.sigma,
                            "ei": diagnostics.ei,
                            "lengthscale": diagnostics.lengthscale,
                        },
                        "rationale": rationale,
                    })
                );
            } else {
                println!(
                    "Try: grind {:.1}, dose {:.1} g, time {:.0} s, tamp {:.1}",
                    suggestion.grind_size,
                    suggestion.dose_coffee,
                    suggestion.time,
                    suggestion.tamp_pressure
                );
                for line in &rationale {
                    println!("  {line}");
                }
                println!(
                    "  (EI {:.4}, mu {:.3}, sigma {:.3}, lengthscale {:.3})",
                    diagnostics.ei, diagnostics.mu, diagnostics.sigma, diagnostics.lengthscale
                );
            }
        }
    }
    Ok(())
}

pub fn run_model(cfg: &Config, history_path: &Path, json: bool) -> Result<()> {
    let history = store::load_history(history_path)?;
    let model = ridge::compute_model(&history);
    let influence = ridge::rank_influence(&model);
    let params = session_params(cfg);
    let feats = ridge_features(&params);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "using_priors": model.using_priors,
                "n": model.n,
                "w_tds": model.w_tds,
                "w_ey": model.w_ey,
                "w_taste": model.w_taste,
                "pred_tds": model.predict_tds(&feats),
                "pred_ey": model.predict_ey(&feats),
                "pred_taste": model.predict_taste(&feats),
                "influence": influence.iter().map(|i| serde_json::json!({
                    "name": i.name, "weight": i.weight,
                })).collect::<Vec<_>>(),
            })
        );
    } else {
        println!(
            "Predictive model: {} (n = {})",
            if model.using_priors { "priors" } else { "fitted" },
            model.n
        );
        println!("  w_tds   {:?}", model.w_tds);
        println!("  w_ey    {:?}", model.w_ey);
        println!("  w_taste {:?}", model.w_taste);
        println!(
            "Session predictions: TDS {:.2}%, EY {:.2}%, taste {:.3}",
            model.predict_tds(&feats),
            model.predict_ey(&feats),
            model.predict_taste(&feats)
        );
        for inf in &influence {
            println!("  influence {:<6} {:.3}", inf.name, inf.weight);
        }
    }
    Ok(())
}

pub fn run_export(history_path: &Path, out: Option<&Path>) -> Result<()> {
    let history = store::load_history(history_path)?;
    let rows: Vec<_> = history.iter().map(store::record_to_row).collect();
    match out {
        Some(path) => {
            dialin_config::trial_csv::write_path(path, &rows)?;
            println!("Exported {} trials to {}", rows.len(), path.display());
        }
        None => {
            dialin_config::trial_csv::write_rows(std::io::stdout().lock(), &rows)?;
        }
    }
    Ok(())
}

pub fn run_delete(history_path: &Path, index: usize, json: bool) -> Result<()> {
    let mut history = store::load_history(history_path)?;
    let Some(stamp) = history.get(index).map(|r| r.timestamp.clone()) else {
        eyre::bail!(
            "history index {index} out of range (have {} trials)",
            history.len()
        );
    };
    history.remove(index);
    store::save_history(history_path, &history)?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": index, "timestamp": stamp, "remaining": history.len() })
        );
    } else {
        println!("Deleted trial {index} ({stamp}); {} remain", history.len());
    }
    Ok(())
}
