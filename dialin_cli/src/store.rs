//! Mapping between core trial records and the flat CSV rows persisted on
//! disk. The core stays serde-free; this is the only place the two shapes
//! meet.

use dialin_config::trial_csv::{self, TrialRow};
use dialin_core::grinder::{GrinderKind, GrinderState};
use dialin_core::history::{History, TrialRecord};
use dialin_core::types::{BrewParams, Defects, Positives, PrepFlags};
use eyre::WrapErr;
use std::path::Path;

fn kind_from_str(s: &str) -> GrinderKind {
    match s {
        "stepped" => GrinderKind::Stepped,
        _ => GrinderKind::Stepless,
    }
}

fn kind_to_str(kind: GrinderKind) -> &'static str {
    match kind {
        GrinderKind::Stepless => "stepless",
        GrinderKind::Stepped => "stepped",
    }
}

pub fn row_to_record(row: TrialRow) -> TrialRecord {
    TrialRecord {
        timestamp: row.timestamp,
        params: BrewParams {
            grind_size: row.grind_size,
            dose_coffee: row.dose_coffee,
            basket_size: row.basket_size,
            time: row.time,
            beverage_mass: row.beverage_mass,
            tds: row.tds,
            temp: row.temp,
            tamp_pressure: row.tamp_pressure,
        },
        grinder: GrinderState {
            kind: kind_from_str(&row.grinder_kind),
            per_rev_max: row.per_rev_max,
            dial_number: row.dial_number,
            extra_turns: row.extra_turns,
            high_dial_means_coarser: row.high_dial_means_coarser != 0,
        },
        defects: Defects {
            sour: row.sour,
            bitter: row.bitter,
            astringent: row.astringent,
            weak: row.weak,
            harsh: row.harsh,
        },
        positives: Positives {
            balanced: row.balanced,
            body: row.body,
            aroma: row.aroma,
            sweetness: row.sweetness,
        },
        extras: PrepFlags {
            freshness: row.freshness != 0,
            bad_distribution: row.bad_distribution != 0,
            uneven_tamp: row.uneven_tamp != 0,
            inaccurate_dose: row.inaccurate_dose != 0,
            broken_puck: row.broken_puck != 0,
        },
        use_measured_tds: row.use_measured_tds != 0,
        ey: row.ey,
        tds: if row.use_measured_tds != 0 { row.tds } else { None },
        result: row.suggestion,
    }
}

pub fn record_to_row(rec: &TrialRecord) -> TrialRow {
    let p = &rec.params;
    TrialRow {
        timestamp: rec.timestamp.clone(),
        grind_size: p.grind_size,
        dose_coffee: p.dose_coffee,
        basket_size: p.basket_size,
        time: p.time,
        beverage_mass: p.beverage_mass,
        tds: p.tds,
        temp: p.temp,
        tamp_pressure: p.tamp_pressure,
        ey: rec.ey,
        ratio: p.ratio().map(|r| (r * 100.0).round() / 100.0),
        flow: p.flow().map(|f| (f * 100.0).round() / 100.0),
        sour: rec.defects.sour,
        bitter: rec.defects.bitter,
        astringent: rec.defects.astringent,
        weak: rec.defects.weak,
        harsh: rec.defects.harsh,
        balanced: rec.positives.balanced,
        body: rec.positives.body,
        aroma: rec.positives.aroma,
        sweetness: rec.positives.sweetness,
        freshness: u8::from(rec.extras.freshness),
        bad_distribution: u8::from(rec.extras.bad_distribution),
        uneven_tamp: u8::from(rec.extras.uneven_tamp),
        inaccurate_dose: u8::from(rec.extras.inaccurate_dose),
        broken_puck: u8::from(rec.extras.broken_puck),
        use_measured_tds: u8::from(rec.use_measured_tds),
        grinder_kind: kind_to_str(rec.grinder.kind).to_string(),
        per_rev_max: rec.grinder.per_rev_max,
        dial_number: rec.grinder.dial_number,
        extra_turns: rec.grinder.extra_turns,
        high_dial_means_coarser: u8::from(rec.grinder.high_dial_means_coarser),
        suggestion: rec.result.clone(),
    }
}

/// Load the persisted history. A missing file yields an empty history so
/// the first `analyze` can bootstrap it.
pub fn load_history(path: &Path) -> eyre::Result<History> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no history file yet, starting empty");
        return Ok(History::new());
    }
    let rows = trial_csv::read_path(path)
        .wrap_err_with(|| format!("loading trial history from {}", path.display()))?;
    Ok(History::from_records(
        rows.into_iter().map(row_to_record).collect(),
    ))
}

pub fn save_history(path: &Path, history: &History) -> eyre::Result<()> {
    let rows: Vec<TrialRow> = history.iter().map(record_to_row).collect();
    trial_csv::write_path(path, &rows)
        .wrap_err_with(|| format!("saving trial history to {}", path.display()))
}
