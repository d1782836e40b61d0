use dialin_core::features::{RIDGE_DIM, ridge_features, taste_score};
use dialin_core::history::{History, TrialRecord};
use dialin_core::linalg::dot;
use dialin_core::ridge::{
    self, EY_PRIOR, TASTE_PRIOR, TDS_PRIOR, compute_model, rank_influence, ridge_solve_prior,
};
use dialin_core::types::{BrewParams, Defects, Positives, PrepFlags};

fn trial(grind: f64, time: f64, positives_level: f64) -> TrialRecord {
    TrialRecord {
        timestamp: "2026-08-01T08:00:00Z".into(),
        params: BrewParams {
            grind_size: grind,
            time,
            ..BrewParams::default()
        },
        grinder: dialin_core::GrinderState::default(),
        defects: Defects::default(),
        positives: Positives {
            balanced: positives_level,
            body: positives_level,
            aroma: positives_level,
            sweetness: positives_level,
        },
        extras: PrepFlags::default(),
        use_measured_tds: false,
        ey: None,
        tds: None,
        result: None,
    }
}

#[test]
fn two_samples_fall_back_to_priors() {
    let mut history = History::new();
    history.record(trial(5.0, 28.0, 5.0));
    history.record(trial(6.0, 30.0, 4.0));
    let model = compute_model(&history);
    assert!(model.using_priors);
    assert_eq!(model.w_tds, TDS_PRIOR);
    assert_eq!(model.w_ey, EY_PRIOR);
    assert_eq!(model.w_taste, TASTE_PRIOR);
}

#[test]
fn three_samples_fit() {
    let mut history = History::new();
    history.record(trial(4.0, 26.0, 3.0));
    history.record(trial(5.0, 28.0, 5.0));
    history.record(trial(6.0, 30.0, 4.0));
    let model = compute_model(&history);
    assert!(!model.using_priors);
    assert_eq!(model.n, 3);
}

#[test]
fn unusable_samples_do_not_count() {
    // Records without dose/beverage have no TDS and are skipped, so even
    // a long history can fall back to priors.
    let mut history = History::new();
    for _ in 0..4 {
        let mut rec = trial(5.0, 28.0, 5.0);
        rec.params.beverage_mass = 0.0;
        history.record(rec);
    }
    let model = compute_model(&history);
    assert!(model.using_priors);
    assert_eq!(model.n, 0);
}

/// With overwhelming regularization the solution collapses to the prior.
#[test]
fn huge_lambda_returns_prior() {
    let rows: Vec<[f64; RIDGE_DIM]> = vec![
        ridge_features(&BrewParams::default()),
        ridge_features(&BrewParams {
            grind_size: 7.0,
            ..BrewParams::default()
        }),
        ridge_features(&BrewParams {
            time: 34.0,
            ..BrewParams::default()
        }),
    ];
    let y = vec![9.0, 11.0, 10.0];
    let lambda = [1e12; RIDGE_DIM];
    let w = ridge_solve_prior(&rows, &y, &lambda, &TDS_PRIOR);
    for (wi, pi) in w.iter().zip(&TDS_PRIOR) {
        assert!((wi - pi).abs() < 1e-4, "{wi} vs {pi}");
    }
}

/// With vanishing regularization and enough independent samples the fit
/// reproduces an exact linear target (ordinary least squares).
#[test]
fn tiny_lambda_recovers_linear_target() {
    let true_w = [2.0, -0.4, 0.1, 0.05, 0.02, 0.8];
    let mut rows = Vec::new();
    let mut y = Vec::new();
    // Vary every feature so the design matrix is well conditioned.
    for (i, (grind, tamp)) in [(3.0, 4.0), (5.0, 5.0), (7.0, 6.0), (4.0, 7.0), (6.0, 3.0), (8.0, 5.5), (2.0, 4.5), (5.5, 6.5)]
        .into_iter()
        .enumerate()
    {
        let p = BrewParams {
            grind_size: grind,
            tamp_pressure: tamp,
            dose_coffee: 16.0 + i as f64 * 0.5,
            time: 24.0 + i as f64,
            beverage_mass: 30.0 + (i as f64 * 2.7) % 11.0,
            ..BrewParams::default()
        };
        let f = ridge_features(&p);
        y.push(dot(&true_w, &f));
        rows.push(f);
    }
    let lambda = [1e-9; RIDGE_DIM];
    let prior = [0.0; RIDGE_DIM];
    let w = ridge_solve_prior(&rows, &y, &lambda, &prior);
    for (f, target) in rows.iter().zip(&y) {
        let pred = dot(&w, f);
        assert!((pred - target).abs() < 1e-6, "{pred} vs {target}");
    }
}

#[test]
fn influence_ranks_all_five_features_descending() {
    let model = ridge::PredictiveModel::priors();
    let ranked = rank_influence(&model);
    assert_eq!(ranked.len(), 5);
    assert!(ranked.windows(2).all(|w| w[0].weight >= w[1].weight));
    // Under the priors, grind carries by far the largest mean |weight|.
    assert_eq!(ranked[0].name, "grind");
}

#[test]
fn taste_score_matches_model_target() {
    let rec = trial(5.0, 28.0, 10.0);
    assert!((taste_score(&rec.positives, &rec.defects) - 1.0).abs() < 1e-12);
}
