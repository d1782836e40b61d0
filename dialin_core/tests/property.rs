use dialin_core::estimate::{estimate_ey, estimate_tds};
use dialin_core::features::taste_score;
use dialin_core::grinder::{abs_to_dial, dial_abs};
use dialin_core::types::{BrewParams, Defects, Positives, PrepFlags};
use proptest::prelude::*;

prop_compose! {
    fn params_strategy()(
        grind in 0.0f64..=10.0,
        dose in 5.0f64..=30.0,
        basket in 5.0f64..=30.0,
        time in 15.0f64..=40.0,
        beverage in 1.0f64..=150.0,
        temp in 80.0f64..=100.0,
        tamp in 1.0f64..=8.0,
    ) -> BrewParams {
        BrewParams {
            grind_size: grind,
            dose_coffee: dose,
            basket_size: basket,
            time,
            beverage_mass: beverage,
            tds: None,
            temp,
            tamp_pressure: tamp,
        }
    }
}

prop_compose! {
    fn extras_strategy()(
        freshness in any::<bool>(),
        bad_distribution in any::<bool>(),
        uneven_tamp in any::<bool>(),
        inaccurate_dose in any::<bool>(),
        broken_puck in any::<bool>(),
    ) -> PrepFlags {
        PrepFlags { freshness, bad_distribution, uneven_tamp, inaccurate_dose, broken_puck }
    }
}

proptest! {
    #[test]
    fn ey_estimate_stays_in_clamp_window(p in params_strategy(), extras in extras_strategy()) {
        let ey = estimate_ey(&p, &extras, p.ratio());
        prop_assert!((10.0..=30.0).contains(&ey));
    }

    #[test]
    fn tds_estimate_stays_in_clamp_window_or_is_unavailable(
        p in params_strategy(),
        extras in extras_strategy(),
    ) {
        let ey = estimate_ey(&p, &extras, p.ratio());
        match estimate_tds(&p, Some(ey)) {
            Some(tds) => prop_assert!((4.0..=14.0).contains(&tds)),
            None => prop_assert!(p.dose_coffee <= 0.0 || p.beverage_mass <= 0.0),
        }
    }

    #[test]
    fn taste_score_bounded(
        pos in proptest::array::uniform4(0.0f64..=10.0),
        neg in proptest::array::uniform5(0.0f64..=10.0),
    ) {
        let positives = Positives { balanced: pos[0], body: pos[1], aroma: pos[2], sweetness: pos[3] };
        let defects = Defects { sour: neg[0], bitter: neg[1], astringent: neg[2], weak: neg[3], harsh: neg[4] };
        let s = taste_score(&positives, &defects);
        prop_assert!((-1.0..=1.0).contains(&s));
    }

    #[test]
    fn dial_inversion_invariant(
        dial in 0.0f64..10.0,
        turns in 0u32..50,
        per_rev in 1.0f64..=100.0,
    ) {
        let dial = dial.min(per_rev - 1e-6);
        let abs = dial_abs(dial, turns, per_rev);
        let pos = abs_to_dial(abs, per_rev);
        prop_assert!(pos.dial_number >= 0.0);
        prop_assert!(pos.dial_number < per_rev, "dial {} >= per_rev {}", pos.dial_number, per_rev);
        // The recovered absolute position matches up to display rounding.
        let abs_back = dial_abs(pos.dial_number, pos.extra_turns, per_rev);
        prop_assert!((abs_back - abs).abs() <= 0.05 + 1e-9);
    }
}
