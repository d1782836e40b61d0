use dialin_config::trial_csv::{TrialRow, read_path, write_path};

fn row(timestamp: &str, grind: f64) -> TrialRow {
    TrialRow {
        timestamp: timestamp.into(),
        grind_size: grind,
        dose_coffee: 18.0,
        basket_size: 18.0,
        time: 28.0,
        beverage_mass: 36.0,
        tds: None,
        temp: 93.0,
        tamp_pressure: 5.0,
        ey: None,
        ratio: Some(2.0),
        flow: Some(1.29),
        sour: 0.0,
        bitter: 3.0,
        astringent: 0.0,
        weak: 0.0,
        harsh: 0.0,
        balanced: 6.0,
        body: 5.0,
        aroma: 5.0,
        sweetness: 4.0,
        freshness: 0,
        bad_distribution: 0,
        uneven_tamp: 0,
        inaccurate_dose: 0,
        broken_puck: 0,
        use_measured_tds: 0,
        grinder_kind: "stepless".into(),
        per_rev_max: 10.0,
        dial_number: 3.0,
        extra_turns: 0,
        high_dial_means_coarser: 1,
        suggestion: Some("Grind coarser: 5.0 \u{2192} 5.2".into()),
    }
}

#[test]
fn file_roundtrip_preserves_order_and_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    let rows = vec![row("2026-08-02T10:00:00Z", 4.8), row("2026-08-01T09:00:00Z", 5.0)];
    write_path(&path, &rows).unwrap();
    let back = read_path(&path).unwrap();
    assert_eq!(back, rows);
}

#[test]
fn missing_file_is_an_error_with_path_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    let err = read_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("nope.csv"));
}

#[test]
fn overwrite_replaces_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    write_path(&path, &[row("a", 5.0), row("b", 5.0)]).unwrap();
    write_path(&path, &[row("c", 5.0)]).unwrap();
    let back = read_path(&path).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].timestamp, "c");
}
