use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn dialin(history: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dialin").unwrap();
    // Point at a config that does not exist so defaults apply, and keep
    // the history inside the temp dir.
    cmd.arg("--config")
        .arg(history.parent().unwrap().join("missing.toml"))
        .arg("--history")
        .arg(history);
    cmd
}

#[test]
fn analyze_prints_suggestion_and_appends_history() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.csv");

    dialin(&history)
        .args(["analyze", "--sour", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grind finer"));
    assert!(history.exists(), "history CSV should be created");

    dialin(&history)
        .args(["analyze", "--bitter", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grind coarser"));

    let text = std::fs::read_to_string(&history).unwrap();
    // Header + two rows.
    assert_eq!(text.lines().count(), 3, "{text}");
}

#[test]
fn analyze_dry_run_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.csv");
    dialin(&history)
        .args(["analyze", "--dry-run"])
        .assert()
        .success();
    assert!(!history.exists());
}

#[test]
fn analyze_json_has_principal_key() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.csv");
    let out = dialin(&history)
        .args(["--json", "analyze", "--sour", "8", "--dry-run"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(v["principal"]["key"], "grind_finer");
    assert_eq!(v["model"]["using_priors"], true);
    assert_eq!(v["recorded"], false);
}

#[test]
fn suggest_needs_three_trials() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.csv");
    dialin(&history)
        .args(["analyze", "--sour", "6"])
        .assert()
        .success();

    dialin(&history)
        .args(["suggest", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not enough history"));
}

#[test]
fn suggest_with_seed_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.csv");
    for (flag, level) in [("--sour", "7"), ("--bitter", "2"), ("--balanced", "8")] {
        dialin(&history)
            .args(["analyze", flag, level])
            .assert()
            .success();
    }

    let run = || {
        let out = dialin(&history)
            .args(["--json", "suggest", "--seed", "42"])
            .output()
            .unwrap();
        assert!(out.status.success());
        String::from_utf8(out.stdout).unwrap()
    };
    let a = run();
    let b = run();
    assert_eq!(a, b);

    let v: serde_json::Value = serde_json::from_str(a.trim()).unwrap();
    let s = &v["suggestion"];
    assert!(!s.is_null(), "expected a suggestion: {v}");
    let grind = s["grind_size"].as_f64().unwrap();
    assert!((0.0..=10.0).contains(&grind));
    let tamp = s["tamp_pressure"].as_f64().unwrap();
    assert!((1.0..=8.0).contains(&tamp));
}

#[test]
fn delete_removes_entry() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.csv");
    dialin(&history).args(["analyze"]).assert().success();
    dialin(&history).args(["analyze"]).assert().success();

    dialin(&history)
        .args(["delete", "--index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 remain"));

    dialin(&history)
        .args(["delete", "--index", "5"])
        .assert()
        .failure();
}

#[test]
fn export_writes_csv_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.csv");
    dialin(&history).args(["analyze"]).assert().success();

    dialin(&history)
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("timestamp,grind_size,dose_coffee"));
}
