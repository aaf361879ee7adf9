//! Integration tests for the cohortgrade CLI
//!
//! These tests run the cohortgrade binary against signal files in a
//! temporary directory.

use std::fs;
use std::path::Path;

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use tempfile::tempdir;

/// Get a Command for cohortgrade, isolated from any global config
fn cohortgrade(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("cohortgrade");
    cmd.current_dir(dir)
        .env("COHORTGRADE_CONFIG_DIR", dir.join("global-config"))
        .env_remove("COHORTGRADE_CONFIG")
        .env_remove("RUST_LOG")
        .env_remove("COHORTGRADE_LOG");
    cmd
}

const SCENARIO: &str = r#"{
  "entities": [
    {"id": "entity-1", "criteria": ["A", "B"]},
    {"id": "entity-2", "criteria": ["A"]},
    {"id": "entity-3", "criteria": []}
  ]
}"#;

fn write_scenario(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("cohort.json");
    fs::write(&path, SCENARIO).unwrap();
    path
}

// ============================================================================
// Help and init
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let dir = tempdir().unwrap();
    cohortgrade(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: cohortgrade"))
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("grade"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn test_init_writes_config_and_refuses_overwrite() {
    let dir = tempdir().unwrap();

    cohortgrade(dir.path()).arg("init").assert().success();
    let content = fs::read_to_string(dir.path().join("cohortgrade.toml")).unwrap();
    assert!(content.contains("[rarity]"));
    assert!(content.contains("threshold = 0.15"));

    cohortgrade(dir.path())
        .arg("init")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("--force"));

    cohortgrade(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

// ============================================================================
// grade
// ============================================================================

#[test]
fn test_grade_scenario_json() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());

    let output = cohortgrade(dir.path())
        .args(["--format", "json", "grade", "--rarity-threshold", "0.34"])
        .arg(&cohort)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let grades = report["grades"].as_array().unwrap();
    assert_eq!(grades.len(), 3);
    assert_eq!(grades[0]["entity_id"], "entity-1");
    assert_eq!(grades[0]["grade"], 100.0);
    assert_eq!(grades[0]["rank"], 1);
    assert_eq!(grades[1]["rank"], 2);
    assert!((grades[1]["grade"].as_f64().unwrap() - 33.333).abs() < 0.01);
    assert_eq!(grades[2]["grade"], 0.0);
    assert_eq!(grades[2]["rank"], 3);
    assert_eq!(report["graph"]["criteria"]["b"]["rare"], true);
}

#[test]
fn test_grade_human_and_records() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());

    cohortgrade(dir.path())
        .arg("grade")
        .arg(&cohort)
        .assert()
        .success()
        .stdout(predicate::str::contains("Graded 3 of 3 entities"))
        .stdout(predicate::str::contains("entity-1"));

    cohortgrade(dir.path())
        .args(["--format", "records", "grade", "--top", "1"])
        .arg(&cohort)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("H cohortgrade="))
        .stdout(predicate::str::contains("G \"entity-1\" rank=1 grade=100.00"))
        .stdout(predicate::str::contains("G \"entity-2\"").not());
}

#[test]
fn test_grade_config_file_is_used() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());
    fs::write(
        dir.path().join("cohortgrade.toml"),
        "[grading]\npolicy = \"additive\"\n",
    )
    .unwrap();

    cohortgrade(dir.path())
        .args(["--format", "records", "grade"])
        .arg(&cohort)
        .assert()
        .success()
        .stdout(predicate::str::contains("policy=additive"));
}

#[test]
fn test_grade_directory_skips_broken_entity() {
    let dir = tempdir().unwrap();
    let signals = dir.path().join("signals");
    fs::create_dir(&signals).unwrap();
    fs::write(signals.join("alice.yaml"), "criteria: [readme, unit tests]\n").unwrap();
    fs::write(signals.join("bob.yaml"), "criteria: [readme]\n").unwrap();
    fs::write(signals.join("carol.json"), "{ nope").unwrap();

    cohortgrade(dir.path())
        .arg("grade")
        .arg(&signals)
        .assert()
        .success()
        .stdout(predicate::str::contains("Graded 2 of 3 entities"))
        .stdout(predicate::str::contains("carol (extraction)"));
}

#[test]
fn test_grade_all_entities_failing_exits_3() {
    let dir = tempdir().unwrap();
    let signals = dir.path().join("signals");
    fs::create_dir(&signals).unwrap();
    fs::write(signals.join("alice.json"), "{ nope").unwrap();

    cohortgrade(dir.path())
        .args(["--format", "json", "grade"])
        .arg(&signals)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("\"type\":\"invalid_input\""))
        .stderr(predicate::str::contains("\"stage\":\"extraction\""));
}

#[test]
fn test_grade_invalid_threshold_is_usage_error() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());

    cohortgrade(dir.path())
        .args(["grade", "--rarity-threshold", "1.5"])
        .arg(&cohort)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rarity threshold"));
}

#[test]
fn test_unknown_policy_rejected() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());

    cohortgrade(dir.path())
        .args(["grade", "--policy", "linear"])
        .arg(&cohort)
        .assert()
        .code(2);
}

#[test]
fn test_missing_signals_is_not_found() {
    let dir = tempdir().unwrap();
    cohortgrade(dir.path())
        .args(["grade", "missing.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// discover
// ============================================================================

#[test]
fn test_discover_saves_vocabulary() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());
    let out = dir.path().join("out/discovered_criteria.yml");

    cohortgrade(dir.path())
        .args(["discover", "--window-size", "1", "--output"])
        .arg(&out)
        .arg(&cohort)
        .assert()
        .success()
        .stdout(predicate::str::contains("Discovered 2 criteria across 3 entities"))
        .stdout(predicate::str::contains("[NEW] entity-1 added A"));

    let yaml = fs::read_to_string(&out).unwrap();
    assert!(yaml.contains("criteria:"));
    assert!(yaml.contains("evolution:"));
}

#[test]
fn test_discover_zero_window_rejected() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());

    cohortgrade(dir.path())
        .args(["discover", "--window-size", "0"])
        .arg(&cohort)
        .assert()
        .code(2);
}

// ============================================================================
// criteria and compare
// ============================================================================

#[test]
fn test_criteria_and_compare_saved_reports() {
    let dir = tempdir().unwrap();
    let cohort = write_scenario(dir.path());
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    cohortgrade(dir.path())
        .args(["-q", "grade", "--output"])
        .arg(&first)
        .arg(&cohort)
        .assert()
        .success();
    cohortgrade(dir.path())
        .args(["-q", "grade", "--rarity-threshold", "0.34", "--output"])
        .arg(&second)
        .arg(&cohort)
        .assert()
        .success();

    cohortgrade(dir.path())
        .args(["criteria", "--rare"])
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 criteria over 3 entities"))
        .stdout(predicate::str::contains("rare"));

    let output = cohortgrade(dir.path())
        .args(["--format", "json", "compare"])
        .arg(&first)
        .arg(&second)
        .output()
        .unwrap();
    assert!(output.status.success());
    let comparison: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(comparison["same_input"], true);
    assert_eq!(comparison["weight_changes"][0]["key"], "b");
}

#[test]
fn test_corrupt_report_exits_3() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{\"graph\": {}}").unwrap();

    cohortgrade(dir.path())
        .arg("criteria")
        .arg(&bad)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("corrupt report"));
}
