//! History validation and error handling tests for cadence.
//!
//! These tests verify the CLI can handle:
//! - Invalid records mixed into an otherwise valid history
//! - Unreadable history files
//! - Invalid configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("cadence"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn empty_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, "").expect("Failed to write config");
    path
}

#[test]
fn test_check_clean_history() {
    let temp_dir = setup_test_dir();
    let config = empty_config(&temp_dir);
    let history = temp_dir.path().join("cycles.csv");
    fs::write(
        &history,
        "start_date,end_date,cycle_length,period_duration\n\
         2024-01-01,2024-01-29,28,5\n\
         2024-01-29,2024-02-26,,5\n",
    )
    .unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("--history")
        .arg(&history)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 cycles accepted"))
        .stdout(predicate::str::contains("0 records rejected"));
}

#[test]
fn test_check_reports_invalid_records() {
    let temp_dir = setup_test_dir();
    let config = empty_config(&temp_dir);
    let history = temp_dir.path().join("cycles.csv");
    fs::write(
        &history,
        "start_date,end_date,cycle_length,period_duration\n\
         2024-01-01,2024-01-29,28,5\n\
         2024-01-29,2024-02-14,16,5\n\
         2024-02-26,2024-03-25,28,5\n",
    )
    .unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("--history")
        .arg(&history)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("2 cycles accepted"))
        .stdout(predicate::str::contains("1 records rejected"))
        .stdout(predicate::str::contains("line 3"))
        .stdout(predicate::str::contains("cycle length 16"));
}

#[test]
fn test_check_json_lists_rejections() {
    let temp_dir = setup_test_dir();
    let config = empty_config(&temp_dir);
    let history = temp_dir.path().join("cycles.csv");
    fs::write(
        &history,
        "start_date,end_date,cycle_length,period_duration\n\
         2024-01-01,2024-01-29,28,12\n",
    )
    .unwrap();

    let output = cli()
        .arg("--config")
        .arg(&config)
        .arg("--history")
        .arg(&history)
        .arg("check")
        .arg("--json")
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(report["accepted"], 0);
    assert_eq!(report["rejected"][0]["line"], 2);
}

#[test]
fn test_invalid_records_skipped_by_predict() {
    let temp_dir = setup_test_dir();
    let config = empty_config(&temp_dir);
    let history = temp_dir.path().join("cycles.csv");
    fs::write(
        &history,
        "start_date,end_date,cycle_length,period_duration\n\
         2024-01-01,2024-01-29,28,5\n\
         garbage,row,here,!\n\
         2024-01-29,2024-02-26,28,5\n\
         2024-02-26,2024-03-25,28,5\n",
    )
    .unwrap();

    // Bad rows are warned about and left out of the prediction
    cli()
        .arg("--config")
        .arg(&config)
        .arg("--history")
        .arg(&history)
        .arg("predict")
        .arg("--today")
        .arg("2024-04-12")
        .assert()
        .success()
        .stdout(predicate::str::contains("Based on 3 cycles"))
        .stderr(predicate::str::contains("Skipping history record"));
}

#[test]
fn test_malformed_json_history_fails() {
    let temp_dir = setup_test_dir();
    let config = empty_config(&temp_dir);
    let history = temp_dir.path().join("cycles.json");
    fs::write(&history, "{ not an array }").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("--history")
        .arg(&history)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = setup_test_dir();
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[prediction]\nluteal_phase_days = 2\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("predict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("luteal_phase_days"));
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--config")
        .arg(temp_dir.path().join("nonexistent.toml"))
        .arg("predict")
        .assert()
        .failure();
}
