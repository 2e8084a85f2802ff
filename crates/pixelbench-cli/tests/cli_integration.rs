//! Integration tests for the pixelbench CLI

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a config that keeps every store inside `dir`
fn isolated_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.json");
    pixelbench::Config::isolated(dir.path()).save(&path).unwrap();
    path
}

fn pixelbench(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pixelbench").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

/// Test basic help command
#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("pixelbench").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Benchmark interpreted vs compiled"))
        .stdout(predicate::str::contains("history"));
}

/// Test version command
#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("pixelbench").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pixelbench"));
}

#[test]
fn test_unknown_scenario() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args(["run", "blur"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario"));
}

#[test]
fn test_invalid_color() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args(["run", "invert", "--color", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected R,G,B,A"));
}

#[test]
fn test_missing_config_file() {
    let mut cmd = Command::cargo_bin("pixelbench").unwrap();
    cmd.args(["--config", "does-not-exist.json", "config"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_config_prints_json() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_runs\": 10"))
        .stdout(predicate::str::contains("\"tolerance\": 1"));
}

#[test]
fn test_run_history_clear_cycle() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args([
            "run", "invert", "--width", "32", "--height", "32", "--pattern", "solid", "-n", "3",
            "--format", "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"match\""))
        .stdout(predicate::str::contains("\"trialCount\": 3"));

    pixelbench(&config)
        .args(["history", "invert", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"js\""))
        .stdout(predicate::str::contains("\"wasm\""));

    pixelbench(&config)
        .args(["history", "invert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invert history (1 runs)"));

    pixelbench(&config)
        .args(["clear", "invert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared invert history"));

    pixelbench(&config)
        .args(["history", "invert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No runs recorded for invert."));
}

#[test]
fn test_run_table_output() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args([
            "run", "quantize", "--width", "24", "--height", "16", "-n", "2", "--colors", "4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("quantize on 24x16"))
        .stdout(predicate::str::contains("outputs match"))
        .stdout(predicate::str::contains("interpreted"))
        .stdout(predicate::str::contains("compiled"));
}

#[test]
fn test_zero_colors_fails() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args(["run", "quantize", "--width", "8", "--height", "8", "--colors", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantize comparison failed"));
}

#[test]
fn test_oversized_palette_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args([
            "run", "quantize", "--width", "4", "--height", "4", "--colors",
            "18446744073709551615",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantize comparison failed"))
        .stderr(predicate::str::contains("at most 256 colors"));
}

#[test]
fn test_quiet_clear_prints_nothing() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args(["clear", "invert", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    pixelbench(&config)
        .args(["clear", "invert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared invert history"));
}

#[test]
fn test_sizes_empty() {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    pixelbench(&config)
        .args(["sizes", "edge-detect", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}
