//! Smoke tests for the storeprobe CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn storeprobe() -> Command {
    let mut cmd = Command::cargo_bin("storeprobe").expect("storeprobe binary should exist");
    cmd.env_remove("RUST_LOG").arg("--color").arg("never");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    storeprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    storeprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    storeprobe().assert().failure();
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_all() {
    storeprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate_app_loads_with_empty_cart"))
        .stdout(predicate::str::contains("validate_single_purchase_valid_shipping"));
}

#[test]
fn test_list_filtered() {
    storeprobe()
        .args(["list", "--filter", "sizes|colors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("validate_change_all_sizes_all_products"))
        .stdout(predicate::str::contains("validate_double_purchase").not());
}

#[test]
fn test_list_bad_regex() {
    storeprobe()
        .args(["list", "--filter", "("])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_defaults() {
    storeprobe()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("element_ms: 15000"))
        .stdout(predicate::str::contains("platform: android"));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.yaml");
    fs::write(&path, "timeouts:\n  element_ms: 4000\nscroll:\n  max_attempts: 5\n").unwrap();
    storeprobe()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("element_ms: 4000"))
        .stdout(predicate::str::contains("max_attempts: 5"));
}

#[test]
fn test_config_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.yaml");
    fs::write(&path, "timeouts:\n  element_ms: 0\n").unwrap();
    storeprobe()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("element_ms"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_passing_scenario() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("report.json");
    storeprobe()
        .args(["run", "--filter", "empty_cart", "--timeout", "500", "--screenshots"])
        .arg(dir.path().join("shots"))
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASS validate_app_loads_with_empty_cart"))
        .stderr(predicate::str::contains("1 passed, 0 failed"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(json["scenarios"][0]["status"], "Passed");
    assert!(dir
        .path()
        .join("shots/validate_app_loads_with_empty_cart-Passed0.png")
        .exists());
}

#[test]
fn test_run_with_fault_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    storeprobe()
        .args([
            "run",
            "--filter",
            "add_all",
            "--timeout",
            "200",
            "--fault",
            "wrong_cart_price",
            "--screenshots",
        ])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FAIL validate_add_all_products_to_cart"))
        .stderr(predicate::str::contains("assertion"))
        .stderr(predicate::str::contains("1 of 1 scenarios failed"));
}

#[test]
fn test_run_fail_fast_skips() {
    let dir = TempDir::new().unwrap();
    storeprobe()
        .args([
            "run",
            "--filter",
            "add_all|double",
            "--timeout",
            "100",
            "--fault",
            "empty_catalogue",
            "--fail-fast",
            "--screenshots",
        ])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("FAIL validate_add_all_products_to_cart"))
        .stderr(predicate::str::contains("SKIP validate_double_purchase_all_products"));
}

#[test]
fn test_run_unknown_device() {
    let dir = TempDir::new().unwrap();
    storeprobe()
        .args(["run", "--filter", "empty_cart", "--device", "pixel-9", "--screenshots"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("infrastructure"));
}

#[test]
fn test_run_unknown_fault() {
    storeprobe()
        .args(["run", "--fault", "gremlins"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown fault"));
}

#[test]
fn test_run_no_match() {
    storeprobe()
        .args(["run", "--filter", "paypal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scenario matches"));
}
