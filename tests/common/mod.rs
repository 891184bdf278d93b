//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a tolstack command isolated from user and project config
pub fn tolstack(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tolstack"));
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("TOLSTACK_ITERATIONS")
        .env_remove("TOLSTACK_BINS")
        .env_remove("TOLSTACK_DEFAULT_CPK")
        .env_remove("TOLSTACK_THREADS")
        .env_remove("TOLSTACK_SEED")
        .env_remove("TOLSTACK_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Two-part gap stackup used across the CLI tests
///
/// Part A 10.0 ±0.10 (+), part B 5.0 ±0.05 (−), both cpk 1.33.
pub const GAP_STACKUP: &str = r#"id: TOL-TEST
name: Gap Test
description: Two-part gap
target_gap_nominal: 5.0
upper_spec_limit: 5.2
lower_spec_limit: 4.8
dimensions:
  - id: DIM-A
    name: Part A
    nominal: 10.0
    tol_plus: 0.1
    tol_minus: 0.1
    sign: 1
    distribution: normal
    cpk: 1.33
    type: linear
  - id: DIM-B
    name: Part B
    nominal: 5.0
    tol_plus: 0.05
    tol_minus: 0.05
    sign: -1
    distribution: normal
    cpk: 1.33
    type: linear
"#;

/// Write `content` to `name` inside a fresh temp directory
pub fn write_stackup(name: &str, content: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    std::fs::write(&path, content).unwrap();
    (tmp, path)
}

/// Temp directory holding the gap stackup as `gap.yaml`
pub fn gap_stackup() -> (TempDir, PathBuf) {
    write_stackup("gap.yaml", GAP_STACKUP)
}
