//! End-to-end tests of the tolstack binary

mod common;

use common::{gap_stackup, tolstack, write_stackup};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use tolstack::entities::{Distribution, Sign, StackupConfig};

// ============================================================================
// General
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("dim"))
        .stdout(predicate::str::contains("limits"));
}

#[test]
fn test_version_flag() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tolstack"));
}

// ============================================================================
// new / dim
// ============================================================================

#[test]
fn test_new_creates_stackup_file() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .args(["new", "lid.yaml", "--name", "Lid gap", "--usl", "0.5", "--lsl", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created stackup"));

    let stackup = StackupConfig::load(&tmp.path().join("lid.yaml")).unwrap();
    assert_eq!(stackup.name, "Lid gap");
    assert_eq!(stackup.upper_spec_limit, Some(0.5));
    assert_eq!(stackup.lower_spec_limit, Some(0.1));
    assert!(stackup.id.starts_with("TOL-"));
    assert!(stackup.dimensions.is_empty());
}

#[test]
fn test_new_refuses_to_overwrite() {
    let (tmp, _) = gap_stackup();
    tolstack(&tmp)
        .args(["new", "gap.yaml", "--name", "Again"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tolstack(&tmp)
        .args(["new", "gap.yaml", "--name", "Again", "--force"])
        .assert()
        .success();
}

#[test]
fn test_new_rejects_inverted_limits() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .args(["new", "bad.yaml", "--name", "Bad", "--usl", "1", "--lsl", "2"])
        .assert()
        .failure();
    assert!(!tmp.path().join("bad.yaml").exists());
}

#[test]
fn test_dim_add_list_and_remove() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .args(["new", "s.json", "--name", "JSON stack"])
        .assert()
        .success();

    tolstack(&tmp)
        .args([
            "dim", "add", "s.json", "--name", "Housing", "--nominal", "20", "--plus", "0.1",
            "--minus", "0.05", "--dist", "uniform", "--id", "DIM-H",
        ])
        .assert()
        .success();
    tolstack(&tmp)
        .args([
            "dim", "add", "s.json", "--name", "Shaft", "--nominal", "19.5", "--negative",
            "--process", "grinding",
        ])
        .assert()
        .success();

    let stackup = StackupConfig::load(&tmp.path().join("s.json")).unwrap();
    assert_eq!(stackup.dimensions.len(), 2);
    assert_eq!(stackup.dimensions[0].distribution, Distribution::Uniform);
    assert_eq!(stackup.dimensions[1].sign, Sign::Negative);
    assert_eq!(stackup.dimensions[1].process.as_deref(), Some("Grinding"));

    tolstack(&tmp)
        .args(["dim", "list", "s.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Housing"))
        .stdout(predicate::str::contains("Shaft"));

    tolstack(&tmp)
        .args(["dim", "rm", "s.json", "DIM-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed dimension"));
    tolstack(&tmp)
        .args(["dim", "rm", "s.json", "5"])
        .assert()
        .failure();

    let stackup = StackupConfig::load(&tmp.path().join("s.json")).unwrap();
    assert_eq!(stackup.dimensions.len(), 1);
    assert_eq!(stackup.dimensions[0].name, "Shaft");
}

#[test]
fn test_dim_list_json() {
    let (tmp, _) = gap_stackup();
    let output = tolstack(&tmp)
        .args(["dim", "list", "gap.yaml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let dims: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(dims.as_array().unwrap().len(), 2);
    assert_eq!(dims[1]["sign"], -1);
    assert_eq!(dims[0]["type"], "linear");
}

#[test]
fn test_dim_add_rejects_negative_tolerance() {
    let (tmp, _) = gap_stackup();
    tolstack(&tmp)
        .args([
            "dim", "add", "gap.yaml", "--name", "Bad", "--nominal", "1", "--minus", "-0.1",
        ])
        .assert()
        .failure();

    let stackup = StackupConfig::load(&tmp.path().join("gap.yaml")).unwrap();
    assert_eq!(stackup.dimensions.len(), 2);
}

// ============================================================================
// analyze
// ============================================================================

#[test]
fn test_analyze_text_report() {
    let (tmp, _) = gap_stackup();
    tolstack(&tmp)
        .args(["analyze", "gap.yaml", "--seed", "42", "--iterations", "2000", "-S", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Worst-Case"))
        .stdout(predicate::str::contains("4.850 to 5.150"))
        .stdout(predicate::str::contains("RSS (Statistical)"))
        .stdout(predicate::str::contains("Monte Carlo"))
        .stdout(predicate::str::contains("Yield: 100.00%"))
        .stdout(predicate::str::contains("Sensitivity Analysis"))
        .stdout(predicate::str::contains("Distribution Histogram"));
}

#[test]
fn test_analyze_json_is_reproducible_with_seed() {
    let (tmp, _) = gap_stackup();
    let run = || {
        let output = tolstack(&tmp)
            .args(["analyze", "gap.yaml", "--seed", "7", "-i", "1500", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first["results"], second["results"]);
    assert_eq!(first["seed"], 7);
    assert_eq!(first["iterations"], 1500);

    let mc = &first["results"]["monte_carlo"];
    assert!(mc.get("samples").is_none());
    let total: u64 = mc["histogram"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 1500);

    let contributions = first["results"]["contributions"].as_array().unwrap();
    assert_eq!(contributions[0]["name"], "Part A");
}

#[test]
fn test_analyze_yaml_with_samples() {
    let (tmp, _) = gap_stackup();
    let output = tolstack(&tmp)
        .args([
            "analyze", "gap.yaml", "--seed", "1", "-i", "50", "--bins", "5", "--format", "yaml",
            "--samples",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_yml::Value = serde_yml::from_slice(&output.stdout).unwrap();
    let mc = &report["results"]["monte_carlo"];
    assert_eq!(mc["samples"].as_sequence().unwrap().len(), 50);
    assert_eq!(mc["histogram"].as_sequence().unwrap().len(), 5);
}

#[test]
fn test_analyze_parallel_threads() {
    let (tmp, _) = gap_stackup();
    tolstack(&tmp)
        .args(["analyze", "gap.yaml", "--seed", "3", "-i", "4000", "--threads", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4000 iterations"));
}

#[test]
fn test_analyze_thread_count_above_core_count() {
    let (tmp, _) = gap_stackup();
    tolstack(&tmp)
        .args(["analyze", "gap.yaml", "--seed", "3", "-i", "20000", "--threads", "200000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20000 iterations"));
}

#[test]
fn test_analyze_overflowing_chain_fails() {
    let yaml = r#"id: TOL-HUGE
name: Huge
dimensions:
  - id: DIM-A
    name: A
    nominal: 1.0e+308
    tol_plus: 1.0e+308
    tol_minus: 1.0e+308
    sign: 1
    distribution: normal
  - id: DIM-B
    name: B
    nominal: 1.0e+308
    tol_plus: 0.0
    tol_minus: 0.0
    sign: 1
    distribution: normal
"#;
    let (tmp, _) = write_stackup("huge.yaml", yaml);
    tolstack(&tmp)
        .args(["analyze", "huge.yaml", "-i", "100", "--format", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overflowed"));
}

#[test]
fn test_analyze_writes_csv() {
    let (tmp, _) = gap_stackup();
    tolstack(&tmp)
        .args(["analyze", "gap.yaml", "--seed", "9", "-i", "100", "--csv", "samples.csv"])
        .assert()
        .success();

    let content = fs::read_to_string(tmp.path().join("samples.csv")).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("sample,value,in_spec"));
    assert_eq!(lines.count(), 100);
}

#[test]
fn test_analyze_empty_stackup_fails() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .args(["new", "empty.yaml", "--name", "Empty"])
        .assert()
        .success();
    tolstack(&tmp)
        .args(["analyze", "empty.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no dimensions"));
}

#[test]
fn test_analyze_zero_iterations_fails() {
    let (tmp, _) = gap_stackup();
    tolstack(&tmp)
        .args(["analyze", "gap.yaml", "--iterations", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Iteration count"));
}

#[test]
fn test_analyze_uses_project_config() {
    let (tmp, _) = gap_stackup();
    fs::create_dir_all(tmp.path().join(".tolstack")).unwrap();
    fs::write(
        tmp.path().join(".tolstack/config.yaml"),
        "iterations: 321\nbins: 8\nseed: 11\n",
    )
    .unwrap();

    let output = tolstack(&tmp)
        .args(["analyze", "gap.yaml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["iterations"], 321);
    assert_eq!(report["seed"], 11);
    assert_eq!(report["results"]["monte_carlo"]["histogram"].as_array().unwrap().len(), 8);

    // Flags and environment outrank the project file
    let output = tolstack(&tmp)
        .env("TOLSTACK_ITERATIONS", "77")
        .args(["analyze", "gap.yaml", "--format", "json", "--bins", "3"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["iterations"], 77);
    assert_eq!(report["results"]["monte_carlo"]["histogram"].as_array().unwrap().len(), 3);
}

#[test]
fn test_analyze_reads_legacy_json() {
    let json = r#"{"id":"s1","name":"Legacy","description":"","targetGapNominal":0,
        "upperSpecLimit":0.6,"lowerSpecLimit":0.4,
        "dimensions":[
          {"id":"a","name":"A","nominal":10,"tolPlus":0.02,"tolMinus":0.02,"sign":1,"distribution":"Normal","type":"Linear"},
          {"id":"b","name":"B","nominal":9.5,"tolPlus":0.02,"tolMinus":0.02,"sign":-1,"distribution":"Trapezoidal","type":"Linear"}
        ]}"#;
    let (tmp, _) = write_stackup("legacy.json", json);
    tolstack(&tmp)
        .args(["analyze", "legacy.json", "--seed", "5", "-i", "500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Yield: 100.00%"));
}

// ============================================================================
// limits / validate / processes / completions
// ============================================================================

#[test]
fn test_limits_suggest_and_write() {
    let (tmp, path) = gap_stackup();
    tolstack(&tmp)
        .args(["limits", "gap.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LSL: 4.92"))
        .stdout(predicate::str::contains("USL: 5.08"));

    tolstack(&tmp)
        .args(["limits", "gap.yaml", "--write"])
        .assert()
        .success();
    let stackup = StackupConfig::load(&path).unwrap();
    assert_eq!(stackup.lower_spec_limit, Some(4.92));
    assert_eq!(stackup.upper_spec_limit, Some(5.08));
}

#[test]
fn test_validate_reports_each_file() {
    let (tmp, _) = gap_stackup();
    let bad = GAP_WITH_BAD_CPK;
    fs::write(tmp.path().join("bad.yaml"), bad).unwrap();

    tolstack(&tmp)
        .args(["validate", "gap.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed"));

    tolstack(&tmp)
        .args(["validate", ".", "--keep-going"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("bad.yaml"))
        .stdout(predicate::str::contains("cpk"))
        .stderr(predicate::str::contains("1 file has errors"));
}

const GAP_WITH_BAD_CPK: &str = r#"id: TOL-BAD
name: Bad
dimensions:
  - id: DIM-X
    name: X
    nominal: 1.0
    tol_plus: 0.1
    tol_minus: 0.1
    cpk: 0
"#;

#[test]
fn test_validate_rejects_unknown_distribution() {
    let content = common::GAP_STACKUP.replacen("distribution: normal", "distribution: gamma", 1);
    let (tmp, _) = write_stackup("gamma.yaml", &content);
    tolstack(&tmp)
        .args(["validate", "gamma.yaml"])
        .assert()
        .failure();
}

#[test]
fn test_processes_table() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .arg("processes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Grinding"))
        .stdout(predicate::str::contains("IT7"));

    let output = tolstack(&tmp)
        .args(["processes", "--format", "json"])
        .output()
        .unwrap();
    let tables: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tables["processes"].as_array().unwrap().len(), 9);
    assert_eq!(tables["it_grades"].as_array().unwrap().len(), 5);
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    tolstack(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tolstack"));
}
