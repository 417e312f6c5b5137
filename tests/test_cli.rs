//! Tests for CLI argument parsing and end-to-end binary runs

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use stateforest::cli::{Cli, Commands};
use std::path::PathBuf;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["stateforest", "-i", "patients.csv"]);

    assert_eq!(cli.test_size, 0.2, "Default test size should be 0.2");
    assert_eq!(cli.seed, 1, "Default seed should be 1");
    assert_eq!(cli.n_trees, 300, "Default forest size should be 300");
    assert_eq!(cli.max_depth, None, "Trees should be unbounded by default");
    assert_eq!(cli.top_features, 30);
    assert_eq!(cli.tree_index, 5);
    assert_eq!(cli.reference_year, None);
    assert!(!cli.impute_from_train);
    assert!(!cli.drop_unmapped);
    assert!(!cli.no_confirm);
    assert_eq!(cli.infer_schema_length, 10000);
}

#[test]
fn test_cli_custom_values() {
    let cli = Cli::parse_from([
        "stateforest",
        "-i",
        "patients.csv",
        "--test-size",
        "0.3",
        "--seed",
        "42",
        "--n-trees",
        "50",
        "--max-depth",
        "8",
        "--reference-year",
        "2020",
        "--impute-from-train",
        "--drop-unmapped",
        "--min-samples-leaf",
        "3",
    ]);

    assert_eq!(cli.test_size, 0.3);
    assert_eq!(cli.seed, 42);
    assert_eq!(cli.n_trees, 50);
    assert_eq!(cli.max_depth, Some(8));
    assert_eq!(cli.reference_year, Some(2020));
    assert!(cli.impute_from_train);
    assert!(cli.drop_unmapped);
    assert_eq!(cli.min_samples_leaf, 3);
    assert_eq!(cli.min_samples_split, 2);
}

#[test]
fn test_cli_output_path_derivation() {
    let cli = Cli::parse_from(["stateforest", "-i", "/data/patients.csv"]);
    assert_eq!(
        cli.output_path().unwrap(),
        PathBuf::from("/data/patients_rf_report.json")
    );

    let cli = Cli::parse_from(["stateforest", "-i", "/data/patients.csv", "-o", "/tmp/out.json"]);
    assert_eq!(cli.output_path().unwrap(), PathBuf::from("/tmp/out.json"));
}

#[test]
fn test_cli_rejects_invalid_test_size() {
    assert!(Cli::try_parse_from(["stateforest", "-i", "a.csv", "--test-size", "0"]).is_err());
    assert!(Cli::try_parse_from(["stateforest", "-i", "a.csv", "--test-size", "1.0"]).is_err());
    assert!(Cli::try_parse_from(["stateforest", "-i", "a.csv", "--test-size", "abc"]).is_err());
}

#[test]
fn test_cli_rejects_zero_trees() {
    assert!(Cli::try_parse_from(["stateforest", "-i", "a.csv", "--n-trees", "0"]).is_err());
}

#[test]
fn test_cli_rejects_degenerate_min_samples() {
    let err = Cli::try_parse_from(["stateforest", "-i", "a.csv", "--min-samples-split", "1"]).unwrap_err();
    assert!(err.to_string().contains("min_samples_split must be at least 2"));
    let err = Cli::try_parse_from(["stateforest", "-i", "a.csv", "--min-samples-leaf", "0"]).unwrap_err();
    assert!(err.to_string().contains("min_samples_leaf must be at least 1"));
}

#[test]
fn test_cli_profile_subcommand() {
    let cli = Cli::parse_from(["stateforest", "profile", "patients.parquet"]);
    match cli.command {
        Some(Commands::Profile { input, schema, .. }) => {
            assert_eq!(input, PathBuf::from("patients.parquet"));
            assert!(schema.is_none());
        }
        _ => panic!("Expected the profile subcommand"),
    }
}

#[test]
fn test_cli_no_input_returns_none() {
    let cli = Cli::parse_from(["stateforest"]);
    assert!(cli.input().is_none());
    assert!(cli.output_path().is_none());
}

#[test]
fn test_binary_writes_report() {
    let mut df = create_patient_dataframe(60);
    let (temp_dir, csv_path) = create_temp_csv(&mut df);
    let report_path = temp_dir.path().join("report.json");
    let dot_path = temp_dir.path().join("tree.dot");

    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["-i", csv_path.to_str().unwrap()])
        .args(["-o", report_path.to_str().unwrap()])
        .args(["--n-trees", "6", "--tree-index", "5", "--reference-year", "2024"])
        .args(["--tree-dot", dot_path.to_str().unwrap()])
        .arg("--no-confirm")
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["split"]["test_rows"], 12);
    assert_eq!(json["split"]["train_rows"], 48);
    assert_eq!(json["metadata"]["settings"]["reference_year"], 2024);
    let accuracy = json["evaluation"]["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    assert!(!json["feature_importance"].as_array().unwrap().is_empty());

    // Value statistics describe the cleaned table, so no column has gaps
    assert_eq!(json["cleaned_profile"]["rows"], 60);
    for summary in json["cleaned_profile"]["numeric_summary"].as_array().unwrap() {
        assert_eq!(summary["count"], 60, "{}", summary["column"]);
    }
    let names = json["correlation"]["names"].as_array().unwrap();
    assert!(names.iter().any(|n| n == "n_age"));
    assert!(json["profile"]["null_counts"].as_array().unwrap().len() == 18);

    let dot = std::fs::read_to_string(&dot_path).unwrap();
    assert!(dot.starts_with("digraph Tree {"));
}

#[test]
fn test_binary_fails_on_unmapped_outcomes() {
    let mut df = create_patient_dataframe_with_unmapped(40);
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["-i", csv_path.to_str().unwrap()])
        .args(["--n-trees", "3", "--reference-year", "2024", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the mapping"));
}

#[test]
fn test_binary_drops_unmapped_when_asked() {
    let mut df = create_patient_dataframe_with_unmapped(40);
    let (temp_dir, csv_path) = create_temp_csv(&mut df);
    let report_path = temp_dir.path().join("report.json");

    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["-i", csv_path.to_str().unwrap()])
        .args(["-o", report_path.to_str().unwrap()])
        .args(["--n-trees", "3", "--reference-year", "2024"])
        .args(["--drop-unmapped", "--no-confirm"])
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["split"]["dropped_unmapped_rows"], 2);
}

#[test]
fn test_binary_missing_input_fails() {
    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["-i", "/nonexistent/patients.csv", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_binary_profile_subcommand() {
    let mut df = create_patient_dataframe(30);
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["profile", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("DATASET PROFILE").and(predicate::str::contains("released")));
}

#[test]
fn test_binary_rejects_zero_min_samples_leaf() {
    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["-i", "patients.csv", "--min-samples-leaf", "0", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_samples_leaf must be at least 1"));
}

#[test]
fn test_binary_tree_demo_writes_iris_tree() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dot_path = temp_dir.path().join("iris_tree.dot");

    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["tree-demo", "-o", dot_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("150"));

    let dot = std::fs::read_to_string(&dot_path).unwrap();
    assert!(dot.starts_with("digraph Tree {"));
    assert!(dot.contains("petal") || dot.contains("sepal"));
    assert!(dot.contains("setosa"));
}

#[test]
fn test_binary_tree_demo_rejects_missing_tree() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dot_path = temp_dir.path().join("iris_tree.dot");

    Command::cargo_bin("stateforest")
        .unwrap()
        .args(["tree-demo", "-o", dot_path.to_str().unwrap(), "--n-trees", "3"])
        .assert()
        .failure();
    assert!(!dot_path.exists());
}
