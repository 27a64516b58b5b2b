//! Tests for CLI argument parsing and end-to-end runs

use assert_cmd::Command;
use clap::Parser;
use persona::cli::{Cli, Commands};
use persona::pipeline::Weighting;
use persona::report::load_segment_table;
use predicates::prelude::*;
use std::path::PathBuf;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["persona", "-i", "persona.csv"]);

    assert_eq!(cli.input(), Some(&PathBuf::from("persona.csv")));
    assert_eq!(cli.cat_threshold, 5, "Default categorical threshold should be 5");
    assert_eq!(cli.weighting, Weighting::MeanOfMeans);
    assert!(!cli.histograms, "Histograms should be off by default");
    assert!(!cli.no_confirm, "Default no_confirm should be false");
    assert!(cli.export.is_none());
    assert_eq!(
        cli.infer_schema_length, 10000,
        "Default schema inference should be 10000"
    );
    assert!(cli.command.is_none());
}

#[test]
fn test_cli_custom_options() {
    let cli = Cli::parse_from([
        "persona",
        "-i",
        "persona.csv",
        "--cat-threshold",
        "8",
        "--histograms",
        "--weighting",
        "record-weighted",
        "-e",
        "segments.json",
        "--no-confirm",
        "--infer-schema-length",
        "0",
    ]);

    assert_eq!(cli.cat_threshold, 8);
    assert!(cli.histograms);
    assert_eq!(cli.weighting, Weighting::RecordWeighted);
    assert_eq!(cli.export, Some(PathBuf::from("segments.json")));
    assert!(cli.no_confirm);
    assert_eq!(cli.infer_schema_length, 0);
}

#[test]
fn test_cli_rejects_zero_cat_threshold() {
    let result = Cli::try_parse_from(["persona", "-i", "persona.csv", "--cat-threshold", "0"]);
    assert!(result.is_err(), "cat_threshold of 0 should be rejected");
}

#[test]
fn test_cli_rejects_unknown_weighting() {
    let result = Cli::try_parse_from(["persona", "-i", "persona.csv", "--weighting", "median"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_lookup_subcommand() {
    let cli = Cli::parse_from([
        "persona",
        "lookup",
        "--table",
        "segments.json",
        "--country",
        "bra",
        "--age",
        "-3",
    ]);

    match cli.command {
        Some(Commands::Lookup {
            table,
            country,
            source,
            age,
            ..
        }) => {
            assert_eq!(table, PathBuf::from("segments.json"));
            assert_eq!(country.as_deref(), Some("bra"));
            assert!(source.is_none());
            assert_eq!(age.as_deref(), Some("-3"));
        }
        other => panic!("expected lookup subcommand, got {:?}", other),
    }
}

#[test]
fn test_binary_requires_input() {
    Command::cargo_bin("persona")
        .unwrap()
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file is required"));
}

#[test]
fn test_binary_missing_file() {
    Command::cargo_bin("persona")
        .unwrap()
        .args(["-i", "/nonexistent/persona.csv", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_binary_segments_and_exports() {
    let mut df = common::create_persona_dataframe();
    let (dir, csv_path) = common::create_temp_csv(&mut df);
    let export_path = dir.path().join("segments.json");

    Command::cargo_bin("persona")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("--export")
        .arg(&export_path)
        .arg("--no-confirm")
        .assert()
        .success()
        .stdout(predicate::str::contains("Segment Summary"))
        .stdout(predicate::str::contains("TUR_IOS_FEMALE_41_66"));

    let export = load_segment_table(&export_path).unwrap();
    assert_eq!(export.table.len(), 60);
    assert_eq!(export.table.age_buckets().ceiling(), 66);
    assert_eq!(export.metadata.weighting, Weighting::MeanOfMeans);
    assert_eq!(export.metadata.categorical_threshold, 5);
}

#[test]
fn test_binary_reports_configuration_error() {
    let (_dir, csv_path) = common::create_raw_csv(&[
        "PRICE,SOURCE,SEX,COUNTRY,AGE",
        "30,android,male,bra,15",
        "50,android,male,bra,15",
    ]);

    Command::cargo_bin("persona")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn test_binary_one_shot_lookup() {
    let mut df = common::create_persona_dataframe();
    let (dir, csv_path) = common::create_temp_csv(&mut df);
    let export_path = dir.path().join("segments.json");

    Command::cargo_bin("persona")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .arg("-e")
        .arg(&export_path)
        .arg("--no-confirm")
        .assert()
        .success();

    Command::cargo_bin("persona")
        .unwrap()
        .arg("lookup")
        .arg("--table")
        .arg(&export_path)
        .args(["--country", "BRA", "--source", "Android", "--sex", "male", "--age", "16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BRA_ANDROID_MALE_0_16"));

    Command::cargo_bin("persona")
        .unwrap()
        .arg("lookup")
        .arg("--table")
        .arg(&export_path)
        .args(["--country", "bra", "--source", "ios", "--sex", "male", "--age", "70"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 66"));

    Command::cargo_bin("persona")
        .unwrap()
        .arg("lookup")
        .arg("--table")
        .arg(&export_path)
        .args(["--country", "bra"])
        .assert()
        .failure();
}
