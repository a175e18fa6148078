//! Robot-mode end-to-end tests.
//!
//! stdout carries exactly one JSON document; upload events are JSON lines
//! on stderr.

use serde_json::Value;

use crate::common::assertions::{assert_json_has_fields, events_of};
use crate::common::cli::CliRunner;
use crate::common::fixtures::{TestConfig, png_bytes, write_file};
use crate::common::init_test_logging;

#[test]
fn robot_quick_start_outputs_json() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&[]);
    result.assert_success();

    let json = assert_json_has_fields(&result.stdout, &["tool", "commands", "output_modes"]);
    assert_eq!(json["tool"], "gallery");
    assert!(
        json["accepted_types"]
            .as_array()
            .unwrap()
            .contains(&Value::from("image/png"))
    );
}

#[test]
fn robot_add_then_list() {
    init_test_logging();
    let cli = CliRunner::new();
    let dir = cli.scratch();
    let a = write_file(&dir, "a.png", &png_bytes(1));
    let b = write_file(&dir, "b.png", &png_bytes(2));

    let added = cli.add(&[&a, &b]);
    added
        .assert_success()
        .assert_json_field("/accepted", &Value::from(2))
        .assert_json_field("/ok", &Value::Bool(true))
        .assert_json_field("/summary/count", &Value::from(2));
    assert_eq!(events_of(&added.stderr, "accepted").len(), 2);

    let listed = cli.run_robot(&["list"]);
    listed
        .assert_success()
        .assert_json_array_len("/images", 2)
        .assert_json_field("/images/0/media_type", &Value::from("image/png"))
        .assert_json_field("/summary/max_count", &Value::from(10));

    let ids = cli.list_ids();
    let results = added.json()["results"].clone();
    let mut reported: Vec<String> = results
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["record_id"].as_str().unwrap().to_string())
        .collect();
    let mut stored = ids.clone();
    reported.sort();
    stored.sort();
    assert_eq!(reported, stored);
}

#[test]
fn robot_list_long_reports_dimensions() {
    let cli = CliRunner::new();
    let png = write_file(&cli.scratch(), "a.png", &png_bytes(1));
    cli.add(&[&png]).assert_success();

    cli.run_robot(&["list", "--long"])
        .assert_success()
        .assert_json_field("/images/0/width", &Value::from(8))
        .assert_json_field("/images/0/height", &Value::from(8));
}

#[test]
fn robot_partial_batch_reports_each_file() {
    let cli = CliRunner::new();
    let dir = cli.scratch();
    let png = write_file(&dir, "a.png", &png_bytes(1));
    let txt = write_file(&dir, "notes.txt", b"not an image");

    let result = cli.add(&[&png, &txt]);
    result
        .assert_success()
        .assert_json_field("/accepted", &Value::from(1))
        .assert_json_field("/rejected", &Value::from(1))
        .assert_json_field("/ok", &Value::Bool(false))
        .assert_json_field("/results/1/state", &Value::from("rejected"))
        .assert_json_field("/results/1/reason", &Value::from("unsupported_media_type"));

    let notices = events_of(&result.stderr, "notice");
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["message"], "Only JPG, PNG, and GIF are allowed.");
}

#[test]
fn robot_duplicate_add_fails() {
    let cli = CliRunner::new();
    let png = write_file(&cli.scratch(), "a.png", &png_bytes(1));
    cli.add(&[&png]).assert_success();

    let again = cli.add(&[&png]);
    again
        .assert_failure()
        .assert_json_field("/results/0/reason", &Value::from("duplicate_record"))
        .assert_stderr_contains("File Already Exists.");
    assert_eq!(cli.list_ids().len(), 1);
}

#[test]
fn robot_count_limit_from_config() {
    let cli = CliRunner::new();
    let config = TestConfig::toml("[limits]\nmax_count = 2\n");
    let dir = cli.scratch();
    let files: Vec<_> = (1..=3)
        .map(|i| write_file(&dir, &format!("{i}.png"), &png_bytes(i)))
        .collect();
    let paths: Vec<&str> = files.iter().map(|p| p.to_str().unwrap()).collect();

    let mut args = vec!["--config", config.path_str(), "add"];
    args.extend(paths);
    let result = cli.run_robot(&args);
    result
        .assert_failure()
        .assert_json_field("/accepted", &Value::from(0))
        .assert_json_field("/results/2/reason", &Value::from("count_exceeded"))
        .assert_stderr_contains("Max 2 Images Allowed.");
    assert!(cli.list_ids().is_empty());
}

#[test]
fn robot_error_json_on_stderr() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&["remove", "3"]);
    result.assert_failure();
    assert!(result.stdout.trim().is_empty());

    let err = result.error_json();
    assert_eq!(err["error"], "not_found");
    assert_eq!(err["notice"], "Image not Found to Remove.");
    assert_eq!(err["recoverable"], true);
    assert!(err["suggestion"].as_str().unwrap().contains("gallery list"));
}

#[test]
fn robot_invalid_selector() {
    let cli = CliRunner::new();
    let result = cli.run_robot(&["remove", "zz"]);
    result.assert_failure();
    assert_eq!(result.error_json()["error"], "invalid_selector");
}

#[test]
fn robot_config_reports_source() {
    let cli = CliRunner::new();
    cli.run_robot(&["config"])
        .assert_success()
        .assert_json_field("/source/kind", &Value::from("builtin"))
        .assert_json_field("/config/limits/max_total_mb", &Value::from(10));
}

#[test]
fn robot_format_flag_outputs_json() {
    let cli = CliRunner::new().with_env("RUST_LOG", "off");
    let result = cli.run(&["version", "--format=json"]);
    result.assert_success();
    let json = result.json();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
