//! Human-mode end-to-end tests.

use crate::common::assertions::assert_no_ansi;
use crate::common::cli::CliRunner;
use crate::common::fixtures::{png_bytes, write_file};
use crate::common::init_test_logging;
use crate::common::logging::LogVerifier;

#[test]
fn human_version_is_not_json() {
    init_test_logging();
    let cli = CliRunner::new().with_env("RUST_LOG", "off");
    let result = cli.run(&["version"]);
    result.assert_success().assert_stdout_contains("gallery");

    let stdout = result.stdout.trim();
    assert!(
        serde_json::from_str::<serde_json::Value>(stdout).is_err(),
        "Human mode output should not be JSON"
    );
    assert_no_ansi(stdout);
}

#[test]
fn human_empty_list_hints_at_add() {
    let cli = CliRunner::new().with_env("RUST_LOG", "off");
    cli.run(&["list"])
        .assert_success()
        .assert_stdout_contains("No images yet")
        .assert_stdout_contains("0/10 images");
}

#[test]
fn human_add_with_progress_then_list() {
    let cli = CliRunner::new().with_env("RUST_LOG", "off");
    let dir = cli.scratch();
    let png = write_file(&dir, "a.png", &png_bytes(1));
    let txt = write_file(&dir, "notes.txt", b"plain");

    // Simulated progress stays on here; bars are hidden off-terminal.
    let added = cli.run(&["add", png.to_str().unwrap(), txt.to_str().unwrap()]);
    added
        .assert_success()
        .assert_stdout_contains("1 accepted, 1 rejected")
        .assert_stdout_contains("Only JPG, PNG, and GIF are allowed.");
    assert_no_ansi(&added.stdout);

    cli.run(&["list"])
        .assert_success()
        .assert_stdout_contains("Images")
        .assert_stdout_contains("image/png")
        .assert_stdout_contains("1/10 images");
}

#[test]
fn human_error_shows_hint() {
    let cli = CliRunner::new().with_env("RUST_LOG", "off");
    cli.run(&["remove", "0"])
        .assert_failure()
        .assert_stderr_contains("Error:")
        .assert_stderr_contains("Hint:");
}

#[test]
fn human_theme_change_is_reported() {
    let cli = CliRunner::new().with_env("RUST_LOG", "off");
    cli.run(&["theme", "dark"])
        .assert_success()
        .assert_stdout_contains("Theme set to dark");
    cli.run(&["theme"]).assert_success().assert_stdout_contains("dark");
}

#[test]
fn verbose_add_logs_batch_progress() {
    let cli = CliRunner::new();
    let png = write_file(&cli.scratch(), "a.png", &png_bytes(1));

    let result = cli.run(&["-v", "add", "--no-progress", png.to_str().unwrap()]);
    result.assert_success();
    LogVerifier::from_stderr(&result.stderr)
        .assert_info("Batch complete")
        .assert_debug("Collected file")
        .assert_no_errors();
}
