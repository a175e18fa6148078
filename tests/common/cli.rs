//! CLI test runner with fluent assertions.
//!
//! Every runner gets its own data directory and config home, so the
//! `gallery` binary never touches the real user's gallery.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde_json::Value;
use tempfile::TempDir;

/// Variables the runner clears so the host environment cannot leak in.
const ISOLATED_VARS: [&str; 4] = ["GALLERY_CONFIG", "GALLERY_FORMAT", "NO_COLOR", "RUST_LOG"];

/// Configuration for CLI test runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Environment variables to set for the command.
    pub env_vars: HashMap<String, String>,
    /// Working directory for command execution.
    pub working_dir: Option<PathBuf>,
}

/// Test runner for the `gallery` binary.
///
/// # Example
///
/// ```ignore
/// let cli = CliRunner::new();
/// cli.run_robot(&["add", png.to_str().unwrap()]).assert_success();
/// cli.run_robot(&["list"]).assert_json_array_len("/images", 1);
/// ```
pub struct CliRunner {
    binary_path: PathBuf,
    config: CliConfig,
    home: TempDir,
}

impl Default for CliRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CliRunner {
    /// Create a runner with a fresh, empty gallery.
    #[must_use]
    pub fn new() -> Self {
        let binary = env!("CARGO_BIN_EXE_gallery");
        Self {
            binary_path: PathBuf::from(binary),
            config: CliConfig::default(),
            home: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add an environment variable for command execution.
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.config
            .env_vars
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Set the working directory for command execution.
    #[must_use]
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.config.working_dir = Some(dir);
        self
    }

    /// Directory holding this runner's `gallery.db`.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.home.path().join("data")
    }

    /// Per-user config directory (`$XDG_CONFIG_HOME`) seen by the binary.
    #[must_use]
    pub fn config_home(&self) -> PathBuf {
        self.home.path().join("config")
    }

    /// Scratch directory for files a test wants to add or export.
    #[must_use]
    pub fn scratch(&self) -> PathBuf {
        let dir = self.home.path().join("scratch");
        std::fs::create_dir_all(&dir).expect("Failed to create scratch directory");
        dir
    }

    /// Execute the command with the given arguments.
    #[must_use]
    pub fn run(&self, args: &[&str]) -> CliResult {
        let start = Instant::now();

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        for key in ISOLATED_VARS {
            cmd.env_remove(key);
        }
        cmd.env("GALLERY_DATA_DIR", self.data_dir())
            .env("XDG_CONFIG_HOME", self.config_home());

        for (key, value) in &self.config.env_vars {
            cmd.env(key, value);
        }
        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().expect("Failed to execute command");

        CliResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Execute with `--robot` and logging silenced, so stderr carries only
    /// events and errors.
    #[must_use]
    pub fn run_robot(&self, args: &[&str]) -> CliResult {
        let mut full_args = vec!["--robot", "--quiet"];
        full_args.extend(args);
        self.run(&full_args)
    }

    /// `add` the given files in robot mode.
    #[must_use]
    pub fn add<P: AsRef<Path>>(&self, files: &[P]) -> CliResult {
        let paths: Vec<&str> = files
            .iter()
            .map(|p| p.as_ref().to_str().expect("Path is not valid UTF-8"))
            .collect();
        let mut args = vec!["add"];
        args.extend(paths);
        self.run_robot(&args)
    }

    /// Record ids in display order, as `list` reports them.
    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        let json = self.run_robot(&["list"]).assert_success().json();
        json["images"]
            .as_array()
            .expect("images is not an array")
            .iter()
            .map(|entry| entry["id"].as_str().expect("id is not a string").to_string())
            .collect()
    }
}

/// Captured output from CLI execution with fluent assertions.
#[derive(Debug, Clone)]
pub struct CliResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
    pub args: Vec<String>,
}

impl CliResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Panics unless the exit code is 0.
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success(),
            "Command {:?} failed with exit code {}: {}",
            self.args,
            self.exit_code,
            self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success(),
            "Command {:?} unexpectedly succeeded",
            self.args
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "stdout does not contain \"{text}\"\nActual stdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "stderr does not contain \"{text}\"\nActual stderr:\n{}",
            self.stderr
        );
        self
    }

    // === JSON Assertions (for robot mode) ===

    /// Parse stdout as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(self.stdout.trim())
            .unwrap_or_else(|_| panic!("Failed to parse JSON from stdout:\n{}", self.stdout))
    }

    /// Parse stderr as a single JSON document (robot-mode errors).
    #[must_use]
    pub fn error_json(&self) -> Value {
        serde_json::from_str(self.stderr.trim())
            .unwrap_or_else(|_| panic!("Failed to parse JSON from stderr:\n{}", self.stderr))
    }

    pub fn assert_json_field(&self, json_pointer: &str, expected: &Value) -> &Self {
        let json = self.json();
        let actual = json.pointer(json_pointer).unwrap_or_else(|| {
            panic!(
                "JSON path {json_pointer} not found in:\n{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            )
        });
        assert_eq!(actual, expected, "JSON field {json_pointer} mismatch");
        self
    }

    pub fn assert_json_array_len(&self, json_pointer: &str, expected_len: usize) -> &Self {
        let json = self.json();
        let arr = json
            .pointer(json_pointer)
            .unwrap_or_else(|| panic!("JSON path {json_pointer} not found"))
            .as_array()
            .unwrap_or_else(|| panic!("JSON path {json_pointer} is not an array"));
        assert_eq!(
            arr.len(),
            expected_len,
            "Array at {json_pointer} has {} elements, expected {expected_len}",
            arr.len()
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_runner_version() {
        let cli = CliRunner::new();
        cli.run(&["version"]).assert_success();
    }

    #[test]
    fn test_cli_runner_robot_mode() {
        let cli = CliRunner::new();
        cli.run_robot(&[])
            .assert_success()
            .assert_json_field("/tool", &Value::String("gallery".to_string()));
    }

    #[test]
    fn test_cli_runner_invalid_command() {
        let cli = CliRunner::new();
        cli.run(&["nonexistent-command"]).assert_failure();
    }
}
