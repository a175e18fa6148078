//! Common test utilities for the gallery CLI and library.
//!
//! - `cli`: CLI runner with an isolated data directory and fluent assertions
//! - `fixtures`: encoded test images, sized files, and config files
//! - `env`: serialized environment variable overrides
//! - `logging`: log output verification helpers
//! - `assertions`: small JSON and ANSI checks
#![allow(dead_code)]

pub mod cli;
pub mod fixtures;

use tracing_subscriber::EnvFilter;

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
