//! Structured logging initialization for the gallery CLI.
//!
//! Logs always go to stderr so stdout stays clean for command output.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default filter directive for a verbosity level.
#[must_use]
pub const fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "gallery=error";
    }
    match verbose {
        0 => "gallery=info",
        1 => "gallery=debug",
        _ => "gallery=trace",
    }
}

/// Initialize the tracing subscriber based on CLI flags and environment.
///
/// * `robot_mode` - JSON lines for machine consumption
/// * `verbose` - 0 = info, 1 = debug, 2+ = trace
/// * `quiet` - errors only
///
/// `RUST_LOG` overrides the default filter.
///
/// | Mode | TTY | Output |
/// |------|-----|--------|
/// | Robot | any | JSON lines to stderr |
/// | Human | yes | Colored output to stderr |
/// | Human | no | Compact plain output to stderr |
pub fn init_logging(robot_mode: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let registry = tracing_subscriber::registry().with(filter);

    // try_init: a second call (tests, embedding) keeps the first subscriber.
    let _ = if robot_mode {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::NONE)
                    .with_writer(io::stderr),
            )
            .try_init()
    } else if io::stderr().is_terminal() {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE)
                    .with_writer(io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .compact()
                    .with_writer(io::stderr),
            )
            .try_init()
    };
}
