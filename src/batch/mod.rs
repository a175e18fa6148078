//! Collecting the files of one `add` batch from the command line.

mod scanner;

pub use scanner::{ScanError, ScanResult, SkippedSummary, collect_files};
