//! Output mode abstraction for robot and human output.
//!
//! Both implementations are also the gallery's [`GalleryView`]: upload
//! progress and notices flow through the same object that renders command
//! results.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::cli::Cli;
use crate::config::{ConfigSource, GalleryConfig};
use crate::error::GalleryError;
use crate::pipeline::BatchReport;
use crate::record::ImageRecord;
use crate::state::GallerySummary;
use crate::theme::Theme;
use crate::view::GalleryView;

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

/// One row of `gallery list`.
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub index: usize,
    pub id: String,
    pub media_type: String,
    pub bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ListEntry {
    #[must_use]
    pub fn new(index: usize, record: &ImageRecord) -> Self {
        Self {
            index,
            id: record.id(),
            media_type: record.media_type().to_string(),
            bytes: record.decoded_len(),
            width: None,
            height: None,
        }
    }

    #[must_use]
    pub const fn with_dimensions(mut self, (width, height): (u32, u32)) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Build metadata for `gallery version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: &'static str,
    pub build_timestamp: &'static str,
    pub rustc: &'static str,
    pub target: &'static str,
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    /// JSON output for agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output for human users.
    Human { color: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human {
                color: !cli.no_color,
            }
        }
    }

    /// Build the output, plus the same object as a gallery view.
    #[must_use]
    pub fn into_output(self) -> (Arc<dyn Output>, Arc<dyn GalleryView>) {
        match self {
            Self::Robot(format) => {
                let out = Arc::new(RobotOutput::new(format));
                let view: Arc<dyn GalleryView> = out.clone();
                let out: Arc<dyn Output> = out;
                (out, view)
            }
            Self::Human { color } => {
                let out = Arc::new(HumanOutput::new(color));
                let view: Arc<dyn GalleryView> = out.clone();
                let out: Arc<dyn Output> = out;
                (out, view)
            }
        }
    }
}

/// Trait for all command output.
///
/// Commands call these methods without knowing the output mode.
pub trait Output: Send + Sync {
    // Basic messages
    fn error(&self, error: &GalleryError);
    fn warning(&self, message: &str);

    /// Switch palette to match the stored theme.
    fn apply_theme(&self, theme: Theme);

    // Gallery
    fn gallery_list(&self, entries: &[ListEntry], summary: &GallerySummary);
    fn batch_report(&self, report: &BatchReport, summary: &GallerySummary);
    fn removed(&self, record: &ImageRecord, summary: &GallerySummary);
    fn order(&self, order: &[ImageRecord]);
    fn exported(&self, record: &ImageRecord, path: &Path);

    // Preferences
    fn theme(&self, theme: Theme, changed: bool);
    fn config(&self, config: &GalleryConfig, source: &ConfigSource, path_only: bool);

    // Metadata
    fn version_info(&self, info: &VersionInfo);
    fn quick_start(&self, version: &str);
}
