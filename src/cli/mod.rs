//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::theme::Theme;

/// Gallery - a persisted, reorderable image gallery.
///
/// Robot Mode: use --robot or --format json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "gallery", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "GALLERY_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Configuration file (.toml, .yaml, .yml)
    #[arg(long, global = true, env = "GALLERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the gallery database
    #[arg(long, global = true, env = "GALLERY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Gallery ===
    /// Add image files (or every file in a directory) as one batch
    Add(AddArgs),

    /// List images in display order
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Remove one image
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),

    /// Replace the display order
    Reorder(ReorderArgs),

    /// Move one image to a new position
    #[command(name = "move", visible_alias = "mv")]
    Move(MoveArgs),

    /// Write an image's bytes to a file
    Export(ExportArgs),

    // === Preferences ===
    /// Show or change the theme
    Theme(ThemeArgs),

    /// Show the effective configuration
    Config(ConfigArgs),

    // === Utilities ===
    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Files or directories (top-level entries only)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Skip the simulated progress
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Also show pixel dimensions
    #[arg(long, short = 'l')]
    pub long: bool,
}

#[derive(Parser, Debug)]
pub struct RemoveArgs {
    /// Index (0-based) or id prefix (4+ hex chars)
    pub selector: String,
}

#[derive(Parser, Debug)]
pub struct ReorderArgs {
    /// Every image exactly once, in the new order
    #[arg(required = true)]
    pub selectors: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct MoveArgs {
    /// Current position (0-based)
    pub from: usize,
    /// New position (0-based)
    pub to: usize,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Index (0-based) or id prefix
    pub selector: String,
    /// Output file, or a directory to write `<id>.<ext>` into
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub action: Option<ThemeAction>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ThemeAction {
    /// Print the current theme (default)
    Show,
    /// Switch between light and dark
    Toggle,
    /// Use the dark theme
    Dark,
    /// Use the light theme
    Light,
}

impl ThemeAction {
    /// The theme to set, if this action sets one explicitly.
    #[must_use]
    pub const fn explicit(self) -> Option<Theme> {
        match self {
            Self::Dark => Some(Theme::Dark),
            Self::Light => Some(Theme::Light),
            Self::Show | Self::Toggle => None,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Only print where the configuration came from
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
