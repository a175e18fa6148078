//! Human-friendly output using console styles and indicatif progress bars.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use console::style;
use indicatif::{HumanBytes, MultiProgress, ProgressBar, ProgressStyle};
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use crate::config::{ConfigSource, GalleryConfig, to_toml_string};
use crate::error::GalleryError;
use crate::pipeline::{BatchReport, UploadState};
use crate::record::ImageRecord;
use crate::state::GallerySummary;
use crate::theme::{Palette, Theme};
use crate::view::{GalleryView, PendingUpload, RejectTarget};

use super::{ListEntry, Output, VersionInfo};

const BAR_TEMPLATE: &str = "{prefix:>24.bold} [{bar:30}] {pos:>3}% {msg}";

/// Styled terminal output implementation for human users.
pub struct HumanOutput {
    color: bool,
    palette: Mutex<Palette>,
    multi: MultiProgress,
    bars: Mutex<HashMap<Uuid, ProgressBar>>,
}

impl std::fmt::Debug for HumanOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HumanOutput")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl HumanOutput {
    #[instrument]
    pub fn new(color: bool) -> Self {
        debug!("Creating HumanOutput");
        let palette = if color {
            Palette::default()
        } else {
            Palette::plain()
        };
        Self {
            color,
            palette: Mutex::new(palette),
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn palette(&self) -> Palette {
        self.palette
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Print to stderr without tearing any live progress bars.
    fn eprint(&self, line: &str) {
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }

    fn take_bar(&self, id: Uuid) -> Option<ProgressBar> {
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    fn summary_line(&self, summary: &GallerySummary) -> String {
        let p = self.palette();
        format!(
            "{} {}/{} images, {} of {}",
            p.muted.apply_to("Gallery:"),
            summary.count,
            summary.max_count,
            HumanBytes(summary.total_bytes),
            HumanBytes(summary.max_total_bytes),
        )
    }
}

impl Output for HumanOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &GalleryError) {
        debug!(error = %error, recoverable = error.is_user_recoverable(), "Outputting error");
        let p = self.palette();
        self.eprint(&format!(
            "{} {}",
            p.error.apply_to("Error:"),
            style(error.to_string()).bold()
        ));
        if let Some(suggestion) = error.suggestion() {
            self.eprint(&format!("{} {suggestion}", p.muted.apply_to("Hint:")));
        }
    }

    fn warning(&self, message: &str) {
        let p = self.palette();
        self.eprint(&format!("{} {message}", p.warning.apply_to("[WARN]")));
    }

    fn apply_theme(&self, theme: Theme) {
        if self.color {
            *self.palette.lock().unwrap_or_else(PoisonError::into_inner) = theme.palette();
        }
    }

    #[instrument(skip_all, fields(count = entries.len()))]
    fn gallery_list(&self, entries: &[ListEntry], summary: &GallerySummary) {
        let p = self.palette();
        if entries.is_empty() {
            println!("{}", p.muted.apply_to("No images yet. Add some with: gallery add <PATH>"));
        } else {
            println!("{}", p.header.apply_to("Images"));
            for entry in entries {
                let dims = match (entry.width, entry.height) {
                    (Some(w), Some(h)) => format!("  {w}x{h}"),
                    _ => String::new(),
                };
                println!(
                    "  {:>3}  {}  {:<11} {:>10}{dims}",
                    p.index.apply_to(entry.index),
                    p.record_id.apply_to(&entry.id),
                    entry.media_type,
                    HumanBytes(entry.bytes).to_string(),
                );
            }
        }
        println!();
        println!("{}", self.summary_line(summary));
    }

    fn batch_report(&self, report: &BatchReport, summary: &GallerySummary) {
        let p = self.palette();
        for outcome in &report.outcomes {
            match outcome.state {
                UploadState::Done => println!(
                    "  {} {} {}",
                    p.success.apply_to("+"),
                    outcome.name,
                    p.record_id.apply_to(outcome.record_id.as_deref().unwrap_or_default()),
                ),
                _ => println!(
                    "  {} {} {}",
                    p.error.apply_to("x"),
                    outcome.name,
                    p.muted.apply_to(outcome.message.as_deref().unwrap_or_default()),
                ),
            }
        }
        println!(
            "{} accepted, {} rejected",
            p.success.apply_to(report.accepted()),
            p.error.apply_to(report.rejected()),
        );
        println!("{}", self.summary_line(summary));
    }

    fn removed(&self, record: &ImageRecord, summary: &GallerySummary) {
        let p = self.palette();
        println!("{} Removed {}", p.success.apply_to("[OK]"), p.record_id.apply_to(record.id()));
        println!("{}", self.summary_line(summary));
    }

    fn order(&self, order: &[ImageRecord]) {
        let p = self.palette();
        println!("{}", p.header.apply_to("Order"));
        for (index, record) in order.iter().enumerate() {
            println!("  {:>3}  {}", p.index.apply_to(index), p.record_id.apply_to(record.id()));
        }
    }

    fn exported(&self, record: &ImageRecord, path: &Path) {
        let p = self.palette();
        println!(
            "{} Wrote {} ({}) to {}",
            p.success.apply_to("[OK]"),
            p.record_id.apply_to(record.id()),
            HumanBytes(record.decoded_len()),
            path.display()
        );
    }

    fn theme(&self, theme: Theme, changed: bool) {
        let p = self.palette();
        if changed {
            println!("{} Theme set to {}", p.success.apply_to("[OK]"), p.accent.apply_to(theme));
        } else {
            println!("{theme}");
        }
    }

    fn config(&self, config: &GalleryConfig, source: &ConfigSource, path_only: bool) {
        let p = self.palette();
        let origin = source
            .path()
            .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
        if path_only {
            println!("{origin}");
            return;
        }
        println!("{} {origin}", p.muted.apply_to("# source:"));
        match to_toml_string(config) {
            Ok(text) => print!("{text}"),
            Err(e) => self.error(&e),
        }
    }

    fn version_info(&self, info: &VersionInfo) {
        let p = self.palette();
        println!("{} {}", p.accent.apply_to("gallery"), info.version);
        println!("  git:    {} (dirty: {})", info.git_sha, info.git_dirty);
        println!("  built:  {}", info.build_timestamp);
        println!("  rustc:  {}", info.rustc);
        println!("  target: {}", info.target);
    }

    fn quick_start(&self, version: &str) {
        let p = self.palette();
        println!("{} {version} - image gallery\n", p.accent.apply_to("gallery"));
        println!("{}", p.header.apply_to("QUICK START"));
        println!();
        for (cmd, what) in [
            ("gallery add photo.png shots/", "Add files (one batch)"),
            ("gallery list --long", "Show images in order"),
            ("gallery remove 0", "Remove by index or id prefix"),
            ("gallery move 3 0", "Move an image to the front"),
            ("gallery export 0 out.png", "Write an image back to disk"),
            ("gallery theme toggle", "Switch light/dark"),
        ] {
            println!("  {:<30} {what}", p.success.apply_to(cmd));
        }
        println!();
        println!(
            "{} JPG, PNG, GIF. Use --robot for JSON output.",
            p.muted.apply_to("Accepted:")
        );
    }
}

impl GalleryView for HumanOutput {
    fn on_placeholder(&self, upload: &PendingUpload) {
        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_style(Self::bar_style());
        bar.set_prefix(upload.name.clone());
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(upload.id, bar);
    }

    fn on_progress(&self, upload: &PendingUpload, percent: u8) {
        if let Some(bar) = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&upload.id)
        {
            bar.set_position(u64::from(percent));
        }
    }

    fn on_placeholder_removed(&self, upload: &PendingUpload) {
        if let Some(bar) = self.take_bar(upload.id) {
            bar.abandon_with_message("failed");
        }
    }

    fn on_accepted(&self, upload: &PendingUpload, record: &ImageRecord) {
        trace!(upload = %upload.id, id = %record.id(), "Accepted");
        if let Some(bar) = self.take_bar(upload.id) {
            bar.finish_with_message(record.id());
        }
    }

    fn on_rejected(&self, target: &RejectTarget, reason: &GalleryError) {
        let p = self.palette();
        let what = match target {
            RejectTarget::File { name } => name.clone(),
            RejectTarget::Batch { names } => format!("{} file(s)", names.len()),
            RejectTarget::Upload { upload } => upload.name.clone(),
            RejectTarget::Record { id } => id.clone(),
            RejectTarget::Order { .. } => "new order".to_string(),
        };
        self.eprint(&format!("{} {what}: {reason}", p.error.apply_to("x")));
    }

    fn on_error_message(&self, text: &str) {
        let p = self.palette();
        self.eprint(&format!("{} {text}", p.warning.apply_to("!")));
    }

    fn on_theme_changed(&self, theme: Theme) {
        self.apply_theme(theme);
    }
}
