//! Robot mode JSON output implementation.
//!
//! Command results go to stdout as one JSON document. Upload events and
//! notices are streamed to stderr as JSON lines so stdout stays parseable.

use std::path::Path;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, instrument, trace};

use crate::config::{ConfigSource, GalleryConfig};
use crate::error::GalleryError;
use crate::pipeline::BatchReport;
use crate::record::ImageRecord;
use crate::state::GallerySummary;
use crate::theme::Theme;
use crate::view::{GalleryView, PendingUpload, RejectTarget};

use super::{ListEntry, Output, RobotFormat, VersionInfo};

/// JSON output implementation for agents and scripting.
#[derive(Debug)]
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    /// Output any serializable data as JSON to stdout.
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let json = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        match json {
            Ok(json) => {
                trace!(json_len = json.len(), "JSON serialized");
                println!("{json}");
            }
            Err(e) => error!(error = %e, "Failed to serialize output"),
        }
    }

    /// Single-line JSON event on stderr.
    fn output_event<T: Serialize>(&self, data: &T) {
        match serde_json::to_string(data) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => error!(error = %e, "Failed to serialize event"),
        }
    }
}

/// Serialize an error the way every robot consumer expects it.
#[must_use]
pub fn error_json(error: &GalleryError) -> serde_json::Value {
    json!({
        "error": error.code(),
        "message": error.to_string(),
        "notice": error.user_message(),
        "suggestion": error.suggestion(),
        "recoverable": error.is_user_recoverable(),
    })
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn error(&self, error: &GalleryError) {
        debug!(error = %error, "Robot: error");
        match serde_json::to_string_pretty(&error_json(error)) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => eprintln!("{{\"error\":\"other\",\"message\":\"{e}\"}}"),
        }
    }

    fn warning(&self, message: &str) {
        self.output_event(&json!({ "event": "warning", "message": message }));
    }

    fn apply_theme(&self, _theme: Theme) {}

    #[instrument(skip_all, fields(count = entries.len()))]
    fn gallery_list(&self, entries: &[ListEntry], summary: &GallerySummary) {
        self.output_json(&json!({
            "images": entries,
            "summary": summary,
        }));
    }

    #[instrument(skip_all, fields(accepted = report.accepted(), rejected = report.rejected()))]
    fn batch_report(&self, report: &BatchReport, summary: &GallerySummary) {
        self.output_json(&json!({
            "command": "add",
            "ok": report.all_accepted(),
            "accepted": report.accepted(),
            "rejected": report.rejected(),
            "results": report.outcomes,
            "summary": summary,
        }));
    }

    fn removed(&self, record: &ImageRecord, summary: &GallerySummary) {
        self.output_json(&json!({
            "removed": record.id(),
            "ok": true,
            "summary": summary,
        }));
    }

    fn order(&self, order: &[ImageRecord]) {
        let ids: Vec<String> = order.iter().map(ImageRecord::id).collect();
        self.output_json(&json!({ "order": ids, "ok": true }));
    }

    fn exported(&self, record: &ImageRecord, path: &Path) {
        self.output_json(&json!({
            "exported": record.id(),
            "path": path.display().to_string(),
            "bytes": record.decoded_len(),
            "ok": true,
        }));
    }

    fn theme(&self, theme: Theme, changed: bool) {
        self.output_json(&json!({ "theme": theme, "changed": changed }));
    }

    fn config(&self, config: &GalleryConfig, source: &ConfigSource, path_only: bool) {
        if path_only {
            self.output_json(&json!({ "source": source }));
        } else {
            self.output_json(&json!({ "source": source, "config": config }));
        }
    }

    fn version_info(&self, info: &VersionInfo) {
        self.output_json(info);
    }

    fn quick_start(&self, version: &str) {
        self.output_json(&json!({
            "tool": "gallery",
            "version": version,
            "description": "Persisted, reorderable image gallery",
            "commands": {
                "add": "gallery add <PATH>... --robot",
                "list": "gallery list [--long] --robot",
                "remove": "gallery remove <INDEX|ID> --robot",
                "reorder": "gallery reorder <INDEX|ID>... --robot",
                "move": "gallery move <FROM> <TO> --robot",
                "export": "gallery export <INDEX|ID> <OUT> --robot",
                "theme": "gallery theme [show|toggle|dark|light] --robot",
            },
            "limits": "10 images, 10 MB total (see: gallery config)",
            "accepted_types": crate::image_ops::SUPPORTED_MEDIA_TYPES,
            "output_modes": {
                "human": "--format=text (default)",
                "robot": "--robot or --format=json",
                "compact": "--format=json-compact",
            },
        }));
    }
}

impl GalleryView for RobotOutput {
    fn on_placeholder(&self, upload: &PendingUpload) {
        trace!(upload = %upload.id, name = %upload.name, "Placeholder");
    }

    fn on_accepted(&self, upload: &PendingUpload, record: &ImageRecord) {
        self.output_event(&json!({
            "event": "accepted",
            "name": upload.name,
            "upload_id": upload.id,
            "id": record.id(),
        }));
    }

    fn on_rejected(&self, target: &RejectTarget, reason: &GalleryError) {
        self.output_event(&json!({
            "event": "rejected",
            "target": target,
            "reason": reason.code(),
        }));
    }

    fn on_error_message(&self, text: &str) {
        self.output_event(&json!({ "event": "notice", "message": text }));
    }
}
