//! Callbacks from the gallery core to whatever renders it.
//!
//! The core never inspects rendered output. It reports what happened through
//! [`GalleryView`], and the presentation reports user intent back through
//! [`crate::gallery::Gallery`].

use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

use crate::error::GalleryError;
use crate::record::ImageRecord;
use crate::theme::Theme;

/// A file that passed validation and is waiting to be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingUpload {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    pub size: u64,
}

impl PendingUpload {
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            media_type: media_type.into(),
            size,
        }
    }
}

/// What a rejection applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectTarget {
    /// A single file refused during validation, before any placeholder.
    File { name: String },
    /// A whole batch refused by the limit policy.
    Batch { names: Vec<String> },
    /// A file that had a placeholder; the placeholder is already gone.
    Upload { upload: PendingUpload },
    /// A stored record that could not be removed.
    Record { id: String },
    /// A reorder, listing the requested order.
    Order { ids: Vec<String> },
}

/// Core -> presentation notifications.
///
/// Everything except `on_accepted`, `on_rejected`, and `on_error_message`
/// has a no-op default.
pub trait GalleryView: Send + Sync {
    fn on_placeholder(&self, _upload: &PendingUpload) {}

    fn on_progress(&self, _upload: &PendingUpload, _percent: u8) {}

    fn on_placeholder_removed(&self, _upload: &PendingUpload) {}

    /// A file was committed; render its final thumbnail.
    fn on_accepted(&self, upload: &PendingUpload, record: &ImageRecord);

    fn on_rejected(&self, target: &RejectTarget, reason: &GalleryError);

    fn on_removed(&self, _record: &ImageRecord) {}

    fn on_order_saved(&self, _order: &[ImageRecord]) {}

    /// Show a transient message, replacing any message currently shown.
    fn on_error_message(&self, text: &str);

    fn on_error_dismissed(&self) {}

    fn on_theme_changed(&self, _theme: Theme) {}
}

/// View that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl GalleryView for NullView {
    fn on_accepted(&self, _upload: &PendingUpload, _record: &ImageRecord) {}

    fn on_rejected(&self, _target: &RejectTarget, _reason: &GalleryError) {}

    fn on_error_message(&self, _text: &str) {}
}

/// Recorded view event for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Placeholder { name: String },
    Progress { name: String, percent: u8 },
    PlaceholderRemoved { name: String },
    Accepted { name: String, record_id: String },
    Rejected { target: RejectTarget, code: &'static str },
    Removed { record_id: String },
    OrderSaved { ids: Vec<String> },
    ErrorMessage(String),
    ErrorDismissed,
    ThemeChanged(Theme),
}

/// View that records every callback, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: ViewEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }

    /// Snapshot of all events so far.
    #[must_use]
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Messages sent to the notice slot, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::ErrorMessage(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Names of files whose thumbnails were rendered.
    #[must_use]
    pub fn accepted(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Accepted { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Placeholders still on screen: created and neither accepted nor removed.
    #[must_use]
    pub fn orphaned_placeholders(&self) -> Vec<String> {
        let mut open = Vec::new();
        for event in self.events() {
            match event {
                ViewEvent::Placeholder { name } => open.push(name),
                ViewEvent::Accepted { name, .. } | ViewEvent::PlaceholderRemoved { name } => {
                    if let Some(pos) = open.iter().position(|n| *n == name) {
                        open.remove(pos);
                    }
                }
                _ => {}
            }
        }
        open
    }
}

impl GalleryView for RecordingView {
    fn on_placeholder(&self, upload: &PendingUpload) {
        self.push(ViewEvent::Placeholder {
            name: upload.name.clone(),
        });
    }

    fn on_progress(&self, upload: &PendingUpload, percent: u8) {
        self.push(ViewEvent::Progress {
            name: upload.name.clone(),
            percent,
        });
    }

    fn on_placeholder_removed(&self, upload: &PendingUpload) {
        self.push(ViewEvent::PlaceholderRemoved {
            name: upload.name.clone(),
        });
    }

    fn on_accepted(&self, upload: &PendingUpload, record: &ImageRecord) {
        self.push(ViewEvent::Accepted {
            name: upload.name.clone(),
            record_id: record.id(),
        });
    }

    fn on_rejected(&self, target: &RejectTarget, reason: &GalleryError) {
        self.push(ViewEvent::Rejected {
            target: target.clone(),
            code: reason.code(),
        });
    }

    fn on_removed(&self, record: &ImageRecord) {
        self.push(ViewEvent::Removed {
            record_id: record.id(),
        });
    }

    fn on_order_saved(&self, order: &[ImageRecord]) {
        self.push(ViewEvent::OrderSaved {
            ids: order.iter().map(ImageRecord::id).collect(),
        });
    }

    fn on_error_message(&self, text: &str) {
        self.push(ViewEvent::ErrorMessage(text.to_string()));
    }

    fn on_error_dismissed(&self) {
        self.push(ViewEvent::ErrorDismissed);
    }

    fn on_theme_changed(&self, theme: Theme) {
        self.push(ViewEvent::ThemeChanged(theme));
    }
}
