//! Persistent key-value storage for gallery state.
//!
//! The gallery keeps exactly two entries:
//!
//! ```text
//! uploadedImages  -> ["data:image/png;base64,...", ...]   (display order)
//! theme           -> "dark" | "light"
//! ```
//!
//! Backends implement [`KeyValueStore`]; [`GalleryStore`] layers the
//! gallery's encoding on top. A write either lands completely or leaves the
//! previous value in place.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, default_db_path};

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::error::{GalleryError, Result};
use crate::record::ImageRecord;
use crate::theme::Theme;

/// Key holding the ordered list of image records.
pub const IMAGES_KEY: &str = "uploadedImages";

/// Key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Minimal persistent key-value store.
///
/// `set` must be atomic: on error the previously stored value is unchanged.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Gallery encoding over a raw key-value store.
#[derive(Debug)]
pub struct GalleryStore<S> {
    inner: S,
}

impl<S: KeyValueStore> GalleryStore<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Load the persisted sequence.
    ///
    /// A missing key, unreadable store, malformed JSON, an entry that is not a
    /// data URI, or a duplicated entry all yield an empty sequence.
    #[instrument(skip(self))]
    pub fn load(&self) -> Vec<ImageRecord> {
        let raw = match self.inner.get(IMAGES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored images");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored images, starting empty");
                return Vec::new();
            }
        };

        match parse_sequence(&raw) {
            Ok(records) => {
                debug!(count = records.len(), "Loaded stored images");
                records
            }
            Err(e) => {
                warn!(error = %e, "Stored images are corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist `records` as the new sequence.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn save(&mut self, records: &[ImageRecord]) -> Result<()> {
        let json = serde_json::to_string(records)
            .map_err(|e| GalleryError::StorageFailure(format!("serialization failed: {e}")))?;
        self.inner
            .set(IMAGES_KEY, &json)
            .map_err(|e| match e {
                GalleryError::StorageFailure(_) => e,
                other => GalleryError::StorageFailure(other.to_string()),
            })?;
        debug!(bytes = json.len(), "Saved images");
        Ok(())
    }

    /// Read the theme preference; anything but `"dark"` is light.
    pub fn load_theme(&self) -> Theme {
        match self.inner.get(THEME_KEY) {
            Ok(Some(value)) => Theme::from_stored(&value),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    pub fn save_theme(&mut self, theme: Theme) -> Result<()> {
        self.inner.set(THEME_KEY, theme.as_str())
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

fn parse_sequence(raw: &str) -> Result<Vec<ImageRecord>> {
    let entries: Vec<String> = serde_json::from_str(raw)
        .map_err(|e| GalleryError::Other(format!("invalid JSON: {e}")))?;

    let mut seen = HashSet::with_capacity(entries.len());
    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let record = ImageRecord::parse(entry)
            .map_err(|e| GalleryError::Other(format!("entry {index}: {e}")))?;
        if !seen.insert(record.clone()) {
            return Err(GalleryError::Other(format!("entry {index} is a duplicate")));
        }
        records.push(record);
    }
    Ok(records)
}
