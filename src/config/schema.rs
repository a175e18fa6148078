//! Configuration schema.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Unknown fields are ignored for forward compatibility.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, Result};
use crate::limits::LimitPolicy;
use crate::notify::DEFAULT_DISMISS_AFTER;
use crate::pipeline::ProgressConfig;
use crate::storage::default_db_path;

/// Top-level configuration.
///
/// # Example TOML
///
/// ```toml
/// [storage]
/// path = "~/gallery/gallery.db"
/// quota_bytes = 5242880
///
/// [limits]
/// max_count = 10
/// max_total_mb = 10
///
/// [upload]
/// simulate_progress = true
/// progress_tick_ms = 200
/// progress_step = 20
///
/// [notice]
/// dismiss_after_ms = 5000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub storage: StorageConfig,
    pub limits: LimitPolicy,
    pub upload: ProgressConfig,
    pub notice: NoticeConfig,
}

/// Where and how much the gallery may store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Byte budget for all stored keys and values. No limit when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeConfig {
    pub dismiss_after_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: u64::try_from(DEFAULT_DISMISS_AFTER.as_millis()).unwrap_or(5_000),
        }
    }
}

impl GalleryConfig {
    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_count == 0 {
            return Err(GalleryError::ConfigInvalid(
                "limits.max_count must be at least 1".to_string(),
            ));
        }
        if self.limits.max_total_mb == 0 {
            return Err(GalleryError::ConfigInvalid(
                "limits.max_total_mb must be at least 1".to_string(),
            ));
        }
        if self.upload.progress_step == 0 {
            return Err(GalleryError::ConfigInvalid(
                "upload.progress_step must be at least 1".to_string(),
            ));
        }
        if self.storage.quota_bytes == Some(0) {
            return Err(GalleryError::ConfigInvalid(
                "storage.quota_bytes must be positive; omit it for no quota".to_string(),
            ));
        }
        Ok(())
    }

    /// Database file to open.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }

    #[must_use]
    pub const fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.notice.dismiss_after_ms)
    }
}
