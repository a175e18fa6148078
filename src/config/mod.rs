//! Configuration for the gallery.
//!
//! Resolution order:
//! 1. `--config <PATH>` / `GALLERY_CONFIG` (must exist)
//! 2. `<config_dir>/gallery/config.toml`, if present
//! 3. Built-in defaults
//!
//! `--data-dir` / `GALLERY_DATA_DIR` then overrides where the database lives.

mod loader;
mod path;
mod schema;

pub use loader::{ConfigFormat, load_config, load_config_from_str, to_toml_string};
pub use path::{PathResolver, home_dir, resolve_path};
pub use schema::{GalleryConfig, NoticeConfig, StorageConfig};

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// File name of the database inside a data directory.
pub const DB_FILE_NAME: &str = "gallery.db";

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Explicit(PathBuf),
    UserDefault(PathBuf),
    Builtin,
}

impl ConfigSource {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::UserDefault(p) => Some(p),
            Self::Builtin => None,
        }
    }
}

/// Standard per-user config file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gallery").join("config.toml"))
}

/// Resolve the effective configuration.
pub fn resolve_config(
    explicit: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<(GalleryConfig, ConfigSource)> {
    let (mut config, source) = if let Some(path) = explicit {
        (load_config(path)?, ConfigSource::Explicit(path.to_path_buf()))
    } else {
        match default_config_path() {
            Some(path) if path.is_file() => {
                (load_config(&path)?, ConfigSource::UserDefault(path))
            }
            _ => (GalleryConfig::default(), ConfigSource::Builtin),
        }
    };

    if let Some(dir) = data_dir {
        let cwd = std::env::current_dir()?;
        let dir = resolve_path(dir, &cwd)?;
        config.storage.path = Some(dir.join(DB_FILE_NAME));
    }

    debug!(source = ?source, db = ?config.storage.path, "Resolved configuration");
    Ok((config, source))
}
