//! Resolving paths that appear in configuration.
//!
//! `~` and `~/...` expand to the home directory, absolute paths pass
//! through, and anything else is taken relative to a base directory.

use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::error::{GalleryError, Result};

/// Resolve `path` against `base`.
pub fn resolve_path(path: &Path, base: &Path) -> Result<PathBuf> {
    let resolved = if let Ok(rest) = path.strip_prefix("~") {
        let home = home_dir()?;
        if rest.as_os_str().is_empty() {
            home
        } else {
            home.join(rest)
        }
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    trace!(from = %path.display(), to = %resolved.display(), "Resolved path");
    Ok(resolved)
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| GalleryError::ConfigInvalid("Could not determine home directory".to_string()))
}

/// Resolves paths relative to the directory of one config file.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base: PathBuf,
}

impl PathResolver {
    pub fn new(config_path: &Path) -> Result<Self> {
        let dir = config_path.parent().ok_or_else(|| {
            GalleryError::ConfigInvalid(format!(
                "{} has no parent directory",
                config_path.display()
            ))
        })?;
        let base = dir.canonicalize().unwrap_or_else(|e| {
            warn!(dir = %dir.display(), error = %e, "Using config directory as given");
            dir.to_path_buf()
        });
        Ok(Self { base })
    }

    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        resolve_path(path, &self.base)
    }

    pub fn config_dir(&self) -> &Path {
        &self.base
    }
}
