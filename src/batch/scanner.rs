//! Turning command-line paths into a batch of raw files.
//!
//! Files are taken as given. Directories contribute their top-level regular
//! files, sorted by name; nested directories are skipped.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

use crate::error::GalleryError;
use crate::pipeline::RawFile;

/// Result of collecting files from the given paths.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Files in batch order.
    pub files: Vec<RawFile>,
    /// Entries that were not regular files.
    pub skipped: Vec<PathBuf>,
}

impl ScanResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Short description of what was skipped, for reporting.
    #[must_use]
    pub fn skipped_summary(&self) -> Option<SkippedSummary> {
        (!self.skipped.is_empty()).then(|| SkippedSummary {
            count: self.skipped.len(),
            paths: self.skipped.iter().map(|p| p.display().to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSummary {
    pub count: usize,
    pub paths: Vec<String>,
}

/// Errors that can occur while collecting files.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read directory {0}: {1}")]
    ReadError(PathBuf, #[source] io::Error),

    #[error("failed to get file metadata for {0}: {1}")]
    MetadataError(PathBuf, #[source] io::Error),
}

impl From<ScanError> for GalleryError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::NotFound(path) => Self::DecodeFailure {
                name: path.display().to_string(),
                reason: "no such file or directory".to_string(),
            },
            other => Self::Other(other.to_string()),
        }
    }
}

/// Collect files from `paths` in the order given.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn collect_files(paths: &[PathBuf]) -> Result<ScanResult, ScanError> {
    let mut result = ScanResult::default();

    for path in paths {
        if !path.exists() {
            return Err(ScanError::NotFound(path.clone()));
        }
        if path.is_dir() {
            scan_directory(path, &mut result)?;
        } else {
            result.files.push(raw_file(path)?);
        }
    }

    info!(
        files = result.files.len(),
        skipped = result.skipped.len(),
        "Collected files"
    );
    Ok(result)
}

fn scan_directory(dir: &Path, result: &mut ScanResult) -> Result<(), ScanError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ScanError::ReadError(dir.to_path_buf(), e))?;

    // Sorted for deterministic batch order.
    let mut entries: Vec<_> = entries
        .collect::<Result<Vec<_>, io::Error>>()
        .map_err(|e| ScanError::ReadError(dir.to_path_buf(), e))?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        if path.is_file() {
            result.files.push(raw_file(&path)?);
        } else {
            trace!(path = %path.display(), "Skipping non-file entry");
            result.skipped.push(path);
        }
    }
    Ok(())
}

fn raw_file(path: &Path) -> Result<RawFile, ScanError> {
    let file = RawFile::from_path(path).map_err(|e| match e {
        GalleryError::Io(io) => ScanError::MetadataError(path.to_path_buf(), io),
        other => ScanError::MetadataError(path.to_path_buf(), io::Error::other(other.to_string())),
    })?;
    debug!(name = %file.name, media_type = %file.media_type, size = file.size, "Collected file");
    Ok(file)
}
