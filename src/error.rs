//! Error types for gallery operations.

use thiserror::Error;

/// Primary error type for gallery operations.
#[derive(Error, Debug)]
pub enum GalleryError {
    // Limit errors
    #[error("Batch of {incoming} would exceed the {max}-image limit ({current} stored)")]
    CountExceeded {
        max: usize,
        current: usize,
        incoming: usize,
    },

    #[error("Batch would bring the gallery to {total_bytes} bytes, over the {max_mb} MB limit")]
    SizeExceeded { max_mb: u64, total_bytes: u64 },

    // Upload errors
    #[error("Unsupported media type '{media_type}' for {name}")]
    UnsupportedMediaType { name: String, media_type: String },

    #[error("Image already in gallery: {id}")]
    DuplicateRecord { id: String },

    #[error("Failed to read {name}: {reason}")]
    DecodeFailure { name: String, reason: String },

    // Storage errors
    #[error("Storage write failed: {0}")]
    StorageFailure(String),

    #[error("Image not found: {selector}")]
    NotFound { selector: String },

    #[error("Failed to persist new order: {0}")]
    OrderPersistFailure(String),

    #[error("New order does not match gallery contents: {0}")]
    OrderMismatch(String),

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid image selector '{0}': expected an index or id prefix")]
    InvalidSelector(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl GalleryError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CountExceeded { .. }
                | Self::SizeExceeded { .. }
                | Self::UnsupportedMediaType { .. }
                | Self::DuplicateRecord { .. }
                | Self::DecodeFailure { .. }
                | Self::StorageFailure(_)
                | Self::NotFound { .. }
                | Self::OrderPersistFailure(_)
                | Self::OrderMismatch(_)
                | Self::ConfigNotFound { .. }
                | Self::InvalidSelector(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::CountExceeded { .. } => Some("Remove images with: gallery remove <SELECTOR>"),
            Self::SizeExceeded { .. } => Some("Remove large images or add smaller files"),
            Self::UnsupportedMediaType { .. } => Some("Convert the file to JPG, PNG, or GIF"),
            Self::StorageFailure(_) => Some("Check storage.quota_bytes and free disk space"),
            Self::NotFound { .. } | Self::InvalidSelector(_) => {
                Some("Run: gallery list to see indices and ids")
            }
            Self::OrderMismatch(_) => Some("List every image exactly once"),
            Self::ConfigNotFound { .. } => Some("Check --config or GALLERY_CONFIG"),
            _ => None,
        }
    }

    /// Short, transient message shown to the user in the notice slot.
    pub fn user_message(&self) -> String {
        match self {
            Self::CountExceeded { max, .. } => format!("Max {max} Images Allowed."),
            Self::SizeExceeded { max_mb, .. } => format!("Total size exceeds {max_mb} MB."),
            Self::UnsupportedMediaType { .. } => "Only JPG, PNG, and GIF are allowed.".to_string(),
            Self::DuplicateRecord { .. } => "File Already Exists.".to_string(),
            Self::DecodeFailure { .. } => "Failed to Read File.".to_string(),
            Self::StorageFailure(_) => "Failed to Update Images.".to_string(),
            Self::NotFound { .. } => "Image not Found to Remove.".to_string(),
            Self::OrderPersistFailure(_) | Self::OrderMismatch(_) => {
                "Failed to Save Order.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Stable machine-readable code for robot output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CountExceeded { .. } => "count_exceeded",
            Self::SizeExceeded { .. } => "size_exceeded",
            Self::UnsupportedMediaType { .. } => "unsupported_media_type",
            Self::DuplicateRecord { .. } => "duplicate_record",
            Self::DecodeFailure { .. } => "decode_failure",
            Self::StorageFailure(_) => "storage_failure",
            Self::NotFound { .. } => "not_found",
            Self::OrderPersistFailure(_) => "order_persist_failure",
            Self::OrderMismatch(_) => "order_mismatch",
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::ConfigParse(_) => "config_parse",
            Self::ConfigInvalid(_) => "config_invalid",
            Self::InvalidSelector(_) => "invalid_selector",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}

impl From<rusqlite::Error> for GalleryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::StorageFailure(e.to_string())
    }
}

/// Convenience type alias for Results using GalleryError.
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| GalleryError::Other(format!("{}: {e}", f().into())))
    }
}
