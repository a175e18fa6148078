//! Media type handling and light image inspection.

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

use crate::error::{GalleryError, Result};
use crate::record::ImageRecord;

/// Media types the gallery accepts. Matching is case-insensitive.
pub const SUPPORTED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Returns true if `media_type` is one of [`SUPPORTED_MEDIA_TYPES`].
#[must_use]
pub fn is_supported_media_type(media_type: &str) -> bool {
    SUPPORTED_MEDIA_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(media_type.trim()))
}

/// Declared media type for a file, from its extension.
///
/// Unknown extensions map to `application/octet-stream`, which the pipeline
/// then rejects as unsupported.
#[must_use]
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg" | "jfif") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("txt" | "md") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// File extension to use when exporting a record.
#[must_use]
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    match media_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Pixel dimensions of a stored record, sniffed from its payload.
///
/// # Errors
///
/// Returns an error if the payload is not a recognizable image.
pub fn dimensions(record: &ImageRecord) -> Result<(u32, u32)> {
    let bytes = record.to_bytes()?;
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(GalleryError::Io)?;
    reader.into_dimensions().map_err(|e| GalleryError::DecodeFailure {
        name: record.id(),
        reason: e.to_string(),
    })
}
