//! Loading configuration files in TOML or YAML.

use std::path::Path;

use tracing::{debug, info, instrument, trace};

use super::path::PathResolver;
use super::schema::GalleryConfig;
use crate::error::{GalleryError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml).
    Yaml,
    /// TOML format (.toml).
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        trace!(extension = %ext, "Detecting config format from extension");
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Load and validate a configuration file.
///
/// A relative `storage.path` is resolved against the file's directory.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The format cannot be detected from the extension
/// - The content cannot be parsed or fails validation
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GalleryConfig> {
    let path = path.as_ref();
    info!("Loading configuration file");

    let format = ConfigFormat::from_extension(path).ok_or_else(|| {
        GalleryError::ConfigParse(format!(
            "Unknown config format for '{}': expected .yaml, .yml, or .toml",
            path.display()
        ))
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GalleryError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            GalleryError::Io(e)
        }
    })?;
    debug!(bytes = content.len(), format = ?format, "Read config file");

    let mut config = load_config_from_str(&content, format)?;
    if let Some(db) = config.storage.path.take() {
        config.storage.path = Some(PathResolver::new(path)?.resolve(&db)?);
    }
    Ok(config)
}

/// Parse and validate configuration text.
#[instrument(skip(content), fields(format = ?format, content_len = content.len()))]
pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<GalleryConfig> {
    let config: GalleryConfig = match format {
        ConfigFormat::Yaml if content.trim().is_empty() => GalleryConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| GalleryError::ConfigParse(format!("YAML: {e}")))?,
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| GalleryError::ConfigParse(format!("TOML: {e}")))?
        }
    };

    config.validate()?;

    debug!(
        max_count = config.limits.max_count,
        max_total_mb = config.limits.max_total_mb,
        quota = ?config.storage.quota_bytes,
        "Configuration loaded and validated"
    );
    Ok(config)
}

/// Render a configuration as TOML.
pub fn to_toml_string(config: &GalleryConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| GalleryError::ConfigParse(format!("TOML: {e}")))
}
