//! Loading configuration documents from disk.

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::AppConfig;

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Selects a format from a file extension, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnsupportedFormat` for unknown extensions.
    pub fn from_extension(extension: &str) -> ConfigurationResult<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigurationError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }
}

impl AppConfig {
    /// Reads and parses the configuration document at `path`.
    ///
    /// # Errors
    ///
    /// * `FileNotFound` if the file does not exist
    /// * `UnsupportedFormat` if the extension is not `yaml`, `yml`, `json` or `toml`
    /// * `FileAccessError` if the file cannot be read
    /// * `ParseError` if the content is not a valid document (including unknown access
    ///   level names)
    pub fn load(path: impl AsRef<Path>) -> ConfigurationResult<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        if !path.is_file() {
            return Err(ConfigurationError::FileNotFound { path: shown });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = ConfigFormat::from_extension(extension)?;

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::FileAccessError {
                path: shown.clone(),
                reason: e.to_string(),
            })?;

        debug!(path = %shown, format = ?format, "Parsing configuration file");
        let config = Self::from_str_with_format(&content, format)?;

        info!(
            path = %shown,
            groups = config.gitlab.groups.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses a configuration document held in memory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ParseError` if the content does not parse.
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> ConfigurationResult<Self> {
        let parsed = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| ConfigurationError::ParseError { reason })
    }
}
