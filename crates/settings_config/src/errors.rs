//! Configuration system error types.
//!
//! Domain-specific errors for configuration loading, parsing, credential resolution and
//! group lookup. Every variant is fatal to a run.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration system errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Cannot open config file {path}")]
    FileNotFound { path: String },

    #[error("Failed to access configuration file: {path} - {reason}")]
    FileAccessError { path: String, reason: String },

    #[error("Unsupported config type \"{extension}\"")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse configuration: {reason}")]
    ParseError { reason: String },

    #[error("Invalid access type: {value}")]
    InvalidAccessLevel { value: String },

    #[error("Missing required API token and/or URL params")]
    MissingCredentials,

    #[error("Cannot find group with name \"{name}\"; if this is a subgroup include its parent group(s) in the name")]
    GroupNotFound { name: String },
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
