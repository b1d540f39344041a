//! Error types for the reconciliation engine.
//!
//! Only errors that abort a run live here. Failures to read or write the settings of a
//! single project are reported through [`crate::ReconcileOutcome`] instead.

use settings_config::ConfigurationError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Fatal errors raised by a reconciliation run.
#[derive(Error, Debug)]
pub enum RepoSettingsError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("GitLab request failed: {0}")]
    Transport(#[from] gitlab_client::Error),

    #[error("Cannot find configuration for namespace \"{path}\" or any of its parents")]
    UnresolvedNamespace { path: String },
}

/// Result type alias for reconciliation operations.
pub type RepoSettingsResult<T> = Result<T, RepoSettingsError>;
