use repo_settings_core::RepoSettingsError;
use settings_config::ConfigurationError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that end a `repo-settings` invocation with a non-zero exit code.
///
/// Messages are passed through unchanged so that the user sees the underlying cause.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file or credentials are unusable.
    #[error(transparent)]
    Config(#[from] ConfigurationError),

    /// The GitLab client could not be created.
    #[error(transparent)]
    Client(#[from] gitlab_client::Error),

    /// The reconciliation run was aborted.
    #[error(transparent)]
    Reconcile(#[from] RepoSettingsError),
}
