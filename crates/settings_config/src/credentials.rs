//! Credential resolution for the GitLab API.
//!
//! The token and URL are looked up in order: command line value, configuration file,
//! environment variable. Both must end up non-empty before a run may start.

use secrecy::SecretString;
use tracing::debug;

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::GitLabConfig;

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "GITLAB_TOKEN";

/// Environment variable holding the GitLab URL.
pub const URL_ENV_VAR: &str = "GITLAB_URL";

/// Resolved GitLab credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// API token, never logged
    pub token: SecretString,
    /// GitLab base URL
    pub url: String,
}

impl GitLabConfig {
    /// Resolves the API token and URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingCredentials` if either value is empty after
    /// all sources have been consulted.
    pub fn resolve_credentials(
        &self,
        token: Option<&str>,
        url: Option<&str>,
    ) -> ConfigurationResult<Credentials> {
        let token = first_non_empty(token, self.api_token.as_deref(), TOKEN_ENV_VAR);
        let url = first_non_empty(url, self.api_url.as_deref(), URL_ENV_VAR);

        match (token, url) {
            (Some(token), Some(url)) => {
                debug!(url = %url, "Resolved GitLab credentials");
                Ok(Credentials {
                    token: SecretString::from(token),
                    url,
                })
            }
            _ => Err(ConfigurationError::MissingCredentials),
        }
    }
}

fn first_non_empty(flag: Option<&str>, file: Option<&str>, env_var: &str) -> Option<String> {
    flag.map(str::to_string)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| file.map(str::to_string).filter(|v| !v.trim().is_empty()))
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.trim().is_empty()))
}
