//! Configuration document types.

use serde::Deserialize;
use std::fmt;

use crate::settings::{ApprovalSettings, IntegrationSettings, ProtectedBranchSetting};

#[cfg(test)]
#[path = "app_config_tests.rs"]
mod tests;

/// Root of a configuration document.
///
/// # Examples
///
/// ```rust
/// use settings_config::{AppConfig, ConfigFormat};
///
/// let yaml = r#"
/// gitlab:
///   groups:
///     - name: acme/backend
///       approvals:
///         approvals_before_merge: 2
/// "#;
///
/// let config = AppConfig::from_str_with_format(yaml, ConfigFormat::Yaml).unwrap();
/// assert_eq!(config.gitlab.groups[0].name, "acme/backend");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// GitLab section
    #[serde(default)]
    pub gitlab: GitLabConfig,
}

/// The `gitlab` section: credentials and the group tree.
#[derive(Clone, Default, Deserialize)]
pub struct GitLabConfig {
    /// API token; may be supplied on the command line or via `GITLAB_TOKEN` instead
    #[serde(default, alias = "apitoken", alias = "apiToken")]
    pub api_token: Option<String>,

    /// GitLab URL; may be supplied on the command line or via `GITLAB_URL` instead
    #[serde(default, alias = "apiurl", alias = "apiUrl")]
    pub api_url: Option<String>,

    /// Configured groups, in document order
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("groups", &self.groups)
            .finish()
    }
}

/// Desired settings for one GitLab group and everything beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GroupConfig {
    /// Full group path, e.g. `acme/backend`
    pub name: String,

    /// Merge request approval settings
    #[serde(default)]
    pub approvals: Option<ApprovalSettings>,

    /// Protected branches
    #[serde(default, alias = "protectedBranches")]
    pub protected_branches: Option<Vec<ProtectedBranchSetting>>,

    /// Slack integration settings
    #[serde(default)]
    pub integration: Option<IntegrationSettings>,
}

impl GroupConfig {
    /// Creates a group entry that manages nothing.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns true if the group carries no settings fragment at all.
    pub fn is_unmanaged(&self) -> bool {
        self.approvals.is_none() && self.protected_branches.is_none() && self.integration.is_none()
    }
}
