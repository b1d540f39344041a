//! Configuration for the GitLab repository settings reconciler.
//!
//! A configuration document lists GitLab groups and, per group, the desired state of the
//! managed setting categories. Documents may be written in YAML, JSON or TOML; the format
//! is chosen by file extension.

pub mod app_config;
pub mod credentials;
pub mod errors;
pub mod loader;
pub mod resolver;
pub mod settings;

pub use app_config::{AppConfig, GitLabConfig, GroupConfig};
pub use credentials::{Credentials, TOKEN_ENV_VAR, URL_ENV_VAR};
pub use errors::{ConfigurationError, ConfigurationResult};
pub use loader::ConfigFormat;
pub use resolver::{resolution_chain, resolve_group};
pub use settings::{
    ApprovalSettings, IntegrationSettings, ProtectedBranchSetting, SlackPropertiesSettings,
};
