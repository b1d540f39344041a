//! Protected branch settings.
//!
//! Each entry names a branch and who may merge into and push to it.

use gitlab_client::AccessLevel;
use serde::{Deserialize, Deserializer};

use crate::errors::{ConfigurationError, ConfigurationResult};

/// Desired protection of one branch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtectedBranchSetting {
    /// Branch name, matched case-insensitively against live protected branches
    pub name: String,

    /// Who may merge: `developers`, `maintainers` or `no one`
    #[serde(deserialize_with = "deserialize_access_level")]
    pub allowed_to_merge: AccessLevel,

    /// Who may push: `developers`, `maintainers` or `no one`
    #[serde(deserialize_with = "deserialize_access_level")]
    pub allowed_to_push: AccessLevel,
}

/// Maps an access level name to an [`AccessLevel`], ignoring case.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidAccessLevel` for anything other than
/// `developers`, `maintainers` or `no one`.
///
/// # Examples
///
/// ```rust
/// use gitlab_client::AccessLevel;
/// use settings_config::settings::parse_access_level;
///
/// assert_eq!(parse_access_level("Maintainers").unwrap(), AccessLevel::Maintainers);
/// assert!(parse_access_level("owners").is_err());
/// ```
pub fn parse_access_level(value: &str) -> ConfigurationResult<AccessLevel> {
    if value.eq_ignore_ascii_case("developers") {
        return Ok(AccessLevel::Developers);
    }
    if value.eq_ignore_ascii_case("maintainers") {
        return Ok(AccessLevel::Maintainers);
    }
    if value.eq_ignore_ascii_case("no one") {
        return Ok(AccessLevel::NoOne);
    }

    Err(ConfigurationError::InvalidAccessLevel {
        value: value.to_string(),
    })
}

fn deserialize_access_level<'de, D>(deserializer: D) -> Result<AccessLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_access_level(&value).map_err(serde::de::Error::custom)
}

#[cfg(test)]
#[path = "protected_branch_tests.rs"]
mod tests;
