//! Chat notification (Slack) integration settings.

use serde::Deserialize;

/// Desired Slack integration settings.
///
/// Event names listed in `events` are switched on. Events that are not listed keep their
/// live value; omission never switches an event off.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct IntegrationSettings {
    /// Whether the integration should be active
    pub active: Option<bool>,

    /// Event names: `issues`, `merge_request`, `pipeline`, `push`, `tags`
    #[serde(default)]
    pub events: Vec<String>,

    /// Integration properties
    #[serde(default)]
    pub properties: SlackPropertiesSettings,
}

impl IntegrationSettings {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Desired Slack integration properties.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct SlackPropertiesSettings {
    /// Incoming webhook URL
    pub webhook: Option<String>,

    /// Username the notifications are posted as
    pub username: Option<String>,

    /// Default channel
    pub channel: Option<String>,

    /// Only notify about broken pipelines; treated as `true` when unset
    pub notify_only_broken_pipelines: Option<bool>,

    /// Only notify about the default branch
    pub notify_only_default_branch: Option<bool>,
}

#[cfg(test)]
#[path = "integration_tests.rs"]
mod tests;
