//! Slack notification integration types and event names.
//!
//! GitLab exposes the integration at `/projects/:id/services/slack`. Older GitLab
//! releases serialize the boolean properties as strings (`"true"`, `"1"`), so those
//! fields are deserialized leniently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;

/// Slack notification trigger events that can be managed from configuration.
///
/// GitLab has more triggers (notes, wiki pages, jobs); only these can be switched on
/// through the `events` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlackEvent {
    /// Issue created, updated or closed
    Issues,
    /// Merge request created, updated or merged
    MergeRequest,
    /// Pipeline status changes
    Pipeline,
    /// Any push to the repository
    Push,
    /// Tag pushes
    Tags,
}

impl SlackEvent {
    /// Converts an event name as written in configuration to a `SlackEvent`.
    ///
    /// Returns None if the name doesn't match a known event.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "issues" => Some(Self::Issues),
            "merge_request" => Some(Self::MergeRequest),
            "pipeline" => Some(Self::Pipeline),
            "push" => Some(Self::Push),
            "tags" => Some(Self::Tags),
            _ => None,
        }
    }

    /// Converts the event to its configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::MergeRequest => "merge_request",
            Self::Pipeline => "pipeline",
            Self::Push => "push",
            Self::Tags => "tags",
        }
    }
}

/// The Slack integration of a project.
///
/// # Examples
///
/// ```rust
/// use gitlab_client::{SlackEvent, SlackService};
///
/// let mut service: SlackService = serde_json::from_str(r#"{
///     "id": 5,
///     "title": "Slack notifications",
///     "active": true,
///     "push_events": true,
///     "properties": { "notify_only_broken_pipelines": "1" }
/// }"#).unwrap();
///
/// assert!(service.properties.notify_only_broken_pipelines);
/// assert!(!service.event_enabled(SlackEvent::Issues));
///
/// service.enable_event(SlackEvent::Issues);
/// assert!(service.issues_events);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlackService {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub push_events: bool,
    #[serde(default)]
    pub issues_events: bool,
    #[serde(default)]
    pub confidential_issues_events: bool,
    #[serde(default)]
    pub merge_requests_events: bool,
    #[serde(default)]
    pub tag_push_events: bool,
    #[serde(default)]
    pub note_events: bool,
    #[serde(default)]
    pub confidential_note_events: bool,
    #[serde(default)]
    pub pipeline_events: bool,
    #[serde(default)]
    pub wiki_page_events: bool,
    #[serde(default)]
    pub properties: SlackServiceProperties,
}

impl SlackService {
    /// Returns whether the flag backing `event` is switched on.
    pub fn event_enabled(&self, event: SlackEvent) -> bool {
        match event {
            SlackEvent::Issues => self.issues_events,
            SlackEvent::MergeRequest => self.merge_requests_events,
            SlackEvent::Pipeline => self.pipeline_events,
            SlackEvent::Push => self.push_events,
            SlackEvent::Tags => self.tag_push_events,
        }
    }

    /// Switches on the flag backing `event`.
    pub fn enable_event(&mut self, event: SlackEvent) {
        match event {
            SlackEvent::Issues => self.issues_events = true,
            SlackEvent::MergeRequest => self.merge_requests_events = true,
            SlackEvent::Pipeline => self.pipeline_events = true,
            SlackEvent::Push => self.push_events = true,
            SlackEvent::Tags => self.tag_push_events = true,
        }
    }
}

/// Integration specific properties of the Slack service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlackServiceProperties {
    #[serde(default)]
    pub webhook: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub notify_only_broken_pipelines: bool,
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub notify_only_default_branch: bool,
}

/// Body of `PUT /projects/:id/services/slack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackServiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub notify_only_broken_pipelines: bool,
    pub notify_only_default_branch: bool,
    pub active: bool,
    pub push_events: bool,
    pub issues_events: bool,
    pub confidential_issues_events: bool,
    pub merge_requests_events: bool,
    pub tag_push_events: bool,
    pub note_events: bool,
    pub confidential_note_events: bool,
    pub pipeline_events: bool,
    pub wiki_page_events: bool,
}

impl From<&SlackService> for SlackServiceUpdate {
    fn from(value: &SlackService) -> Self {
        Self {
            webhook: value.properties.webhook.clone(),
            username: value.properties.username.clone(),
            channel: value.properties.channel.clone(),
            notify_only_broken_pipelines: value.properties.notify_only_broken_pipelines,
            notify_only_default_branch: value.properties.notify_only_default_branch,
            active: value.active,
            push_events: value.push_events,
            issues_events: value.issues_events,
            confidential_issues_events: value.confidential_issues_events,
            merge_requests_events: value.merge_requests_events,
            tag_push_events: value.tag_push_events,
            note_events: value.note_events,
            confidential_note_events: value.confidential_note_events,
            pipeline_events: value.pipeline_events,
            wiki_page_events: value.wiki_page_events,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientBool {
    Bool(bool),
    Number(u64),
    Text(String),
}

/// Deserialize a boolean GitLab may send as `true`, `"true"`, `"1"`, `1` or `null`.
fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientBool>::deserialize(deserializer)?;
    Ok(match value {
        None => false,
        Some(LenientBool::Bool(b)) => b,
        Some(LenientBool::Number(n)) => n != 0,
        Some(LenientBool::Text(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
    })
}
