//! Slack integration reconciliation.
//!
//! Listed events are switched on; events that are not listed keep their live value.
//! `notify_only_broken_pipelines` follows the GitLab default of `true` unless the group
//! sets it explicitly.
//!
//! GitLab never returns the webhook URL, so it is sent with every update but only
//! compared when both sides carry one.

use async_trait::async_trait;
use gitlab_client::{GitLabApi, Project, SlackEvent, SlackService, SlackServiceUpdate};
use settings_config::{GroupConfig, IntegrationSettings};
use tracing::{info, instrument, warn};

use crate::comparator::SettingComparator;
use crate::decision::{ReconcileDecision, SettingCategory};
use crate::reconciler::Reconciler;

#[cfg(test)]
#[path = "integration_tests.rs"]
mod tests;

/// Compares configured Slack settings with a project's Slack integration.
pub struct IntegrationComparator;

impl IntegrationComparator {
    fn webhooks_match(a: &Option<String>, b: &Option<String>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl SettingComparator for IntegrationComparator {
    type Desired = IntegrationSettings;
    type Live = SlackService;

    fn merge(desired: &IntegrationSettings, live: &SlackService) -> SlackService {
        if desired.is_empty() {
            return live.clone();
        }

        let mut merged = live.clone();

        if let Some(active) = desired.active {
            merged.active = active;
        }

        for name in &desired.events {
            match SlackEvent::from_name(name) {
                Some(event) => merged.enable_event(event),
                None => warn!(event = %name, "Unsupported event type"),
            }
        }

        let props = &desired.properties;
        if props.webhook.is_some() {
            merged.properties.webhook = props.webhook.clone();
        }
        if props.username.is_some() {
            merged.properties.username = props.username.clone();
        }
        if props.channel.is_some() {
            merged.properties.channel = props.channel.clone();
        }
        merged.properties.notify_only_broken_pipelines =
            props.notify_only_broken_pipelines.unwrap_or(true);
        if let Some(value) = props.notify_only_default_branch {
            merged.properties.notify_only_default_branch = value;
        }

        merged
    }

    fn equal(a: &SlackService, b: &SlackService) -> bool {
        a.active == b.active
            && a.push_events == b.push_events
            && a.issues_events == b.issues_events
            && a.confidential_issues_events == b.confidential_issues_events
            && a.merge_requests_events == b.merge_requests_events
            && a.tag_push_events == b.tag_push_events
            && a.note_events == b.note_events
            && a.confidential_note_events == b.confidential_note_events
            && a.pipeline_events == b.pipeline_events
            && a.wiki_page_events == b.wiki_page_events
            && Self::webhooks_match(&a.properties.webhook, &b.properties.webhook)
            && a.properties.username == b.properties.username
            && a.properties.channel == b.properties.channel
            && a.properties.notify_only_broken_pipelines == b.properties.notify_only_broken_pipelines
            && a.properties.notify_only_default_branch == b.properties.notify_only_default_branch
    }

    fn describe_changes(from: &SlackService, to: &SlackService) -> Vec<String> {
        let mut changes = Vec::new();

        if from.active != to.active {
            changes.push(format!("active: {} -> {}", from.active, to.active));
        }

        for event in [
            SlackEvent::Issues,
            SlackEvent::MergeRequest,
            SlackEvent::Pipeline,
            SlackEvent::Push,
            SlackEvent::Tags,
        ] {
            if from.event_enabled(event) != to.event_enabled(event) {
                changes.push(format!(
                    "{} events: {} -> {}",
                    event.as_str(),
                    from.event_enabled(event),
                    to.event_enabled(event)
                ));
            }
        }

        let (old, new) = (&from.properties, &to.properties);
        if !Self::webhooks_match(&old.webhook, &new.webhook) {
            // The webhook URL embeds a secret.
            changes.push("webhook changed".to_string());
        }
        if old.username != new.username {
            changes.push(format!("username: {:?} -> {:?}", old.username, new.username));
        }
        if old.channel != new.channel {
            changes.push(format!("channel: {:?} -> {:?}", old.channel, new.channel));
        }
        if old.notify_only_broken_pipelines != new.notify_only_broken_pipelines {
            changes.push(format!(
                "notify only broken pipelines: {} -> {}",
                old.notify_only_broken_pipelines, new.notify_only_broken_pipelines
            ));
        }
        if old.notify_only_default_branch != new.notify_only_default_branch {
            changes.push(format!(
                "notify only default branch: {} -> {}",
                old.notify_only_default_branch, new.notify_only_default_branch
            ));
        }

        changes
    }
}

/// Reconciles the Slack integration of projects.
pub struct IntegrationReconciler<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: GitLabApi + ?Sized> IntegrationReconciler<'a, C> {
    /// Creates a reconciler issuing requests through `client`.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a, C: GitLabApi + ?Sized> Reconciler for IntegrationReconciler<'a, C> {
    fn category(&self) -> SettingCategory {
        SettingCategory::Integration
    }

    #[instrument(skip_all, fields(project = %project.path_with_namespace))]
    async fn reconcile(
        &self,
        project: &Project,
        group: &GroupConfig,
        dry_run: bool,
    ) -> ReconcileDecision {
        let category = self.category();

        let desired = match group.integration.as_ref() {
            Some(desired) if !desired.is_empty() => desired,
            _ => return ReconcileDecision::unmanaged(category, dry_run),
        };

        let live = match self.client.get_slack_service(project.id).await {
            Ok(live) => live,
            Err(e) => {
                warn!(error = %e, "Failed to read Slack settings");
                return ReconcileDecision::fetch_failed(category, dry_run, e.to_string());
            }
        };

        let merged = IntegrationComparator::merge(desired, &live);
        if IntegrationComparator::equal(&live, &merged) {
            info!("Slack settings don't need updating");
            return ReconcileDecision::unchanged(category, dry_run);
        }

        let changes = IntegrationComparator::describe_changes(&live, &merged);
        let decision = ReconcileDecision::change(category, dry_run, changes);

        if dry_run {
            info!(
                changes = decision.changes.len(),
                "Slack settings need updating, skipping because this is a dry run"
            );
            return decision;
        }

        match self
            .client
            .set_slack_service(project.id, &SlackServiceUpdate::from(&merged))
            .await
        {
            Ok(()) => {
                info!("Slack settings updated");
                decision
            }
            Err(e) => {
                warn!(error = %e, "Failed to update Slack settings");
                decision.failed(e.to_string())
            }
        }
    }
}
