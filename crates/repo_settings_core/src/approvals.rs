//! Merge request approval reconciliation.

use async_trait::async_trait;
use gitlab_client::{
    ApprovalConfiguration, ApprovalConfigurationUpdate, ApproverGroup, ApproverUser,
    ApproversUpdate, BasicGroup, BasicUser, GitLabApi, Project,
};
use settings_config::{ApprovalSettings, GroupConfig};
use tracing::{info, instrument, warn};

use crate::comparator::SettingComparator;
use crate::decision::{ReconcileDecision, SettingCategory};
use crate::reconciler::Reconciler;

#[cfg(test)]
#[path = "approvals_tests.rs"]
mod tests;

/// Compares desired approval settings with a project's approval configuration.
///
/// Once a group manages approvals, approver lists it leaves unset are treated as empty
/// so that approvers added by hand are removed.
pub struct ApprovalsComparator;

impl ApprovalsComparator {
    /// Returns true if the scalar settings (everything except approvers) match.
    pub fn scalars_equal(a: &ApprovalConfiguration, b: &ApprovalConfiguration) -> bool {
        a.approvals_before_merge == b.approvals_before_merge
            && a.reset_approvals_on_push == b.reset_approvals_on_push
            && a.disable_overriding_approvers_per_merge_request
                == b.disable_overriding_approvers_per_merge_request
            && a.merge_requests_author_approval == b.merge_requests_author_approval
            && a.merge_requests_disable_committers_approval
                == b.merge_requests_disable_committers_approval
            && a.require_password_to_approve == b.require_password_to_approve
    }

    /// Returns true if both configurations allow the same approvers and approver groups.
    pub fn approvers_equal(a: &ApprovalConfiguration, b: &ApprovalConfiguration) -> bool {
        a.approver_ids() == b.approver_ids() && a.approver_group_ids() == b.approver_group_ids()
    }
}

impl SettingComparator for ApprovalsComparator {
    type Desired = ApprovalSettings;
    type Live = ApprovalConfiguration;

    fn merge(desired: &ApprovalSettings, live: &ApprovalConfiguration) -> ApprovalConfiguration {
        if desired.is_empty() {
            return live.clone();
        }

        let approver_ids = desired.approver_ids.clone().unwrap_or_default();
        let approver_group_ids = desired.approver_group_ids.clone().unwrap_or_default();

        ApprovalConfiguration {
            approvers: approvers_from_ids(&approver_ids, &live.approvers),
            approver_groups: approver_groups_from_ids(&approver_group_ids, &live.approver_groups),
            approvals_before_merge: desired
                .approvals_before_merge
                .unwrap_or(live.approvals_before_merge),
            reset_approvals_on_push: desired
                .reset_approvals_on_push
                .unwrap_or(live.reset_approvals_on_push),
            disable_overriding_approvers_per_merge_request: desired
                .disable_overriding_approvers_per_merge_request
                .unwrap_or(live.disable_overriding_approvers_per_merge_request),
            merge_requests_author_approval: desired
                .merge_requests_author_approval
                .unwrap_or(live.merge_requests_author_approval),
            merge_requests_disable_committers_approval: desired
                .merge_requests_disable_committers_approval
                .unwrap_or(live.merge_requests_disable_committers_approval),
            require_password_to_approve: desired
                .require_password_to_approve
                .unwrap_or(live.require_password_to_approve),
        }
    }

    fn equal(a: &ApprovalConfiguration, b: &ApprovalConfiguration) -> bool {
        Self::scalars_equal(a, b) && Self::approvers_equal(a, b)
    }

    fn describe_changes(from: &ApprovalConfiguration, to: &ApprovalConfiguration) -> Vec<String> {
        let mut changes = Vec::new();

        describe(
            &mut changes,
            "approvals before merge",
            from.approvals_before_merge,
            to.approvals_before_merge,
        );
        describe(
            &mut changes,
            "reset approvals on push",
            from.reset_approvals_on_push,
            to.reset_approvals_on_push,
        );
        describe(
            &mut changes,
            "disable overriding approvers per merge request",
            from.disable_overriding_approvers_per_merge_request,
            to.disable_overriding_approvers_per_merge_request,
        );
        describe(
            &mut changes,
            "merge request author approval",
            from.merge_requests_author_approval,
            to.merge_requests_author_approval,
        );
        describe(
            &mut changes,
            "disable committers approval",
            from.merge_requests_disable_committers_approval,
            to.merge_requests_disable_committers_approval,
        );
        describe(
            &mut changes,
            "require password to approve",
            from.require_password_to_approve,
            to.require_password_to_approve,
        );

        if from.approver_ids() != to.approver_ids() {
            changes.push(format!(
                "approvers: {:?} -> {:?}",
                from.approver_ids(),
                to.approver_ids()
            ));
        }
        if from.approver_group_ids() != to.approver_group_ids() {
            changes.push(format!(
                "approver groups: {:?} -> {:?}",
                from.approver_group_ids(),
                to.approver_group_ids()
            ));
        }

        changes
    }
}

fn describe<T: PartialEq + std::fmt::Display>(changes: &mut Vec<String>, field: &str, from: T, to: T) {
    if from != to {
        changes.push(format!("{}: {} -> {}", field, from, to));
    }
}

// Known approvers keep their details; new ones are only known by ID.
fn approvers_from_ids(ids: &[u64], live: &[ApproverUser]) -> Vec<ApproverUser> {
    ids.iter()
        .map(|id| {
            live.iter()
                .find(|a| a.user.id == *id)
                .cloned()
                .unwrap_or_else(|| ApproverUser {
                    user: BasicUser {
                        id: *id,
                        username: String::new(),
                        name: String::new(),
                    },
                })
        })
        .collect()
}

fn approver_groups_from_ids(ids: &[u64], live: &[ApproverGroup]) -> Vec<ApproverGroup> {
    ids.iter()
        .map(|id| {
            live.iter()
                .find(|g| g.group.id == *id)
                .cloned()
                .unwrap_or_else(|| ApproverGroup {
                    group: BasicGroup {
                        id: *id,
                        name: String::new(),
                        full_path: String::new(),
                    },
                })
        })
        .collect()
}

/// Reconciles the merge request approval settings of projects.
pub struct ApprovalsReconciler<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: GitLabApi + ?Sized> ApprovalsReconciler<'a, C> {
    /// Creates a reconciler issuing requests through `client`.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    async fn write(
        &self,
        project_id: u64,
        live: &ApprovalConfiguration,
        merged: &ApprovalConfiguration,
    ) -> Result<(), gitlab_client::Error> {
        if !ApprovalsComparator::scalars_equal(live, merged) {
            self.client
                .change_approval_configuration(project_id, &ApprovalConfigurationUpdate::from(merged))
                .await?;
        }

        if !ApprovalsComparator::approvers_equal(live, merged) {
            let update = ApproversUpdate {
                approver_ids: merged.approver_ids(),
                approver_group_ids: merged.approver_group_ids(),
            };
            self.client
                .change_allowed_approvers(project_id, &update)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl<'a, C: GitLabApi + ?Sized> Reconciler for ApprovalsReconciler<'a, C> {
    fn category(&self) -> SettingCategory {
        SettingCategory::Approvals
    }

    #[instrument(skip_all, fields(project = %project.path_with_namespace))]
    async fn reconcile(
        &self,
        project: &Project,
        group: &GroupConfig,
        dry_run: bool,
    ) -> ReconcileDecision {
        let category = self.category();

        let desired = match group.approvals.as_ref() {
            Some(desired) if !desired.is_empty() => desired,
            _ => return ReconcileDecision::unmanaged(category, dry_run),
        };

        let live = match self.client.get_approval_configuration(project.id).await {
            Ok(live) => live,
            Err(e) => {
                warn!(error = %e, "Failed to read merge request approval settings");
                return ReconcileDecision::fetch_failed(category, dry_run, e.to_string());
            }
        };

        let merged = ApprovalsComparator::merge(desired, &live);
        if ApprovalsComparator::equal(&live, &merged) {
            info!("Merge request approval settings don't need updating");
            return ReconcileDecision::unchanged(category, dry_run);
        }

        let changes = ApprovalsComparator::describe_changes(&live, &merged);
        let decision = ReconcileDecision::change(category, dry_run, changes);

        if dry_run {
            info!(
                changes = decision.changes.len(),
                "Merge request approval settings need updating, skipping because this is a dry run"
            );
            return decision;
        }

        match self.write(project.id, &live, &merged).await {
            Ok(()) => {
                info!("Merge request approval settings updated");
                decision
            }
            Err(e) => {
                warn!(error = %e, "Failed to update merge request approval settings");
                decision.failed(e.to_string())
            }
        }
    }
}
