//! Merge request approval configuration types.
//!
//! These mirror the payloads of `GET /projects/:id/approvals`, `POST /projects/:id/approvals`
//! and `PUT /projects/:id/approvers`.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "approvals_tests.rs"]
mod tests;

/// A user allowed to approve merge requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApproverUser {
    pub user: BasicUser,
}

/// Minimal user representation embedded in approval payloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BasicUser {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
}

/// A group whose members are allowed to approve merge requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApproverGroup {
    pub group: BasicGroup,
}

/// Minimal group representation embedded in approval payloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BasicGroup {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_path: String,
}

/// The live merge request approval configuration of a project.
///
/// Missing fields default to zero values, which is what GitLab reports for projects on
/// tiers where some settings are unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApprovalConfiguration {
    pub approvers: Vec<ApproverUser>,
    pub approver_groups: Vec<ApproverGroup>,
    pub approvals_before_merge: u32,
    pub reset_approvals_on_push: bool,
    pub disable_overriding_approvers_per_merge_request: bool,
    pub merge_requests_author_approval: bool,
    pub merge_requests_disable_committers_approval: bool,
    pub require_password_to_approve: bool,
}

impl ApprovalConfiguration {
    /// IDs of the individual approvers, sorted.
    pub fn approver_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.approvers.iter().map(|a| a.user.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// IDs of the approver groups, sorted.
    pub fn approver_group_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.approver_groups.iter().map(|g| g.group.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Body of `POST /projects/:id/approvals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalConfigurationUpdate {
    pub approvals_before_merge: u32,
    pub reset_approvals_on_push: bool,
    pub disable_overriding_approvers_per_merge_request: bool,
    pub merge_requests_author_approval: bool,
    pub merge_requests_disable_committers_approval: bool,
    pub require_password_to_approve: bool,
}

impl From<&ApprovalConfiguration> for ApprovalConfigurationUpdate {
    fn from(value: &ApprovalConfiguration) -> Self {
        Self {
            approvals_before_merge: value.approvals_before_merge,
            reset_approvals_on_push: value.reset_approvals_on_push,
            disable_overriding_approvers_per_merge_request: value
                .disable_overriding_approvers_per_merge_request,
            merge_requests_author_approval: value.merge_requests_author_approval,
            merge_requests_disable_committers_approval: value
                .merge_requests_disable_committers_approval,
            require_password_to_approve: value.require_password_to_approve,
        }
    }
}

/// Body of `PUT /projects/:id/approvers`.
///
/// GitLab replaces both lists wholesale, so an empty list clears the approvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproversUpdate {
    pub approver_ids: Vec<u64>,
    pub approver_group_ids: Vec<u64>,
}
