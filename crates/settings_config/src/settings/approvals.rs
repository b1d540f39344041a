//! Merge request approval settings.
//!
//! Controls how many approvals a merge request needs and who may give them.

use serde::Deserialize;

/// Desired merge request approval settings.
///
/// Unset fields leave the live value untouched. The approver lists are the exception:
/// once a group manages approvals at all, an unset list means "no approvers".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct ApprovalSettings {
    /// Number of approvals required before merging
    pub approvals_before_merge: Option<u32>,

    /// Remove all approvals when new commits are pushed
    pub reset_approvals_on_push: Option<bool>,

    /// Prevent approvers being edited on individual merge requests
    pub disable_overriding_approvers_per_merge_request: Option<bool>,

    /// Allow the merge request author to approve
    pub merge_requests_author_approval: Option<bool>,

    /// Prevent committers from approving
    pub merge_requests_disable_committers_approval: Option<bool>,

    /// Require the approver to re-enter their password
    pub require_password_to_approve: Option<bool>,

    /// User IDs allowed to approve
    pub approver_ids: Option<Vec<u64>>,

    /// Group IDs whose members are allowed to approve
    pub approver_group_ids: Option<Vec<u64>>,
}

impl ApprovalSettings {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
#[path = "approvals_tests.rs"]
mod tests;
