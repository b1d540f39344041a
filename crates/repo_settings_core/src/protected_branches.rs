//! Protected branch reconciliation.
//!
//! Each configured branch is matched by name against the project's live protected
//! branches. An exact name wins; otherwise the first name equal ignoring case is used. A branch whose access levels differ is unprotected and protected
//! again with the desired levels; a branch that is not protected yet is protected anew.
//! Live branches that are not configured are left alone.

use async_trait::async_trait;
use gitlab_client::{
    BranchAccessDescription, GitLabApi, ProtectBranchOptions, ProtectedBranch, Project,
};
use settings_config::{GroupConfig, ProtectedBranchSetting};
use tracing::{info, instrument, warn};

use crate::comparator::SettingComparator;
use crate::decision::{ReconcileDecision, SettingCategory};
use crate::reconciler::Reconciler;

#[cfg(test)]
#[path = "protected_branches_tests.rs"]
mod tests;

/// Compares configured branch protection with a project's protected branches.
pub struct ProtectedBranchesComparator;

impl ProtectedBranchesComparator {
    /// Finds the live branch named `name`, falling back to a match that ignores case.
    pub fn find<'a>(live: &'a [ProtectedBranch], name: &str) -> Option<&'a ProtectedBranch> {
        Self::position(live, name).map(|index| &live[index])
    }

    fn position(live: &[ProtectedBranch], name: &str) -> Option<usize> {
        live.iter()
            .position(|b| b.name == name)
            .or_else(|| live.iter().position(|b| b.name.eq_ignore_ascii_case(name)))
    }

    fn sorted_keys(branches: &[ProtectedBranch]) -> Vec<(&str, Vec<u32>, Vec<u32>)> {
        let mut keys: Vec<_> = branches
            .iter()
            .map(|b| (b.name.as_str(), b.merge_levels(), b.push_levels()))
            .collect();
        keys.sort();
        keys
    }

    /// Returns true if `live` already grants exactly the access `setting` asks for.
    pub fn matches(live: Option<&ProtectedBranch>, setting: &ProtectedBranchSetting) -> bool {
        match live {
            Some(branch) => {
                branch.merge_levels() == vec![setting.allowed_to_merge.value()]
                    && branch.push_levels() == vec![setting.allowed_to_push.value()]
            }
            None => false,
        }
    }

    fn desired_branch(setting: &ProtectedBranchSetting, live: Option<&ProtectedBranch>) -> ProtectedBranch {
        ProtectedBranch {
            id: live.map(|b| b.id).unwrap_or_default(),
            name: live.map(|b| b.name.clone()).unwrap_or_else(|| setting.name.clone()),
            push_access_levels: vec![BranchAccessDescription::from(setting.allowed_to_push)],
            merge_access_levels: vec![BranchAccessDescription::from(setting.allowed_to_merge)],
        }
    }
}

impl SettingComparator for ProtectedBranchesComparator {
    type Desired = Vec<ProtectedBranchSetting>;
    type Live = Vec<ProtectedBranch>;

    fn merge(desired: &Vec<ProtectedBranchSetting>, live: &Vec<ProtectedBranch>) -> Vec<ProtectedBranch> {
        let mut merged = live.clone();

        for setting in desired {
            match Self::position(&merged, &setting.name) {
                Some(index) => {
                    let replacement = Self::desired_branch(setting, Some(&merged[index]));
                    merged[index] = replacement;
                }
                None => merged.push(Self::desired_branch(setting, None)),
            }
        }

        merged
    }

    fn equal(a: &Vec<ProtectedBranch>, b: &Vec<ProtectedBranch>) -> bool {
        // Git branch names are case-sensitive, so pair entries by exact name.
        Self::sorted_keys(a) == Self::sorted_keys(b)
    }

    fn describe_changes(from: &Vec<ProtectedBranch>, to: &Vec<ProtectedBranch>) -> Vec<String> {
        let mut changes = Vec::new();

        for branch in to {
            match Self::find(from, &branch.name) {
                None => changes.push(format!(
                    "protect {}: merge {:?}, push {:?}",
                    branch.name,
                    branch.merge_levels(),
                    branch.push_levels()
                )),
                Some(existing) => {
                    if existing.merge_levels() != branch.merge_levels()
                        || existing.push_levels() != branch.push_levels()
                    {
                        changes.push(format!(
                            "{}: merge {:?} -> {:?}, push {:?} -> {:?}",
                            branch.name,
                            existing.merge_levels(),
                            branch.merge_levels(),
                            existing.push_levels(),
                            branch.push_levels()
                        ));
                    }
                }
            }
        }

        changes
    }
}

/// Reconciles the protected branches of projects.
pub struct ProtectedBranchesReconciler<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: GitLabApi + ?Sized> ProtectedBranchesReconciler<'a, C> {
    /// Creates a reconciler issuing requests through `client`.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Replaces the protection of one branch.
    ///
    /// A branch that turns out not to be protected is not an error.
    async fn reprotect(
        &self,
        project_id: u64,
        current_name: &str,
        setting: &ProtectedBranchSetting,
    ) -> Result<(), gitlab_client::Error> {
        match self.client.unprotect_branch(project_id, current_name).await {
            Ok(()) | Err(gitlab_client::Error::NotFound) => {}
            Err(e) => return Err(e),
        }

        let options =
            ProtectBranchOptions::new(&setting.name, setting.allowed_to_merge, setting.allowed_to_push);
        self.client.protect_branch(project_id, &options).await?;
        Ok(())
    }
}

#[async_trait]
impl<'a, C: GitLabApi + ?Sized> Reconciler for ProtectedBranchesReconciler<'a, C> {
    fn category(&self) -> SettingCategory {
        SettingCategory::ProtectedBranches
    }

    #[instrument(skip_all, fields(project = %project.path_with_namespace))]
    async fn reconcile(
        &self,
        project: &Project,
        group: &GroupConfig,
        dry_run: bool,
    ) -> ReconcileDecision {
        let category = self.category();

        let desired = match group.protected_branches.as_ref() {
            Some(desired) if !desired.is_empty() => desired,
            _ => return ReconcileDecision::unmanaged(category, dry_run),
        };

        let live = match self.client.list_protected_branches(project.id).await {
            Ok(live) => live,
            Err(e) => {
                warn!(error = %e, "Failed to list protected branches");
                return ReconcileDecision::fetch_failed(category, dry_run, e.to_string());
            }
        };

        let merged = ProtectedBranchesComparator::merge(desired, &live);
        if ProtectedBranchesComparator::equal(&live, &merged) {
            info!("Branch protection settings don't need updating");
            return ReconcileDecision::unchanged(category, dry_run);
        }

        let changes = ProtectedBranchesComparator::describe_changes(&live, &merged);
        let decision = ReconcileDecision::change(category, dry_run, changes);

        if dry_run {
            info!(
                changes = decision.changes.len(),
                "Branch protection settings need updating, skipping because this is a dry run"
            );
            return decision;
        }

        let mut failures = Vec::new();
        for setting in desired {
            let existing = ProtectedBranchesComparator::find(&live, &setting.name);
            if ProtectedBranchesComparator::matches(existing, setting) {
                continue;
            }

            let current_name = existing.map_or(setting.name.as_str(), |b| b.name.as_str());
            match self.reprotect(project.id, current_name, setting).await {
                Ok(()) => info!(
                    branch = %setting.name,
                    merge = %setting.allowed_to_merge,
                    push = %setting.allowed_to_push,
                    "Branch protection updated"
                ),
                Err(e) => {
                    warn!(branch = %setting.name, error = %e, "Failed to update branch protection");
                    failures.push(format!("{}: {}", setting.name, e));
                }
            }
        }

        if failures.is_empty() {
            decision
        } else {
            decision.failed(failures.join("; "))
        }
    }
}
