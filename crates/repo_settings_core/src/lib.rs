//! GitLab repository settings reconciliation engine.
//!
//! [`SettingsReconciler`] walks the projects of every configured group, resolves the
//! group configuration that governs each project and brings three setting categories
//! in line with it: merge request approvals, protected branches and the Slack
//! integration. Everything runs sequentially; one project is finished before the next
//! one starts.

use std::collections::HashSet;

use gitlab_client::{GitLabApi, Group};
use settings_config::{resolve_group, ConfigurationError, GroupConfig};
use tracing::{info, instrument};

pub mod approvals;
pub mod comparator;
pub mod decision;
pub mod enumerator;
pub mod errors;
pub mod integration;
pub mod protected_branches;
pub mod reconciler;
pub mod summary;

pub use approvals::{ApprovalsComparator, ApprovalsReconciler};
pub use comparator::SettingComparator;
pub use decision::{ReconcileDecision, ReconcileOutcome, SettingCategory, SkipReason};
pub use enumerator::{Enumerator, PageCursor, GROUPS_PER_PAGE, PROJECTS_PER_PAGE};
pub use errors::{RepoSettingsError, RepoSettingsResult};
pub use integration::{IntegrationComparator, IntegrationReconciler};
pub use protected_branches::{ProtectedBranchesComparator, ProtectedBranchesReconciler};
pub use reconciler::Reconciler;
pub use summary::{ProjectReport, RunSummary};

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Options for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute every decision but write nothing
    pub dry_run: bool,
}

/// Finds the ID of the remote group a configured group name refers to.
///
/// The name is matched, ignoring case, as the `groups/<name>` suffix of the group's web
/// URL. Groups whose web URL has no `groups/` segment are matched on their full path.
///
/// # Examples
///
/// ```rust
/// use gitlab_client::Group;
/// use repo_settings_core::find_group_id;
///
/// let groups = vec![Group {
///     id: 42,
///     name: "backend".to_string(),
///     path: "backend".to_string(),
///     full_path: "acme/backend".to_string(),
///     web_url: "https://gitlab.example.com/groups/acme/backend".to_string(),
/// }];
///
/// assert_eq!(find_group_id(&groups, "Acme/Backend"), Some(42));
/// assert_eq!(find_group_id(&groups, "backend"), None);
/// ```
pub fn find_group_id(groups: &[Group], name: &str) -> Option<u64> {
    let suffix = format!("/groups/{}", name.to_lowercase());

    groups
        .iter()
        .find(|g| g.web_url.to_lowercase().ends_with(&suffix))
        .or_else(|| groups.iter().find(|g| g.full_path.eq_ignore_ascii_case(name)))
        .map(|g| g.id)
}

/// Reconciles the settings of every project under the configured groups.
///
/// # Examples
///
/// ```rust,no_run
/// use gitlab_client::GitLabClient;
/// use repo_settings_core::{RunOptions, SettingsReconciler};
/// use secrecy::SecretString;
/// use settings_config::AppConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AppConfig::load("settings.yaml")?;
/// let client = GitLabClient::new("https://gitlab.example.com", SecretString::from("token"))?;
///
/// let summary = SettingsReconciler::new(client)
///     .run(&config.gitlab.groups, RunOptions { dry_run: true })
///     .await?;
/// println!("{} changes pending", summary.pending());
/// # Ok(())
/// # }
/// ```
pub struct SettingsReconciler<C> {
    client: C,
}

impl<C: GitLabApi> SettingsReconciler<C> {
    /// Creates a reconciler issuing requests through `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Runs one reconciliation pass.
    ///
    /// All configured groups are resolved to remote groups before any project is touched.
    /// Projects reachable through more than one configured group are processed once.
    ///
    /// # Errors
    ///
    /// * `Configuration(GroupNotFound)` if a configured group does not exist
    /// * `Transport` if a group or project listing fails
    /// * `UnresolvedNamespace` if a listed project matches no configured group
    ///
    /// Failures to read or write a single project's settings are not errors; they are
    /// recorded in the returned summary.
    #[instrument(skip_all, fields(dry_run = options.dry_run))]
    pub async fn run(
        &self,
        groups: &[GroupConfig],
        options: RunOptions,
    ) -> RepoSettingsResult<RunSummary> {
        let mut summary = RunSummary::new(options.dry_run);
        let enumerator = Enumerator::new(&self.client);

        let remote_groups = enumerator.list_groups().await?;
        let mut targets = Vec::with_capacity(groups.len());
        for group in groups {
            let id = find_group_id(&remote_groups, &group.name).ok_or_else(|| {
                ConfigurationError::GroupNotFound {
                    name: group.name.clone(),
                }
            })?;
            targets.push((group, id));
        }

        let approvals = ApprovalsReconciler::new(&self.client);
        let protected_branches = ProtectedBranchesReconciler::new(&self.client);
        let integration = IntegrationReconciler::new(&self.client);
        let reconcilers: [&dyn Reconciler; 3] = [&approvals, &protected_branches, &integration];

        let mut seen = HashSet::new();
        for (group, group_id) in targets {
            info!(group = %group.name, group_id = group_id, "Processing group");

            for project in enumerator.list_projects(group_id).await? {
                if !seen.insert(project.id) {
                    continue;
                }

                let resolved = resolve_group(groups, project.namespace_path()).ok_or_else(|| {
                    RepoSettingsError::UnresolvedNamespace {
                        path: project.namespace_path().to_string(),
                    }
                })?;

                info!(
                    project = %project.path_with_namespace,
                    group = %resolved.name,
                    "Processing project"
                );

                let mut report = ProjectReport::new(&project, &resolved.name);
                for reconciler in reconcilers {
                    report
                        .decisions
                        .push(reconciler.reconcile(&project, resolved, options.dry_run).await);
                }
                summary.projects.push(report);
            }
        }

        summary.finish();
        info!(
            projects = summary.projects.len(),
            applied = summary.applied(),
            unchanged = summary.unchanged(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Reconciliation complete"
        );

        Ok(summary)
    }
}
