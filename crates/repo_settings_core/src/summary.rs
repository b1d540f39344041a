//! Run summaries.

use chrono::{DateTime, Utc};
use gitlab_client::Project;

use crate::decision::{ReconcileDecision, ReconcileOutcome, SkipReason};

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;

/// Decisions made for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport {
    /// Project ID
    pub project_id: u64,

    /// Project path including its namespace
    pub project: String,

    /// Name of the configured group whose settings were applied
    pub group: String,

    /// One decision per setting category, in processing order
    pub decisions: Vec<ReconcileDecision>,
}

impl ProjectReport {
    /// Creates an empty report for `project`, resolved to `group`.
    pub fn new(project: &Project, group: &str) -> Self {
        Self {
            project_id: project.id,
            project: project.path_with_namespace.clone(),
            group: group.to_string(),
            decisions: Vec::new(),
        }
    }

    /// Returns true if any category of this project failed to apply.
    pub fn has_failures(&self) -> bool {
        self.decisions.iter().any(ReconcileDecision::is_failure)
    }
}

/// Result of a reconciliation run.
///
/// Contains one report per processed project plus counters over all decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// True if no changes were written
    pub dry_run: bool,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished; `None` while it is in progress
    pub finished_at: Option<DateTime<Utc>>,

    /// Per-project reports, in processing order
    pub projects: Vec<ProjectReport>,
}

impl RunSummary {
    /// Creates an empty summary starting now.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            projects: Vec::new(),
        }
    }

    /// Records the end of the run.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    fn count(&self, predicate: impl Fn(&ReconcileOutcome) -> bool) -> usize {
        self.projects
            .iter()
            .flat_map(|p| p.decisions.iter())
            .filter(|d| predicate(&d.outcome))
            .count()
    }

    /// Number of category changes written.
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, ReconcileOutcome::Applied))
    }

    /// Number of categories already in the desired state.
    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, ReconcileOutcome::Unchanged))
    }

    /// Number of categories not written, for any reason.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ReconcileOutcome::Skipped(_)))
    }

    /// Number of changes a dry run would have written.
    pub fn pending(&self) -> usize {
        self.count(|o| matches!(o, ReconcileOutcome::Skipped(SkipReason::DryRun)))
    }

    /// Number of categories whose live settings could not be read or written.
    pub fn failed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                ReconcileOutcome::Failed(_) | ReconcileOutcome::Skipped(SkipReason::FetchFailed(_))
            )
        })
    }

    /// Returns true if nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Returns true if any change was written.
    pub fn has_changes(&self) -> bool {
        self.applied() > 0
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new(false)
    }
}
