//! Reconciliation decisions.
//!
//! A [`ReconcileDecision`] records, for one project and one setting category, whether the
//! live settings needed to change and what happened about it.

use std::fmt;

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;

/// The setting categories managed by the engine, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingCategory {
    Approvals,
    ProtectedBranches,
    Integration,
}

impl SettingCategory {
    /// Returns the category name used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approvals => "merge request approvals",
            Self::ProtectedBranches => "protected branches",
            Self::Integration => "slack integration",
        }
    }
}

impl fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a category was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The resolved group does not manage this category
    Unmanaged,
    /// A change was needed but the run is a dry run
    DryRun,
    /// The live settings could not be read
    FetchFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmanaged => f.write_str("not managed"),
            Self::DryRun => f.write_str("dry run"),
            Self::FetchFailed(reason) => write!(f, "failed to read live settings: {}", reason),
        }
    }
}

/// What happened to one category of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Live settings already match
    Unchanged,
    /// Nothing was written
    Skipped(SkipReason),
    /// The change was written
    Applied,
    /// Writing the change failed
    Failed(String),
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("up to date"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Applied => f.write_str("updated"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// The decision made for one project and one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileDecision {
    /// Category this decision is about
    pub category: SettingCategory,

    /// True if the live settings differ from the desired settings
    pub needs_change: bool,

    /// True if the decision was made during a dry run
    pub dry_run: bool,

    /// What happened
    pub outcome: ReconcileOutcome,

    /// Human readable description of each intended or applied change
    pub changes: Vec<String>,
}

impl ReconcileDecision {
    fn new(category: SettingCategory, dry_run: bool, outcome: ReconcileOutcome) -> Self {
        Self {
            category,
            needs_change: false,
            dry_run,
            outcome,
            changes: Vec::new(),
        }
    }

    /// The group does not manage the category.
    pub fn unmanaged(category: SettingCategory, dry_run: bool) -> Self {
        Self::new(category, dry_run, ReconcileOutcome::Skipped(SkipReason::Unmanaged))
    }

    /// The live settings could not be read.
    pub fn fetch_failed(category: SettingCategory, dry_run: bool, reason: impl Into<String>) -> Self {
        Self::new(
            category,
            dry_run,
            ReconcileOutcome::Skipped(SkipReason::FetchFailed(reason.into())),
        )
    }

    /// The live settings already match.
    pub fn unchanged(category: SettingCategory, dry_run: bool) -> Self {
        Self::new(category, dry_run, ReconcileOutcome::Unchanged)
    }

    /// A change is needed.
    ///
    /// The outcome starts as `Skipped(DryRun)` for dry runs and `Applied` otherwise; the
    /// caller downgrades it with [`ReconcileDecision::failed`] if the write fails.
    pub fn change(category: SettingCategory, dry_run: bool, changes: Vec<String>) -> Self {
        let outcome = if dry_run {
            ReconcileOutcome::Skipped(SkipReason::DryRun)
        } else {
            ReconcileOutcome::Applied
        };

        Self {
            needs_change: true,
            changes,
            ..Self::new(category, dry_run, outcome)
        }
    }

    /// Marks the write as failed.
    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.outcome = ReconcileOutcome::Failed(reason.into());
        self
    }

    /// Returns true if a write was attempted and failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ReconcileOutcome::Failed(_))
    }
}
