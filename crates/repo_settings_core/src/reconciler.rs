//! The per-category reconciliation contract.

use async_trait::async_trait;
use gitlab_client::Project;
use settings_config::GroupConfig;

use crate::decision::{ReconcileDecision, SettingCategory};

/// Brings one setting category of a project in line with its resolved group.
///
/// Every implementation follows the same steps:
///
/// 1. An absent or empty desired fragment yields `Skipped(Unmanaged)` without any request.
/// 2. The live settings are fetched; a failure yields `Skipped(FetchFailed)`.
/// 3. Desired settings are merged over live settings.
/// 4. If the merged value equals the live value the outcome is `Unchanged`.
/// 5. Otherwise a dry run yields `Skipped(DryRun)` and a real run writes the change,
///    reporting `Applied` or `Failed`.
///
/// Reconcilers never return errors; every failure ends up in the decision.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// The category handled by this reconciler.
    fn category(&self) -> SettingCategory;

    /// Reconciles `project` against the settings of `group`.
    async fn reconcile(
        &self,
        project: &Project,
        group: &GroupConfig,
        dry_run: bool,
    ) -> ReconcileDecision;
}
