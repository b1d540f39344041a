//! Human readable run summaries.

use colored::Colorize;
use repo_settings_core::{ReconcileDecision, ReconcileOutcome, RunSummary, SkipReason};

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

/// Formats a run summary for the terminal.
///
/// Categories the resolved group does not manage are left out.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    if summary.dry_run {
        output.push_str(&format!("{}\n\n", "Dry run: no changes were written".yellow().bold()));
    }

    for project in &summary.projects {
        let managed: Vec<&ReconcileDecision> = project
            .decisions
            .iter()
            .filter(|d| d.outcome != ReconcileOutcome::Skipped(SkipReason::Unmanaged))
            .collect();
        if managed.is_empty() {
            continue;
        }

        output.push_str(&format!(
            "{} {}\n",
            project.project.bold(),
            format!("({})", project.group).dimmed()
        ));

        for decision in managed {
            output.push_str(&format!(
                "  {} {}: {}\n",
                outcome_marker(&decision.outcome),
                decision.category,
                decision.outcome
            ));
            for change in &decision.changes {
                output.push_str(&format!("      {}\n", change));
            }
        }
    }

    let totals = if summary.dry_run {
        format!(
            "{} projects: {} pending, {} up to date, {} failed",
            summary.projects.len(),
            summary.pending(),
            summary.unchanged(),
            summary.failed()
        )
    } else {
        format!(
            "{} projects: {} updated, {} up to date, {} failed",
            summary.projects.len(),
            summary.applied(),
            summary.unchanged(),
            summary.failed()
        )
    };

    if summary.is_success() {
        output.push_str(&format!("\n{}\n", totals.green()));
    } else {
        output.push_str(&format!("\n{}\n", totals.red()));
    }

    output
}

fn outcome_marker(outcome: &ReconcileOutcome) -> String {
    match outcome {
        ReconcileOutcome::Unchanged => "✓".green().to_string(),
        ReconcileOutcome::Applied => "✓".green().bold().to_string(),
        ReconcileOutcome::Skipped(SkipReason::DryRun) => "~".yellow().to_string(),
        ReconcileOutcome::Skipped(_) => "!".yellow().to_string(),
        ReconcileOutcome::Failed(_) => "✗".red().to_string(),
    }
}
