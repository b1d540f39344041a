//! Command line arguments and the top level run.

use std::path::PathBuf;

use clap::Parser;
use gitlab_client::GitLabClient;
use repo_settings_core::{RunOptions, RunSummary, SettingsReconciler};
use settings_config::AppConfig;
use tracing::{info, instrument};

use crate::errors::Error;

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

/// repo-settings: configure repository settings across a GitLab group
///
/// Reads a configuration file listing GitLab groups and applies the configured merge
/// request approval, protected branch and Slack settings to every project found within.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "repo-settings")]
#[command(about = "CLI to configure repository settings in a GitLab group or project.")]
pub struct Cli {
    /// Path to the config file (yaml, yml, json or toml)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Perform a dry run
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// GitLab API token [env: GITLAB_TOKEN]
    #[arg(long)]
    pub gitlab_token: Option<String>,

    /// GitLab URL [env: GITLAB_URL]
    #[arg(long)]
    pub gitlab_url: Option<String>,
}

/// Loads the configuration, connects to GitLab and runs one reconciliation pass.
///
/// # Errors
///
/// Returns an error for anything that aborts the run: an unreadable configuration,
/// missing credentials, an unknown group or a failed listing. Per-project failures are
/// reported in the summary instead.
#[instrument(skip_all, fields(config = %config_path.display(), dry_run = cli.dry_run))]
pub async fn execute(cli: &Cli, config_path: &std::path::Path) -> Result<RunSummary, Error> {
    let config = AppConfig::load(config_path)?;

    let credentials = config
        .gitlab
        .resolve_credentials(cli.gitlab_token.as_deref(), cli.gitlab_url.as_deref())?;

    let options = RunOptions {
        dry_run: cli.dry_run,
    };

    if config.gitlab.groups.is_empty() {
        info!("No groups configured, nothing to do");
        return Ok(RunSummary::new(options.dry_run));
    }

    let client = GitLabClient::new(&credentials.url, credentials.token)?;
    let summary = SettingsReconciler::new(client)
        .run(&config.gitlab.groups, options)
        .await?;

    Ok(summary)
}
