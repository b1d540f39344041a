use super::*;
use serial_test::serial;
use settings_config::{ConfigurationError, TOKEN_ENV_VAR, URL_ENV_VAR};
use std::io::Write;
use tempfile::Builder;

fn clear_env() {
    std::env::remove_var(TOKEN_ENV_VAR);
    std::env::remove_var(URL_ENV_VAR);
}

#[test]
fn test_parse_all_flags() {
    let cli = Cli::try_parse_from([
        "repo-settings",
        "--config",
        "settings.yaml",
        "-d",
        "--gitlab-token",
        "glpat-x",
        "--gitlab-url",
        "https://gitlab.example.com",
    ])
    .expect("Failed to parse arguments");

    assert_eq!(cli.config, Some(PathBuf::from("settings.yaml")));
    assert!(cli.dry_run);
    assert_eq!(cli.gitlab_token.as_deref(), Some("glpat-x"));
    assert_eq!(cli.gitlab_url.as_deref(), Some("https://gitlab.example.com"));
}

#[test]
fn test_parse_without_config() {
    let cli = Cli::try_parse_from(["repo-settings"]).expect("Failed to parse arguments");

    assert!(cli.config.is_none());
    assert!(!cli.dry_run);
}

#[test]
fn test_short_config_flag() {
    let cli = Cli::try_parse_from(["repo-settings", "-c", "settings.json", "--dry-run"])
        .expect("Failed to parse arguments");

    assert_eq!(cli.config, Some(PathBuf::from("settings.json")));
    assert!(cli.dry_run);
}

#[tokio::test]
#[serial]
async fn test_missing_config_file() {
    clear_env();

    let result = execute(&Cli::default(), std::path::Path::new("/no/such/settings.yaml")).await;

    match result {
        Err(Error::Config(ConfigurationError::FileNotFound { path })) => {
            assert_eq!(path, "/no/such/settings.yaml");
        }
        other => panic!("Expected FileNotFound, got {:?}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_missing_credentials() {
    clear_env();
    let mut file = Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp file");
    writeln!(file, "gitlab:\n  groups:\n    - name: acme").expect("Failed to write config");

    let result = execute(&Cli::default(), file.path()).await;

    assert!(matches!(
        result,
        Err(Error::Config(ConfigurationError::MissingCredentials))
    ));
}

#[tokio::test]
#[serial]
async fn test_no_groups_is_an_empty_run() {
    clear_env();
    let mut file = Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    write!(
        file,
        r#"{{"gitlab": {{"api_token": "t", "api_url": "https://gitlab.example.com"}}}}"#
    )
    .expect("Failed to write config");

    let cli = Cli {
        dry_run: true,
        ..Default::default()
    };
    let summary = execute(&cli, file.path()).await.expect("Run failed");

    assert!(summary.dry_run);
    assert!(summary.projects.is_empty());
}
