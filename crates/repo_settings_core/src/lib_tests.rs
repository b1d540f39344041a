use super::*;
use crate::test_support::{group, project, protected, Call, FakeGitLab};
use gitlab_client::{AccessLevel, SlackService};
use settings_config::{ApprovalSettings, IntegrationSettings, ProtectedBranchSetting};

fn backend_config() -> Vec<GroupConfig> {
    vec![
        GroupConfig {
            approvals: Some(ApprovalSettings {
                approvals_before_merge: Some(1),
                ..Default::default()
            }),
            ..GroupConfig::named("acme")
        },
        GroupConfig {
            protected_branches: Some(vec![ProtectedBranchSetting {
                name: "main".to_string(),
                allowed_to_merge: AccessLevel::Maintainers,
                allowed_to_push: AccessLevel::NoOne,
            }]),
            integration: Some(IntegrationSettings {
                events: vec!["push".to_string(), "issues".to_string()],
                ..Default::default()
            }),
            ..GroupConfig::named("acme/backend")
        },
    ]
}

fn populated_fake() -> FakeGitLab {
    FakeGitLab::with_state(|s| {
        s.groups = vec![group(1, "acme"), group(2, "acme/backend")];
        s.projects.insert(
            1,
            vec![project(10, "acme", "site"), project(20, "acme/backend", "api")],
        );
        s.projects.insert(2, vec![project(20, "acme/backend", "api")]);
        s.branches.insert(20, vec![protected("main", 30, 30)]);
        s.slack.insert(
            20,
            SlackService {
                push_events: true,
                ..Default::default()
            },
        );
    })
}

#[test]
fn test_find_group_id_by_web_url_suffix() {
    let groups = vec![group(1, "acme"), group(2, "acme/backend")];

    assert_eq!(find_group_id(&groups, "acme"), Some(1));
    assert_eq!(find_group_id(&groups, "ACME/backend"), Some(2));
    assert_eq!(find_group_id(&groups, "backend"), None);
    assert_eq!(find_group_id(&groups, "other"), None);
}

#[test]
fn test_find_group_id_falls_back_to_full_path() {
    let mut modern = group(3, "acme/tools");
    modern.web_url = "https://gitlab.example.com/acme/tools".to_string();

    assert_eq!(find_group_id(&[modern], "Acme/Tools"), Some(3));
}

#[tokio::test]
async fn test_run_reconciles_every_project_once() {
    let fake = populated_fake();
    let reconciler = SettingsReconciler::new(fake);

    let summary = reconciler
        .run(&backend_config(), RunOptions::default())
        .await
        .expect("Run failed");

    assert_eq!(summary.projects.len(), 2);
    assert!(summary.finished_at.is_some());

    let site = &summary.projects[0];
    assert_eq!(site.project, "acme/site");
    assert_eq!(site.group, "acme");
    assert_eq!(site.decisions[0].outcome, ReconcileOutcome::Applied);
    assert_eq!(
        site.decisions[1].outcome,
        ReconcileOutcome::Skipped(SkipReason::Unmanaged)
    );

    let api = &summary.projects[1];
    assert_eq!(api.group, "acme/backend");
    let categories: Vec<SettingCategory> = api.decisions.iter().map(|d| d.category).collect();
    assert_eq!(
        categories,
        vec![
            SettingCategory::Approvals,
            SettingCategory::ProtectedBranches,
            SettingCategory::Integration,
        ]
    );
    // acme/backend does not manage approvals; the nearest group wins outright.
    assert_eq!(
        api.decisions[0].outcome,
        ReconcileOutcome::Skipped(SkipReason::Unmanaged)
    );
    assert_eq!(api.decisions[1].outcome, ReconcileOutcome::Applied);
    assert_eq!(api.decisions[2].outcome, ReconcileOutcome::Applied);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_second_run_changes_nothing() {
    let reconciler = SettingsReconciler::new(populated_fake());
    let config = backend_config();

    reconciler
        .run(&config, RunOptions::default())
        .await
        .expect("First run failed");
    reconciler.client.clear_calls();
    let summary = reconciler
        .run(&config, RunOptions::default())
        .await
        .expect("Second run failed");

    assert!(!summary.has_changes());
    assert_eq!(summary.unchanged(), 3);
    assert!(reconciler.client.writes().is_empty());
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let reconciler = SettingsReconciler::new(populated_fake());

    let summary = reconciler
        .run(&backend_config(), RunOptions { dry_run: true })
        .await
        .expect("Run failed");

    assert!(summary.dry_run);
    assert_eq!(summary.pending(), 3);
    assert_eq!(summary.applied(), 0);
    assert!(reconciler.client.writes().is_empty());
}

#[tokio::test]
async fn test_unknown_group_fails_before_any_project() {
    let reconciler = SettingsReconciler::new(populated_fake());
    let mut config = backend_config();
    config.push(GroupConfig::named("missing"));

    let result = reconciler.run(&config, RunOptions::default()).await;

    match result {
        Err(RepoSettingsError::Configuration(ConfigurationError::GroupNotFound { name })) => {
            assert_eq!(name, "missing");
        }
        other => panic!("Expected GroupNotFound, got {:?}", other),
    }
    assert!(reconciler
        .client
        .calls()
        .iter()
        .all(|c| matches!(c, Call::ListGroups { .. })));
}

#[tokio::test]
async fn test_listing_failure_aborts_the_run() {
    let fake = populated_fake();
    fake.state.lock().unwrap().fail_listing = true;
    let reconciler = SettingsReconciler::new(fake);

    let result = reconciler.run(&backend_config(), RunOptions::default()).await;

    assert!(matches!(result, Err(RepoSettingsError::Transport(_))));
}

#[tokio::test]
async fn test_apply_failures_do_not_stop_the_batch() {
    let fake = populated_fake();
    fake.state.lock().unwrap().fail_writes = true;
    let reconciler = SettingsReconciler::new(fake);

    let summary = reconciler
        .run(&backend_config(), RunOptions::default())
        .await
        .expect("Run failed");

    assert_eq!(summary.projects.len(), 2);
    assert_eq!(summary.failed(), 3);
    assert!(!summary.is_success());
}

#[tokio::test]
async fn test_deep_project_resolves_to_root_group() {
    let fake = FakeGitLab::with_state(|s| {
        s.groups = vec![group(1, "acme")];
        s.projects
            .insert(1, vec![project(30, "acme/backend/payments", "ledger")]);
    });
    let reconciler = SettingsReconciler::new(fake);
    let config = vec![GroupConfig {
        approvals: Some(ApprovalSettings {
            approvals_before_merge: Some(2),
            ..Default::default()
        }),
        ..GroupConfig::named("acme")
    }];

    let summary = reconciler
        .run(&config, RunOptions::default())
        .await
        .expect("Run failed");

    assert_eq!(summary.projects[0].group, "acme");
    assert_eq!(summary.projects[0].decisions[0].outcome, ReconcileOutcome::Applied);
}

#[tokio::test]
async fn test_project_outside_configuration_is_fatal() {
    let fake = FakeGitLab::with_state(|s| {
        let mut listed = group(1, "acme");
        listed.full_path = "acme".to_string();
        s.groups = vec![listed];
        s.projects.insert(1, vec![project(40, "elsewhere", "orphan")]);
    });
    let reconciler = SettingsReconciler::new(fake);

    let result = reconciler
        .run(&[GroupConfig::named("acme")], RunOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(RepoSettingsError::UnresolvedNamespace { path }) if path == "elsewhere"
    ));
}
