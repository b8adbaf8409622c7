//! Integration tests for `invitecheck run` against the mock backend.

use invitecheck_cli::cli::RunArgs;
use invitecheck_cli::commands::run::{outcome, run_suites};
use invitecheck_cli::error::CliError;
use invitecheck_core::config::HarnessConfig;
use invitecheck_core::error::{AuthError, ScenarioError};
use invitecheck_core::runner::ScenarioRunner;
use invitecheck_core::scenario::{
    BoxFuture, FnScenario, ScenarioContext, ScenarioRegistry, ScenarioResult,
};
use invitecheck_mock_backend::MockBackend;

fn config_for(backend: &MockBackend) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.target.base_url = backend.base_url();
    config.target.timeout_secs = 10;
    config
}

fn args(suites: &[&str]) -> RunArgs {
    RunArgs {
        suites: suites.iter().map(|s| (*s).to_owned()).collect(),
        ..RunArgs::default()
    }
}

#[tokio::test]
async fn selected_suite_runs_and_cleans_up() {
    let backend = MockBackend::spawn().await.expect("mock backend");

    let report = run_suites(args(&["templates"]), config_for(&backend))
        .await
        .expect("run");

    assert_eq!(report.suites, vec!["templates"]);
    assert!(report.summary.all_passed(), "{}", report.summary.report());
    assert!(outcome(&report.summary).is_ok());
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn base_url_flag_overrides_config() {
    let backend = MockBackend::spawn().await.expect("mock backend");
    let mut config = HarnessConfig::default();
    config.target.timeout_secs = 10;

    let run = RunArgs {
        base_url: Some(backend.base_url()),
        filter: Some("defaults to".to_owned()),
        ..args(&["design-system"])
    };
    let report = run_suites(run, config).await.expect("run");

    assert_eq!(report.base_url, backend.base_url());
    assert!(report.summary.all_passed(), "{}", report.summary.report());
    assert!(backend.request_count() > 0);
}

#[tokio::test]
async fn no_cleanup_leaves_resources() {
    let backend = MockBackend::spawn().await.expect("mock backend");

    let run = RunArgs {
        no_cleanup: true,
        ..args(&["design-system"])
    };
    let report = run_suites(run, config_for(&backend)).await.expect("run");

    assert!(report.summary.cleanup.is_none());
    assert!(backend.profile_count() > 0);
    assert_eq!(backend.delete_count(), 0);
}

#[tokio::test]
async fn wrong_password_maps_to_auth_exit_code() {
    let backend = MockBackend::spawn().await.expect("mock backend");
    let mut config = config_for(&backend);
    config.admin.password = "wrong".to_owned();

    let report = run_suites(args(&["profile-save"]), config)
        .await
        .expect("run");

    assert!(report.summary.halted);
    assert_eq!(report.summary.total, 1);
    let err = outcome(&report.summary).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn unknown_suite_is_rejected_before_any_request() {
    let backend = MockBackend::spawn().await.expect("mock backend");

    let err = run_suites(args(&["payments"]), config_for(&backend))
        .await
        .err()
        .expect("unknown suite");

    assert!(matches!(err, CliError::Registry(_)));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn invalid_base_url_override_is_a_config_error() {
    let run = RunArgs {
        base_url: Some("ftp://example.com".to_owned()),
        ..RunArgs::default()
    };

    let err = run_suites(run, HarnessConfig::default())
        .await
        .err()
        .expect("invalid url");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn scenario_failures_map_to_exit_code_1() {
    let backend = MockBackend::spawn().await.expect("mock backend");
    let mut config = config_for(&backend);
    config.expectations.missing_invitation_statuses = vec![200];

    let report = run_suites(args(&["event-invitations"]), config)
        .await
        .expect("run");

    let err = outcome(&report.summary).unwrap_err();
    assert!(matches!(err, CliError::ScenariosFailed { failed: 2, .. }));
    assert_eq!(err.exit_code(), 1);
}

fn session_expired(_ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        Err(ScenarioError::Auth(AuthError::Rejected {
            status: 401,
            body: "session expired".to_owned(),
        }))
    })
}

#[tokio::test]
async fn mid_run_auth_failure_reports_its_own_reason() {
    let backend = MockBackend::spawn().await.expect("mock backend");
    let mut registry = ScenarioRegistry::new();
    registry
        .register(Box::new(FnScenario::new("session expired", session_expired)))
        .expect("register");

    let summary = ScenarioRunner::new(config_for(&backend))
        .expect("runner")
        .run(&registry)
        .await;
    assert!(summary.halted);
    assert!(summary.results[0].passed);

    let err = outcome(&summary).unwrap_err();
    assert_eq!(err.exit_code(), 3);
    let message = err.to_string();
    assert!(message.contains("session expired"), "{message}");
    assert!(message.contains("401"), "{message}");
}

#[tokio::test]
async fn report_carries_request_counts() {
    let backend = MockBackend::spawn().await.expect("mock backend");

    let report = run_suites(args(&["audit-logs"]), config_for(&backend))
        .await
        .expect("run");

    assert_eq!(report.summary.requests.sent, backend.request_count() as u64);
    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(
        json["summary"]["requests"]["sent"],
        backend.request_count() as u64
    );
}
