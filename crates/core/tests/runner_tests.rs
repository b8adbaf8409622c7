//! ScenarioRunner 통합 테스트 -- 로그인, 실패 격리, 정리

use invitecheck_core::config::HarnessConfig;
use invitecheck_core::error::{AuthError, ScenarioError};
use invitecheck_core::expect::FieldPredicate;
use invitecheck_core::request::RequestScenario;
use invitecheck_core::runner::{LOGIN_SCENARIO, ScenarioRunner};
use invitecheck_core::scenario::{
    BoxFuture, FnScenario, ScenarioContext, ScenarioRegistry, ScenarioResult,
};
use invitecheck_core::tracker::ResourceKind;
use invitecheck_mock_backend::MockBackend;
use serde_json::{Value, json};

fn config_for(backend: &MockBackend) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.target.base_url = backend.base_url();
    config.target.timeout_secs = 5;
    config
}

fn profile_body() -> Value {
    json!({
        "groom_name": "Rajesh",
        "bride_name": "Priya",
        "event_type": "marriage",
        "event_date": "2030-01-01T10:00:00",
        "venue": "Grand Palace",
    })
}

fn create_profile() -> RequestScenario {
    RequestScenario::post("create profile", "/admin/profiles", profile_body())
        .field("slug", FieldPredicate::NonEmpty)
        .capture("id", "runner.profile_id")
        .track_as(ResourceKind::Profile)
}

fn registry(scenarios: Vec<RequestScenario>) -> ScenarioRegistry {
    let mut registry = ScenarioRegistry::new();
    for scenario in scenarios {
        registry.register(Box::new(scenario)).unwrap();
    }
    registry
}

#[tokio::test]
async fn failed_login_halts_with_single_result() {
    let backend = MockBackend::spawn().await.unwrap();
    let mut config = config_for(&backend);
    config.admin.password = "wrong".to_owned();

    let summary = ScenarioRunner::new(config)
        .unwrap()
        .run(&registry(vec![create_profile()]))
        .await;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.failed, 1);
    assert!(summary.halted);
    assert!(summary.cleanup.is_none());
    assert_eq!(summary.results[0].name, LOGIN_SCENARIO);
    assert!(summary.results[0].message.contains("401"));
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn failure_is_isolated_and_cleanup_still_runs() {
    let backend = MockBackend::spawn().await.unwrap();
    let scenarios = vec![
        create_profile(),
        RequestScenario::get("missing profile", "/admin/profiles/does-not-exist"),
        RequestScenario::get("read profile", "/admin/profiles/{runner.profile_id}")
            .field("venue", FieldPredicate::eq_str("Grand Palace")),
    ];

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .run(&registry(scenarios))
        .await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.passed, 3);
    assert_eq!(summary.failed, 1);
    assert!(!summary.halted);

    let failed: Vec<_> = summary.failures().collect();
    assert_eq!(failed[0].name, "missing profile");
    assert!(failed[0].message.contains("404"));

    let cleanup = summary.cleanup.as_ref().unwrap();
    assert_eq!(cleanup.deleted.len(), 1);
    assert!(cleanup.is_clean());
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn soft_check_failure_fails_scenario_without_stopping_it() {
    let backend = MockBackend::spawn().await.unwrap();
    let scenarios = vec![
        create_profile()
            .field("venue", FieldPredicate::eq_str("Somewhere Else"))
            .field("is_active", FieldPredicate::Equals(json!(true))),
    ];

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .run(&registry(scenarios))
        .await;

    assert_eq!(summary.failed, 1);
    let result = &summary.results[1];
    assert!(result.message.starts_with("1 of"));
    // 실패한 검사 뒤의 검사도 기록된다
    assert!(result.checks.iter().any(|c| c.label == "is_active" && c.passed));
    // 캡처와 추적은 검사 실패와 무관하게 수행된다
    assert_eq!(summary.cleanup.as_ref().unwrap().deleted.len(), 1);
}

#[tokio::test]
async fn missing_prerequisite_is_reported_by_name() {
    let backend = MockBackend::spawn().await.unwrap();
    let scenarios = vec![RequestScenario::get(
        "orphan read",
        "/admin/profiles/{never.captured}",
    )];

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .run(&registry(scenarios))
        .await;

    assert_eq!(summary.failed, 1);
    assert!(summary.results[1].message.contains("never.captured"));
}

#[tokio::test]
async fn disabled_cleanup_leaves_resources() {
    let backend = MockBackend::spawn().await.unwrap();
    let mut config = config_for(&backend);
    config.run.cleanup = false;

    let summary = ScenarioRunner::new(config)
        .unwrap()
        .run(&registry(vec![create_profile()]))
        .await;

    assert!(summary.all_passed());
    assert!(summary.cleanup.is_none());
    assert_eq!(backend.profile_count(), 1);
}

#[tokio::test]
async fn filter_limits_executed_scenarios() {
    let backend = MockBackend::spawn().await.unwrap();
    let scenarios = vec![
        create_profile(),
        RequestScenario::get("list templates", "/admin/templates"),
    ];

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .with_filter("templates")
        .run(&registry(scenarios))
        .await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.results[1].name, "list templates");
    assert_eq!(backend.profile_count(), 0);
}

fn delete_then_verify(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let id = ctx.recall_str("runner.profile_id")?;
        let path = format!("/admin/profiles/{id}");
        let resp = ctx.client().delete(&path).await?;
        ctx.require_status(&resp, &[200, 204], "DELETE", &path)?;
        ctx.tracker_mut().untrack(ResourceKind::Profile, &id);

        let resp = ctx.client().get(&path).await?;
        ctx.expect_status(&resp, &[404]);
        Ok(())
    })
}

#[tokio::test]
async fn untracked_resources_are_reported_as_already_gone() {
    let backend = MockBackend::spawn().await.unwrap();
    let mut registry = registry(vec![create_profile()]);
    registry
        .register(Box::new(FnScenario::new(
            "delete and verify",
            delete_then_verify,
        )))
        .unwrap();

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .run(&registry)
        .await;

    assert!(summary.all_passed(), "{}", summary.report());
    let cleanup = summary.cleanup.as_ref().unwrap();
    assert!(cleanup.deleted.is_empty());
    assert_eq!(cleanup.already_gone.len(), 1);
    // 시나리오가 보낸 DELETE 한 번뿐
    assert_eq!(backend.delete_count(), 1);
}

fn token_revoked(_ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        Err(ScenarioError::Auth(AuthError::Rejected {
            status: 401,
            body: "token expired".to_owned(),
        }))
    })
}

#[tokio::test]
async fn auth_error_mid_run_halts_but_cleanup_runs() {
    let backend = MockBackend::spawn().await.unwrap();
    let mut registry = registry(vec![create_profile()]);
    registry
        .register(Box::new(FnScenario::new("token revoked", token_revoked)))
        .unwrap();
    registry
        .register(Box::new(RequestScenario::get(
            "never runs",
            "/admin/templates",
        )))
        .unwrap();

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .run(&registry)
        .await;

    assert!(summary.halted);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 2);
    assert!(summary.results.iter().all(|r| r.name != "never runs"));

    let halting = summary.halted_by().unwrap();
    assert_eq!(halting.name, "token revoked");
    assert!(halting.message.contains("401"));

    let cleanup = summary.cleanup.as_ref().unwrap();
    assert_eq!(cleanup.deleted.len(), 1);
    assert_eq!(backend.profile_count(), 0);
    // 로그인, 생성, 정리 DELETE
    assert_eq!(backend.request_count(), 3);
}

#[tokio::test]
async fn tracked_request_without_id_still_passes() {
    let backend = MockBackend::spawn().await.unwrap();
    let scenarios = vec![
        create_profile(),
        RequestScenario::get("list profiles", "/admin/profiles").track_as(ResourceKind::Profile),
    ];

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .run(&registry(scenarios))
        .await;

    assert!(summary.all_passed(), "{}", summary.report());
    assert_eq!(summary.cleanup.as_ref().unwrap().deleted.len(), 1);
}

#[tokio::test]
async fn summary_counts_every_request_sent() {
    let backend = MockBackend::spawn().await.unwrap();
    let scenarios = vec![
        create_profile(),
        RequestScenario::get("read profile", "/admin/profiles/{runner.profile_id}"),
    ];

    let summary = ScenarioRunner::new(config_for(&backend))
        .unwrap()
        .run(&registry(scenarios))
        .await;

    assert!(summary.all_passed(), "{}", summary.report());
    assert_eq!(summary.requests.sent, backend.request_count() as u64);
    assert_eq!(summary.requests.sent, 4);
    assert_eq!(summary.requests.transport_errors, 0);
    assert!(summary.report().contains("Requests: 4 sent"));
}
