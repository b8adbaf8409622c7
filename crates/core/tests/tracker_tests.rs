//! ResourceTracker 정리 동작 통합 테스트

use invitecheck_core::client::AuthenticatedClient;
use invitecheck_core::config::TargetConfig;
use invitecheck_core::tracker::{ResourceKind, ResourceTracker};
use invitecheck_mock_backend::{ADMIN_EMAIL, ADMIN_PASSWORD, MockBackend};
use serde_json::json;

async fn logged_in(backend: &MockBackend) -> AuthenticatedClient {
    let target = TargetConfig {
        base_url: backend.base_url(),
        ..TargetConfig::default()
    };
    let mut client = AuthenticatedClient::new(&target).unwrap();
    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    client
}

async fn create_profile(client: &AuthenticatedClient) -> String {
    let resp = client
        .post(
            "/admin/profiles",
            &json!({
                "groom_name": "Rajesh",
                "bride_name": "Priya",
                "event_type": "marriage",
                "event_date": "2030-01-01T10:00:00",
                "venue": "Grand Palace",
            }),
        )
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    resp.str_field("id").unwrap().to_owned()
}

#[tokio::test]
async fn cleanup_deletes_in_reverse_order_and_is_idempotent() {
    let backend = MockBackend::spawn().await.unwrap();
    let client = logged_in(&backend).await;

    let profile = create_profile(&client).await;
    let invitation = client
        .post(
            &format!("/admin/profiles/{profile}/event-invitations"),
            &json!({"event_type": "marriage", "deity_id": "ganesha"}),
        )
        .await
        .unwrap();
    let invitation_id = invitation.str_field("id").unwrap().to_owned();

    let mut tracker = ResourceTracker::new();
    tracker.track(ResourceKind::Profile, &profile);
    tracker.track(ResourceKind::Invitation, &invitation_id);

    let first = tracker.cleanup(&client).await;
    assert_eq!(first.deleted.len(), 2);
    // 생성 역순: 초대장이 먼저
    assert_eq!(first.deleted[0].kind, ResourceKind::Invitation);
    assert_eq!(first.deleted[1].kind, ResourceKind::Profile);
    assert!(first.is_clean());
    assert_eq!(backend.profile_count(), 0);

    let deletes_before = backend.delete_count();
    let second = tracker.cleanup(&client).await;
    assert!(second.deleted.is_empty());
    assert!(second.failed.is_empty());
    assert_eq!(second.already_gone.len(), 2);
    assert_eq!(backend.delete_count(), deletes_before);
}

#[tokio::test]
async fn resource_deleted_elsewhere_is_already_gone() {
    let backend = MockBackend::spawn().await.unwrap();
    let client = logged_in(&backend).await;
    let profile = create_profile(&client).await;

    let mut tracker = ResourceTracker::new();
    tracker.track(ResourceKind::Profile, &profile);
    client
        .delete(&format!("/admin/profiles/{profile}"))
        .await
        .unwrap();

    let report = tracker.cleanup(&client).await;
    assert!(report.deleted.is_empty());
    assert_eq!(report.already_gone.len(), 1);
    assert!(report.is_clean());
}

#[tokio::test]
async fn failed_delete_is_reported_and_retried_later() {
    let backend = MockBackend::spawn().await.unwrap();
    let client = logged_in(&backend).await;
    let profile = create_profile(&client).await;

    let mut tracker = ResourceTracker::new();
    tracker.track(ResourceKind::Profile, &profile);

    backend.set_fail_deletes(true);
    let report = tracker.cleanup(&client).await;
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].reason.contains("500"));
    assert_eq!(tracker.pending().len(), 1);

    backend.set_fail_deletes(false);
    let retry = tracker.cleanup(&client).await;
    assert_eq!(retry.deleted.len(), 1);
    assert!(tracker.is_empty());
}

#[tokio::test]
async fn template_is_deleted_through_profile_endpoint() {
    let backend = MockBackend::spawn().await.unwrap();
    let client = logged_in(&backend).await;
    let profile = create_profile(&client).await;
    client
        .post_empty(&format!("/admin/profiles/{profile}/save-as-template"))
        .await
        .unwrap();

    let mut tracker = ResourceTracker::new();
    tracker.track(ResourceKind::Profile, &profile);
    tracker.retag(&profile, ResourceKind::Template);

    let report = tracker.cleanup(&client).await;
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.deleted[0].kind, ResourceKind::Template);
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn cleanup_against_dead_server_never_panics() {
    let target = TargetConfig {
        base_url: "http://127.0.0.1:1/api".to_owned(),
        timeout_secs: 2,
        ..TargetConfig::default()
    };
    let client = AuthenticatedClient::new(&target).unwrap();
    let mut tracker = ResourceTracker::new();
    tracker.track(ResourceKind::Profile, "p-1");
    tracker.track(ResourceKind::Invitation, "i-1");

    let report = tracker.cleanup(&client).await;
    assert_eq!(report.failed.len(), 2);
    assert_eq!(tracker.pending().len(), 2);
    assert_eq!(tracker.pending()[0].id, "p-1");
}
