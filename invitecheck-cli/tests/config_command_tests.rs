//! Integration tests for `invitecheck config`.

use std::fs;

use tempfile::TempDir;

use invitecheck_cli::commands::config::{show_config, validate_config};

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("should write config");
    path
}

#[tokio::test]
async fn validate_accepts_complete_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "invitecheck.toml",
        r#"
[general]
log_level = "debug"
log_format = "json"

[target]
base_url = "https://staging.example.com/api"
timeout_secs = 15

[admin]
email = "qa@example.com"
password = "s3cret"

[run]
cleanup = true
suites = ["templates", "audit-logs"]

[expectations]
missing_invitation_statuses = [404]
unauthenticated_statuses = [401, 403]
"#,
    );

    let report = validate_config(Some(&path)).await;
    assert!(report.valid, "{:?}", report.errors);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn validate_reports_malformed_toml() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "bad.toml", "[target\nbase_url = 1\n");

    let report = validate_config(Some(&path)).await;
    assert!(!report.valid);
    assert!(report.errors[0].contains("parse"), "{:?}", report.errors);
}

#[tokio::test]
async fn validate_reports_missing_file() {
    let path = std::path::PathBuf::from("/nonexistent/invitecheck.toml");

    let report = validate_config(Some(&path)).await;
    assert!(!report.valid);
    assert!(report.errors[0].contains("not found"));
}

#[tokio::test]
async fn validate_reports_out_of_range_value() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "slow.toml", "[target]\ntimeout_secs = 0\n");

    let report = validate_config(Some(&path)).await;
    assert!(!report.valid);
    assert!(report.errors[0].contains("timeout_secs"));
}

#[tokio::test]
async fn validate_reports_empty_status_list() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "statuses.toml",
        "[expectations]\nmissing_invitation_statuses = []\n",
    );

    let report = validate_config(Some(&path)).await;
    assert!(!report.valid);
    assert!(report.errors[0].contains("missing_invitation_statuses"));
}

#[tokio::test]
async fn empty_file_uses_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "empty.toml", "");

    let report = validate_config(Some(&path)).await;
    assert!(report.valid, "{:?}", report.errors);
}

#[tokio::test]
async fn show_redacts_password() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "invitecheck.toml",
        "[admin]\nemail = \"qa@example.com\"\npassword = \"s3cret\"\n",
    );

    let report = show_config(Some(&path), None).await.expect("show");
    assert!(report.section.is_none());
    assert!(report.config_toml.contains("qa@example.com"));
    assert!(report.config_toml.contains("***REDACTED***"));
    assert!(!report.config_toml.contains("s3cret"));
}

#[tokio::test]
async fn show_single_section() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "invitecheck.toml",
        "[target]\nbase_url = \"http://127.0.0.1:9000/api\"\n",
    );

    let report = show_config(Some(&path), Some("target")).await.expect("show");
    assert_eq!(report.section.as_deref(), Some("target"));
    assert!(report.config_toml.contains("http://127.0.0.1:9000/api"));
    assert!(!report.config_toml.contains("[admin]"));
}

#[tokio::test]
async fn show_rejects_unknown_section() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "invitecheck.toml", "");

    let err = show_config(Some(&path), Some("database"))
        .await
        .err()
        .expect("unknown section");
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("expectations"));
}

#[tokio::test]
async fn show_of_invalid_file_is_a_config_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "bad.toml", "[run]\nsuites = []\n");

    let err = show_config(Some(&path), None).await.err().expect("invalid");
    assert_eq!(err.exit_code(), 2);
}
