//! invitecheck.toml 통합 설정 테스트
//!
//! - invitecheck.toml.example 파싱 테스트
//! - 부분 설정 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::io::Write;

use invitecheck_core::config::HarnessConfig;
use invitecheck_core::error::{ConfigError, HarnessError};

const EXAMPLE: &str = include_str!("../../../invitecheck.toml.example");

/// 환경변수를 설정한 채 `f`를 실행하고 원래 값으로 되돌립니다.
fn with_env<T>(key: &str, value: &str, f: impl FnOnce() -> T) -> T {
    let original = std::env::var(key).ok();
    // SAFETY: serial 테스트로 실행되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var(key, value);
    }
    let result = f();
    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var(key, val),
            None => std::env::remove_var(key),
        }
    }
    result
}

// =============================================================================
// invitecheck.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let config = HarnessConfig::parse(EXAMPLE).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let example = HarnessConfig::parse(EXAMPLE).expect("should parse");
    let defaults = HarnessConfig::default();

    assert_eq!(example.general.log_level, defaults.general.log_level);
    assert_eq!(example.general.log_format, defaults.general.log_format);
    assert_eq!(example.target.base_url, defaults.target.base_url);
    assert_eq!(example.target.timeout_secs, defaults.target.timeout_secs);
    assert_eq!(
        example.target.accept_invalid_certs,
        defaults.target.accept_invalid_certs
    );
    assert_eq!(example.admin.email, defaults.admin.email);
    assert_eq!(example.admin.password, defaults.admin.password);
    assert_eq!(example.run.cleanup, defaults.run.cleanup);
    assert_eq!(example.run.suites, defaults.run.suites);
    assert_eq!(
        example.expectations.missing_invitation_statuses,
        defaults.expectations.missing_invitation_statuses
    );
    assert_eq!(
        example.expectations.unauthenticated_statuses,
        defaults.expectations.unauthenticated_statuses
    );
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_admin_only() {
    let toml = r#"
[admin]
email = "ops@wedding.com"
"#;
    let config = HarnessConfig::parse(toml).expect("should parse");
    assert_eq!(config.admin.email, "ops@wedding.com");
    // 같은 섹션의 나머지 필드도 기본값
    assert_eq!(config.admin.password, "admin123");
    assert_eq!(config.target.base_url, "http://localhost:8001/api");
}

#[test]
fn partial_config_run_and_expectations() {
    let toml = r#"
[run]
cleanup = false
suites = ["templates", "audit-logs"]

[expectations]
missing_invitation_statuses = [404, 200]
"#;
    let config = HarnessConfig::parse(toml).expect("should parse");
    assert!(!config.run.cleanup);
    assert_eq!(config.run.suites, vec!["templates", "audit-logs"]);
    assert_eq!(
        config.expectations.missing_invitation_statuses,
        vec![404, 200]
    );
    config.validate().expect("should validate");
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[target]
timeout_secs = 5

[unknown]
foo = "bar"
"#;
    let config = HarnessConfig::parse(toml).expect("unknown sections should be ignored");
    assert_eq!(config.target.timeout_secs, 5);
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[target]
base_url = "http://from-file:8001/api"
"#;
    let base_url = with_env(
        "INVITECHECK_TARGET_BASE_URL",
        "https://from-env.example.com/api",
        || {
            let mut config = HarnessConfig::parse(toml).expect("should parse");
            config.apply_env_overrides();
            config.target.base_url
        },
    );
    assert_eq!(base_url, "https://from-env.example.com/api");
}

#[test]
#[serial_test::serial]
fn env_override_status_list() {
    let statuses = with_env(
        "INVITECHECK_EXPECTATIONS_MISSING_INVITATION_STATUSES",
        "404,200",
        || {
            let mut config = HarnessConfig::parse("").expect("should parse");
            config.apply_env_overrides();
            config.expectations.missing_invitation_statuses
        },
    );
    assert_eq!(statuses, vec![404, 200]);
}

#[test]
#[serial_test::serial]
fn env_override_bool_and_csv() {
    let (cleanup, suites) = with_env("INVITECHECK_RUN_CLEANUP", "false", || {
        with_env("INVITECHECK_RUN_SUITES", "profile-save, design-system", || {
            let mut config = HarnessConfig::parse("").expect("should parse");
            config.apply_env_overrides();
            (config.run.cleanup, config.run.suites)
        })
    });
    assert!(!cleanup);
    assert_eq!(suites, vec!["profile-save", "design-system"]);
}

#[test]
#[serial_test::serial]
fn from_env_rejects_invalid_override() {
    let result = with_env("INVITECHECK_TARGET_TIMEOUT_SECS", "0", HarnessConfig::from_env);
    let err = result.expect_err("zero timeout should fail validation");
    assert!(matches!(
        err,
        HarnessError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 에러 테스트
// =============================================================================

#[test]
fn malformed_toml_returns_parse_error() {
    let err = HarnessConfig::parse("[target\nbase_url = ").expect_err("should fail");
    assert!(matches!(
        err,
        HarnessError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[target]
timeout_secs = "thirty"
"#;
    assert!(HarnessConfig::parse(toml).is_err());
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let err = HarnessConfig::from_file("/definitely/not/here/invitecheck.toml")
        .await
        .expect_err("should fail");
    assert!(matches!(
        err,
        HarnessError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_config_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(EXAMPLE.as_bytes()).expect("write");
    let config = HarnessConfig::load(file.path()).await.expect("should load");
    assert_eq!(config.admin.email, "admin@wedding.com");
}

#[tokio::test]
async fn from_file_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"[target]\nbase_url = \"localhost\"\n")
        .expect("write");
    let err = HarnessConfig::from_file(file.path())
        .await
        .expect_err("should fail validation");
    assert!(err.to_string().contains("base_url"));
}
