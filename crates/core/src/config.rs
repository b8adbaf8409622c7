//! 설정 관리 -- invitecheck.toml 파싱 및 런타임 설정
//!
//! [`HarnessConfig`]는 하네스 전체 설정을 담는 최상위 구조체입니다.
//! 대상 서버 주소와 자격 증명은 전역 변수가 아니라 이 구조체를 통해
//! 클라이언트 생성 시점에 명시적으로 전달됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`INVITECHECK_TARGET_BASE_URL=https://...` 형식)
//! 3. 설정 파일 (`invitecheck.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), invitecheck_core::error::HarnessError> {
//! use invitecheck_core::config::HarnessConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HarnessConfig::load("invitecheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HarnessConfig::parse("[target]\nbase_url = \"http://localhost:8001/api\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HarnessError};

/// 타임아웃 상한 (초)
const MAX_TIMEOUT_SECS: u64 = 300;

/// invitecheck 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 대상 서버 설정
    #[serde(default)]
    pub target: TargetConfig,
    /// 관리자 자격 증명
    #[serde(default)]
    pub admin: AdminConfig,
    /// 실행 설정
    #[serde(default)]
    pub run: RunConfig,
    /// 백엔드 계약이 모호한 지점의 기대값
    #[serde(default)]
    pub expectations: ExpectationsConfig,
}

impl HarnessConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수 오버라이드로 설정을 만듭니다.
    pub fn from_env() -> Result<Self, HarnessError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HarnessError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HarnessError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HarnessError> {
        toml::from_str(toml_str).map_err(|e| {
            HarnessError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `INVITECHECK_{SECTION}_{FIELD}`
    /// 예: `INVITECHECK_ADMIN_PASSWORD=secret`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "INVITECHECK_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "INVITECHECK_GENERAL_LOG_FORMAT",
        );

        // Target
        override_string(&mut self.target.base_url, "INVITECHECK_TARGET_BASE_URL");
        override_u64(
            &mut self.target.timeout_secs,
            "INVITECHECK_TARGET_TIMEOUT_SECS",
        );
        override_bool(
            &mut self.target.accept_invalid_certs,
            "INVITECHECK_TARGET_ACCEPT_INVALID_CERTS",
        );

        // Admin
        override_string(&mut self.admin.email, "INVITECHECK_ADMIN_EMAIL");
        override_string(&mut self.admin.password, "INVITECHECK_ADMIN_PASSWORD");

        // Run
        override_bool(&mut self.run.cleanup, "INVITECHECK_RUN_CLEANUP");
        override_csv(&mut self.run.suites, "INVITECHECK_RUN_SUITES");

        // Expectations
        override_status_csv(
            &mut self.expectations.missing_invitation_statuses,
            "INVITECHECK_EXPECTATIONS_MISSING_INVITATION_STATUSES",
        );
        override_status_csv(
            &mut self.expectations.unauthenticated_statuses,
            "INVITECHECK_EXPECTATIONS_UNAUTHENTICATED_STATUSES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        let base_url = self.target.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(invalid(
                "target.base_url",
                "must start with http:// or https://".to_owned(),
            ));
        }
        if reqwest::Url::parse(base_url).is_err() {
            return Err(invalid("target.base_url", "not a valid URL".to_owned()));
        }

        if self.target.timeout_secs == 0 || self.target.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "target.timeout_secs",
                format!("must be between 1 and {MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.admin.email.trim().is_empty() {
            return Err(invalid("admin.email", "must not be empty".to_owned()));
        }

        if self.run.suites.is_empty() {
            return Err(invalid(
                "run.suites",
                "at least one suite must be selected".to_owned(),
            ));
        }

        validate_statuses(
            "expectations.missing_invitation_statuses",
            &self.expectations.missing_invitation_statuses,
        )?;
        validate_statuses(
            "expectations.unauthenticated_statuses",
            &self.expectations.unauthenticated_statuses,
        )?;

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> HarnessError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

fn validate_statuses(field: &str, statuses: &[u16]) -> Result<(), HarnessError> {
    if statuses.is_empty() {
        return Err(invalid(field, "must list at least one status".to_owned()));
    }
    if let Some(bad) = statuses.iter().find(|s| !(100..=599).contains(*s)) {
        return Err(invalid(field, format!("{bad} is not an HTTP status code")));
    }
    Ok(())
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 대상 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// API 기본 URL (`/api` 접두어 포함)
    pub base_url: String,
    /// 요청당 타임아웃 (초)
    pub timeout_secs: u64,
    /// 자체 서명 인증서 허용
    pub accept_invalid_certs: bool,
}

impl TargetConfig {
    /// 요청 타임아웃을 반환합니다.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/api".to_owned(),
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

/// 관리자 자격 증명
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// 관리자 이메일
    pub email: String,
    /// 관리자 비밀번호
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@wedding.com".to_owned(),
            password: "admin123".to_owned(),
        }
    }
}

/// 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 실행 후 생성한 리소스 삭제
    pub cleanup: bool,
    /// 실행할 스위트 (`all` = 전체)
    pub suites: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cleanup: true,
            suites: vec!["all".to_owned()],
        }
    }
}

/// 백엔드 계약이 모호한 지점의 기대 상태 코드
///
/// 기존 테스트 스크립트들이 같은 엔드포인트에 대해 서로 다른 결과를
/// 기대하므로 (예: 없는 이벤트 초대장 조회 시 404 vs 404/200),
/// 추측하지 않고 설정으로 노출합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectationsConfig {
    /// 없는/삭제된 이벤트 초대장 조회 시 허용 상태 코드
    pub missing_invitation_statuses: Vec<u16>,
    /// 인증 없이 관리자 엔드포인트 호출 시 허용 상태 코드
    pub unauthenticated_statuses: Vec<u16>,
}

impl Default for ExpectationsConfig {
    fn default() -> Self {
        Self {
            missing_invitation_statuses: vec![404],
            unauthenticated_statuses: vec![401, 403],
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

fn override_status_csv(target: &mut Vec<u16>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        let parsed: Result<Vec<u16>, _> = val.split(',').map(|s| s.trim().parse::<u16>()).collect();
        match parsed {
            Ok(statuses) => *target = statuses,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse status list from env var, ignoring"
            ),
        }
    }
}
