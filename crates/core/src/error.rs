//! 에러 타입 -- 하네스 에러 분류 정의
//!
//! # 에러 분류
//!
//! - **전송**: [`TransportError`] -- 서버에 도달하지 못함 (연결 실패, 타임아웃)
//! - **인증**: [`AuthError`] -- 치명적, 실행 전체를 중단
//! - **시나리오**: [`ScenarioError`] -- 시나리오 단위로 기록되고 실행은 계속됨
//! - **정리**: [`CleanupError`] -- 로그만 남기고 실행 결과에 영향 없음

/// invitecheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 전송 계층 에러
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 인증 에러
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// 시나리오 등록 에러
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 전송 계층 에러
///
/// 서버가 상태 코드를 돌려준 경우는 에러가 아닙니다.
/// 422 같은 응답은 [`ApiResponse`](crate::client::ApiResponse)로 전달됩니다.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// 요청 타임아웃
    #[error("{method} {url} timed out after {timeout_secs}s")]
    Timeout {
        method: String,
        url: String,
        timeout_secs: u64,
    },

    /// 연결 실패
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// 요청 전송 실패
    #[error("{method} {url} failed: {reason}")]
    Request {
        method: String,
        url: String,
        reason: String,
    },

    /// 응답 본문 읽기 실패
    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    /// HTTP 클라이언트 생성 실패
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// 인증 에러
///
/// 토큰 없이는 이후 시나리오가 성공할 수 없으므로 러너는 즉시 중단합니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 로그인 거부 (200 이외의 상태 코드)
    #[error("login rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 200 응답이지만 access_token 없음
    #[error("login response has no access_token: {body}")]
    MissingToken { body: String },

    /// 로그인 엔드포인트에 도달 불가
    #[error("login endpoint unreachable: {0}")]
    Unreachable(#[source] TransportError),
}

/// 시나리오 실행 에러
///
/// [`AuthError`]를 제외한 모든 변형은 실패한 `TestResult`로 기록되고
/// 러너는 다음 시나리오로 진행합니다.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 전송 계층 에러
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 기대값 불일치
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),

    /// 기대 집합 밖의 상태 코드
    #[error("{method} {path}: expected status {expected:?}, got {actual}: {body}")]
    UnexpectedStatus {
        method: String,
        path: String,
        expected: Vec<u16>,
        actual: u16,
        body: String,
    },

    /// 선행 시나리오가 남겼어야 할 상태가 없음
    #[error("missing prerequisite '{key}' (did an earlier scenario fail?)")]
    MissingPrerequisite { key: String },

    /// 인증 실패 (치명적)
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl ScenarioError {
    /// 실행 전체를 중단해야 하는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// 기대값 불일치
///
/// 필드 누락과 타입 불일치는 서로 다른 메시지로 구분됩니다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssertionFailure {
    /// 필드 없음
    #[error("field '{field}' is missing")]
    MissingField { field: String },

    /// 필드 타입 불일치
    #[error("field '{field}' has wrong type: expected {expected}, got {actual}")]
    WrongType {
        field: String,
        expected: String,
        actual: String,
    },

    /// 필드 값 불일치
    #[error("field '{field}': expected {expected}, got {actual}")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// 기타 조건 실패
    #[error("{0}")]
    Custom(String),
}

/// 정리(삭제) 실패 -- 로그만 남깁니다.
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    /// 삭제 요청이 예상 밖의 상태 코드를 반환
    #[error("delete {kind} {id} returned status {status}")]
    Status { kind: String, id: String, status: u16 },

    /// 삭제 요청 전송 실패
    #[error("delete {kind} {id} failed: {source}")]
    Transport {
        kind: String,
        id: String,
        #[source]
        source: TransportError,
    },
}

/// 시나리오 레지스트리 에러
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// 같은 이름의 시나리오가 이미 등록됨
    #[error("scenario already registered: {name}")]
    AlreadyRegistered { name: String },

    /// 알 수 없는 스위트
    #[error("unknown suite: {name}")]
    UnknownSuite { name: String },
}
