//! HTTP 클라이언트 -- 세션, 로그인, 요청 전송
//!
//! [`AuthenticatedClient`]는 하나의 [`Session`]을 소유합니다.
//! 로그인에 성공하면 토큰이 세션에 저장되고, 이후 모든 요청에
//! `Authorization: Bearer <token>` 헤더가 붙습니다.
//!
//! 서버가 돌려준 상태 코드는 에러가 아닙니다. 422도 [`ApiResponse`]로
//! 반환되며 판정은 시나리오 몫입니다. 서버에 도달하지 못한 경우만
//! [`TransportError`]입니다. 재시도는 하지 않습니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::TargetConfig;
use crate::error::{AuthError, TransportError};
use crate::expect::lookup;
use crate::metrics as m;

/// 로그인 엔드포인트 경로
pub const LOGIN_PATH: &str = "/auth/login";

/// 클라이언트가 소유하는 세션 상태
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    token: Option<String>,
    default_headers: HeaderMap,
}

impl Session {
    /// 토큰 없는 세션을 생성합니다. 끝의 `/`는 제거됩니다.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            base_url,
            token: None,
            default_headers,
        }
    }

    /// 기본 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 현재 bearer 토큰
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// 상대 경로를 절대 URL로 변환합니다.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

/// 로그인 성공 결과
#[derive(Debug, Clone)]
pub struct Token {
    /// bearer 토큰
    pub access_token: String,
    /// 응답의 `admin` 객체 (있는 경우)
    pub admin: Option<Value>,
}

/// 서버 응답
///
/// 본문이 JSON이 아니면 `body`는 `Value::Null`이고 원문은 `text`에 남습니다.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP 상태 코드
    pub status: u16,
    /// 원문 본문
    pub text: String,
    /// JSON 본문
    pub body: Value,
}

impl ApiResponse {
    /// 원문 본문을 JSON으로 해석해 응답을 만듭니다.
    pub fn new(status: u16, text: String) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };
        Self { status, text, body }
    }

    /// 2xx 여부
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 점(.)으로 구분된 경로의 필드를 조회합니다.
    pub fn field(&self, path: &str) -> Option<&Value> {
        lookup(&self.body, path)
    }

    /// 문자열 필드를 조회합니다.
    pub fn str_field(&self, path: &str) -> Option<&str> {
        self.field(path).and_then(Value::as_str)
    }

    /// 진단 메시지용으로 잘라낸 본문
    pub fn snippet(&self) -> String {
        const MAX: usize = 300;
        if self.text.chars().count() <= MAX {
            self.text.clone()
        } else {
            let cut: String = self.text.chars().take(MAX).collect();
            format!("{cut}...")
        }
    }
}

/// 실행 중 보낸 요청 집계
///
/// `metrics` 레코더와 별개로 실행 요약에 실립니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    /// 전송을 시도한 요청 수
    pub sent: u64,
    /// 그중 응답을 받지 못한 요청 수 (연결 실패, 타임아웃)
    pub transport_errors: u64,
}

#[derive(Debug, Default)]
struct RequestCounters {
    sent: AtomicU64,
    transport_errors: AtomicU64,
}

/// 인증 세션을 가진 HTTP 클라이언트
///
/// 사본(`clone`, [`anonymous`](Self::anonymous))은 요청 집계를 공유합니다.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    http: reqwest::Client,
    session: Session,
    timeout: Duration,
    counters: Arc<RequestCounters>,
}

impl AuthenticatedClient {
    /// 대상 서버 설정으로 클라이언트를 생성합니다.
    pub fn new(target: &TargetConfig) -> Result<Self, TransportError> {
        let timeout = target.timeout();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(target.accept_invalid_certs)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            http,
            session: Session::new(target.base_url.clone()),
            timeout,
            counters: Arc::default(),
        })
    }

    /// 세션 정보
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 현재 토큰
    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    /// 로그인 여부
    pub fn is_authenticated(&self) -> bool {
        self.session.token.is_some()
    }

    /// 이 클라이언트와 사본들이 보낸 요청 집계
    pub fn stats(&self) -> RequestStats {
        RequestStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            transport_errors: self.counters.transport_errors.load(Ordering::Relaxed),
        }
    }

    /// 토큰을 직접 설정합니다.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.session.token = Some(token.into());
    }

    /// 토큰 없는 사본을 반환합니다. 공개 엔드포인트와 미인증 검사용입니다.
    ///
    /// 내부 커넥션 풀은 공유됩니다.
    pub fn anonymous(&self) -> Self {
        let mut client = self.clone();
        client.session.token = None;
        client
    }

    /// 관리자 로그인
    ///
    /// 200이 아닌 응답은 상태 코드와 원문 본문을 담은 [`AuthError::Rejected`]가 됩니다.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Token, AuthError> {
        let payload = json!({ "email": email, "password": password });
        let response = self
            .request(Method::POST, LOGIN_PATH, Some(&payload))
            .await
            .map_err(AuthError::Unreachable)?;

        if response.status != 200 {
            return Err(AuthError::Rejected {
                status: response.status,
                body: response.text,
            });
        }

        let access_token = response
            .str_field("access_token")
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AuthError::MissingToken {
                body: response.snippet(),
            })?;

        self.session.token = Some(access_token.clone());
        debug!(email, "admin login succeeded");

        Ok(Token {
            access_token,
            admin: response.field("admin").cloned(),
        })
    }

    /// 요청을 전송합니다.
    ///
    /// `path`는 기본 URL 기준 상대 경로입니다. 토큰이 있으면 인증 헤더가 붙습니다.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.session.url_for(path);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .headers(self.session.default_headers.clone());
        if let Some(token) = &self.session.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.counters.sent.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        let result = builder.send().await;
        let elapsed = started.elapsed();
        metrics::histogram!(m::HTTP_REQUEST_DURATION_SECONDS).record(elapsed.as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.counters.transport_errors.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(
                    m::HTTP_REQUESTS_TOTAL,
                    m::LABEL_METHOD => method.to_string(),
                    m::LABEL_STATUS_CLASS => "error"
                )
                .increment(1);
                return Err(self.classify(&method, &url, &e));
            }
        };

        let status = response.status().as_u16();
        metrics::counter!(
            m::HTTP_REQUESTS_TOTAL,
            m::LABEL_METHOD => method.to_string(),
            m::LABEL_STATUS_CLASS => m::status_class(status)
        )
        .increment(1);

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error(&method, &url)
            } else {
                TransportError::Body {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        debug!(
            method = %method,
            path,
            status,
            elapsed_ms = elapsed.as_millis() as u64,
            "request completed"
        );

        Ok(ApiResponse::new(status, text))
    }

    /// GET 요청
    pub async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.request(Method::GET, path, None).await
    }

    /// POST 요청
    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// 본문 없는 POST 요청 (save-as-template, duplicate 등)
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.request(Method::POST, path, None).await
    }

    /// PUT 요청
    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// DELETE 요청
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.request(Method::DELETE, path, None).await
    }

    fn timeout_error(&self, method: &Method, url: &str) -> TransportError {
        TransportError::Timeout {
            method: method.to_string(),
            url: url.to_owned(),
            timeout_secs: self.timeout.as_secs(),
        }
    }

    fn classify(&self, method: &Method, url: &str, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            self.timeout_error(method, url)
        } else if err.is_connect() {
            TransportError::Connect {
                url: url.to_owned(),
                reason: err.to_string(),
            }
        } else {
            TransportError::Request {
                method: method.to_string(),
                url: url.to_owned(),
                reason: err.to_string(),
            }
        }
    }
}
