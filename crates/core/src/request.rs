//! 데이터 기반 요청 시나리오
//!
//! 요청 명세(메서드, 경로, 본문)와 기대 결과(상태 코드, 필드 조건)를
//! 표처럼 나열해 시나리오를 정의합니다. 경로와 본문의 `{key}`는
//! 실행 시점에 컨텍스트 변수로 치환됩니다.
//!
//! ```ignore
//! RequestScenario::post("create profile", "/admin/profiles", body)
//!     .expect(&[200, 201])
//!     .field("slug", FieldPredicate::NonEmpty)
//!     .capture("id", "profile.id")
//!     .track_as(ResourceKind::Profile);
//! ```

use reqwest::Method;
use serde_json::Value;

use crate::config::ExpectationsConfig;
use crate::error::AssertionFailure;
use crate::expect::{FieldPredicate, lookup};
use crate::scenario::{Scenario, ScenarioContext, ScenarioResult};
use crate::tracker::ResourceKind;

/// 허용 상태 코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedStatus {
    /// 고정된 집합
    Exactly(Vec<u16>),
    /// 없는/삭제된 이벤트 초대장 (설정값)
    MissingInvitation,
    /// 미인증 요청 (설정값)
    Unauthenticated,
}

impl ExpectedStatus {
    /// 설정을 반영한 허용 집합
    pub fn resolve(&self, config: &ExpectationsConfig) -> Vec<u16> {
        match self {
            Self::Exactly(statuses) => statuses.clone(),
            Self::MissingInvitation => config.missing_invitation_statuses.clone(),
            Self::Unauthenticated => config.unauthenticated_statuses.clone(),
        }
    }
}

/// 요청 하나와 그 기대 결과로 이루어진 시나리오
#[derive(Debug, Clone)]
pub struct RequestScenario {
    name: String,
    method: Method,
    path: String,
    body: Option<Value>,
    anonymous: bool,
    expected: ExpectedStatus,
    fields: Vec<(String, FieldPredicate)>,
    captures: Vec<(String, String)>,
    track: Option<(ResourceKind, String)>,
    untrack: Option<(ResourceKind, String)>,
}

impl RequestScenario {
    pub fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            body: None,
            anonymous: false,
            expected: ExpectedStatus::Exactly(vec![200]),
            fields: Vec::new(),
            captures: Vec::new(),
            track: None,
            untrack: None,
        }
    }

    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::GET, path)
    }

    pub fn post(name: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        Self::new(name, Method::POST, path).body(body)
    }

    /// 본문 없는 POST (save-as-template, duplicate 등)
    pub fn post_empty(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::POST, path)
    }

    pub fn put(name: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        Self::new(name, Method::PUT, path).body(body)
    }

    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::DELETE, path)
    }

    /// 요청 본문
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// 토큰 없이 보냅니다.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// 허용 상태 코드
    pub fn expect(mut self, statuses: &[u16]) -> Self {
        self.expected = ExpectedStatus::Exactly(statuses.to_vec());
        self
    }

    /// 설정값에 따른 허용 상태 코드
    pub fn expect_configured(mut self, expected: ExpectedStatus) -> Self {
        self.expected = expected;
        self
    }

    /// 응답 필드 조건
    pub fn field(mut self, path: impl Into<String>, predicate: FieldPredicate) -> Self {
        self.fields.push((path.into(), predicate));
        self
    }

    /// 응답 필드를 컨텍스트 변수로 저장합니다.
    pub fn capture(mut self, field: impl Into<String>, var: impl Into<String>) -> Self {
        self.captures.push((field.into(), var.into()));
        self
    }

    /// 2xx 응답의 `id`를 정리 대상으로 기록합니다.
    ///
    /// 거부를 기대한 요청이 리소스를 만들어 버린 경우에도 기록됩니다.
    pub fn track_as(mut self, kind: ResourceKind) -> Self {
        self.track = Some((kind, "id".to_owned()));
        self
    }

    /// 성공 시 변수에 담긴 id를 추적에서 제외합니다 (직접 삭제한 경우).
    pub fn untrack_var(mut self, kind: ResourceKind, var: impl Into<String>) -> Self {
        self.untrack = Some((kind, var.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

impl Scenario for RequestScenario {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult {
        let path = ctx.resolve(&self.path)?;
        let body = match &self.body {
            Some(body) => Some(ctx.resolve_value(body)?),
            None => None,
        };

        let response = if self.anonymous {
            ctx.anonymous()
                .request(self.method.clone(), &path, body.as_ref())
                .await?
        } else {
            ctx.client()
                .request(self.method.clone(), &path, body.as_ref())
                .await?
        };

        if response.is_success()
            && let Some((kind, field)) = &self.track
            && let Some(id) = response.str_field(field)
        {
            ctx.track(*kind, id.to_owned());
        }

        let expected = self.expected.resolve(&ctx.config().expectations);
        ctx.require_status(&response, &expected, self.method.as_str(), &path)?;

        for (field, predicate) in &self.fields {
            ctx.expect_field(&response.body, field, predicate.clone());
        }

        for (field, var) in &self.captures {
            let value = lookup(&response.body, field).cloned().ok_or_else(|| {
                AssertionFailure::MissingField {
                    field: field.clone(),
                }
            })?;
            ctx.remember(var.clone(), value);
        }

        if response.is_success()
            && let Some((kind, var)) = &self.untrack
        {
            let id = ctx.recall_str(var)?;
            ctx.tracker_mut().untrack(*kind, &id);
        }

        Ok(())
    }
}
