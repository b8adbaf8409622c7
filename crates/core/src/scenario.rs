//! 시나리오 -- trait 정의, 실행 컨텍스트, 레지스트리
//!
//! [`Scenario`]는 RPITIT를 사용하므로 `dyn Scenario`가 불가합니다.
//! 러너는 [`DynScenario`]로 시나리오를 보관하며, `Scenario`를 구현한
//! 타입은 자동으로 `DynScenario`도 구현합니다.
//!
//! # 상태 전환
//! ```text
//! Pending → Running → Passed
//!                   ↘ Failed
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiResponse, AuthenticatedClient};
use crate::config::HarnessConfig;
use crate::error::{RegistryError, ScenarioError};
use crate::expect::{Check, Expectations, FieldPredicate};
use crate::tracker::{ResourceKind, ResourceTracker};

/// 박싱된 Future 타입 별칭
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 시나리오 실행 결과
pub type ScenarioResult = Result<(), ScenarioError>;

// ─── ScenarioState ───────────────────────────────────────────────────

/// 시나리오 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioState {
    Pending,
    Running,
    Passed,
    Failed,
}

impl ScenarioState {
    /// 종료 상태 여부
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// 다음 상태로 전환합니다. 허용되지 않는 전환이면 `false`를 반환하고
    /// 상태는 그대로입니다.
    pub fn advance(&mut self, next: ScenarioState) -> bool {
        let allowed = matches!(
            (*self, next),
            (Self::Pending, Self::Running) | (Self::Running, Self::Passed | Self::Failed)
        );
        if allowed {
            *self = next;
        }
        allowed
    }
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ─── Scenario Trait ──────────────────────────────────────────────────

/// 하나의 독립 테스트 절차
///
/// # 구현 예시
/// ```ignore
/// struct ListProfiles;
///
/// impl Scenario for ListProfiles {
///     fn name(&self) -> &str { "list profiles" }
///
///     async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult {
///         let resp = ctx.client().get("/admin/profiles").await?;
///         ctx.require_status(&resp, &[200], "GET", "/admin/profiles")?;
///         Ok(())
///     }
/// }
/// ```
pub trait Scenario: Send + Sync {
    /// 시나리오 이름 (레지스트리 안에서 고유)
    fn name(&self) -> &str;

    /// 시나리오를 실행합니다.
    ///
    /// `Err`를 반환하거나 기록된 검사 중 하나라도 실패하면 실패로 기록됩니다.
    fn run(&self, ctx: &mut ScenarioContext) -> impl Future<Output = ScenarioResult> + Send;
}

/// dyn-compatible 시나리오 trait
pub trait DynScenario: Send + Sync {
    fn name(&self) -> &str;

    fn run<'a>(&'a self, ctx: &'a mut ScenarioContext) -> BoxFuture<'a, ScenarioResult>;
}

impl<T: Scenario> DynScenario for T {
    fn name(&self) -> &str {
        Scenario::name(self)
    }

    fn run<'a>(&'a self, ctx: &'a mut ScenarioContext) -> BoxFuture<'a, ScenarioResult> {
        Box::pin(Scenario::run(self, ctx))
    }
}

/// 함수 포인터로 정의한 시나리오
///
/// 여러 단계를 거치는 시나리오를 구조체 없이 정의할 때 씁니다.
pub struct FnScenario {
    name: String,
    step: for<'a> fn(&'a mut ScenarioContext) -> BoxFuture<'a, ScenarioResult>,
}

impl FnScenario {
    pub fn new(
        name: impl Into<String>,
        step: for<'a> fn(&'a mut ScenarioContext) -> BoxFuture<'a, ScenarioResult>,
    ) -> Self {
        Self {
            name: name.into(),
            step,
        }
    }
}

impl DynScenario for FnScenario {
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(&'a self, ctx: &'a mut ScenarioContext) -> BoxFuture<'a, ScenarioResult> {
        (self.step)(ctx)
    }
}

// ─── ScenarioContext ─────────────────────────────────────────────────

/// 시나리오 간에 공유되는 실행 컨텍스트
///
/// 클라이언트, 리소스 추적기, 시나리오 간 전달 변수, 현재 시나리오의
/// 검사 기록을 소유합니다.
pub struct ScenarioContext {
    client: AuthenticatedClient,
    tracker: ResourceTracker,
    vars: BTreeMap<String, Value>,
    checks: Expectations,
    config: HarnessConfig,
}

impl ScenarioContext {
    pub fn new(client: AuthenticatedClient, config: HarnessConfig) -> Self {
        Self {
            client,
            tracker: ResourceTracker::new(),
            vars: BTreeMap::new(),
            checks: Expectations::new(),
            config,
        }
    }

    /// 인증된 클라이언트
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    pub(crate) fn client_mut(&mut self) -> &mut AuthenticatedClient {
        &mut self.client
    }

    /// 토큰 없는 클라이언트
    pub fn anonymous(&self) -> AuthenticatedClient {
        self.client.anonymous()
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ResourceTracker {
        &mut self.tracker
    }

    /// 생성한 리소스를 정리 대상으로 기록합니다.
    pub fn track(&mut self, kind: ResourceKind, id: impl Into<String>) {
        self.tracker.track(kind, id);
    }

    // --- 변수 ---

    /// 이후 시나리오가 쓸 값을 저장합니다.
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(key.into(), value.into());
    }

    /// 저장된 값을 꺼냅니다. 없으면 선행 조건 누락입니다.
    pub fn recall(&self, key: &str) -> Result<&Value, ScenarioError> {
        self.vars
            .get(key)
            .ok_or_else(|| ScenarioError::MissingPrerequisite {
                key: key.to_owned(),
            })
    }

    /// 저장된 값을 문자열로 꺼냅니다.
    pub fn recall_str(&self, key: &str) -> Result<String, ScenarioError> {
        Ok(match self.recall(key)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn has_var(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// `{key}` 자리표시자를 저장된 값으로 치환합니다.
    pub fn resolve(&self, template: &str) -> Result<String, ScenarioError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            out.push_str(&rest[..start]);
            let key = &rest[start + 1..start + len];
            out.push_str(&self.recall_str(key)?);
            rest = &rest[start + len + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// JSON 본문 안의 문자열 자리표시자를 치환합니다.
    ///
    /// 문자열 전체가 `{key}`이면 저장된 값 그대로(타입 유지) 들어갑니다.
    pub fn resolve_value(&self, value: &Value) -> Result<Value, ScenarioError> {
        match value {
            Value::String(s) => {
                if let Some(key) = s.strip_prefix('{').and_then(|k| k.strip_suffix('}'))
                    && !key.contains(['{', '}'])
                {
                    return self.recall(key).cloned();
                }
                Ok(Value::String(self.resolve(s)?))
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.resolve_value(v))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    resolved.insert(k.clone(), self.resolve_value(v)?);
                }
                Ok(Value::Object(resolved))
            }
            other => Ok(other.clone()),
        }
    }

    // --- 검사 ---

    /// 상태 코드 검사 (실패해도 계속 진행)
    pub fn expect_status(&mut self, response: &ApiResponse, expected: &[u16]) -> bool {
        self.checks.expect_status(response, expected)
    }

    /// 필드 검사 (실패해도 계속 진행)
    pub fn expect_field(&mut self, body: &Value, field: &str, predicate: FieldPredicate) -> bool {
        self.checks.expect_field(body, field, predicate)
    }

    /// 임의 조건 검사 (실패해도 계속 진행)
    pub fn expect_that(&mut self, label: &str, passed: bool, detail: impl Into<String>) -> bool {
        self.checks.expect_that(label, passed, detail)
    }

    /// 상태 코드 검사. 실패하면 이후 단계가 의미 없으므로 에러로 중단합니다.
    pub fn require_status(
        &mut self,
        response: &ApiResponse,
        expected: &[u16],
        method: &str,
        path: &str,
    ) -> ScenarioResult {
        if self.checks.expect_status(response, expected) {
            Ok(())
        } else {
            Err(ScenarioError::UnexpectedStatus {
                method: method.to_owned(),
                path: path.to_owned(),
                expected: expected.to_vec(),
                actual: response.status,
                body: response.snippet(),
            })
        }
    }

    /// 필수 문자열 필드를 꺼냅니다. 없으면 에러로 중단합니다.
    pub fn require_str(&mut self, body: &Value, field: &str) -> Result<String, ScenarioError> {
        match crate::expect::lookup(body, field) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => {
                let failure = FieldPredicate::IsType(crate::expect::JsonType::String)
                    .evaluate(field, other)
                    .err()
                    .unwrap_or_else(|| {
                        crate::error::AssertionFailure::Custom(format!("field '{field}' unusable"))
                    });
                self.checks.record_failure(field, &failure);
                Err(failure.into())
            }
        }
    }

    /// 현재 시나리오의 검사 기록을 꺼냅니다.
    pub(crate) fn take_checks(&mut self) -> Vec<Check> {
        self.checks.take()
    }

    /// 현재 시나리오에서 기록된 검사
    pub fn checks(&self) -> &[Check] {
        self.checks.checks()
    }
}

// ─── ScenarioRegistry ────────────────────────────────────────────────

/// 시나리오 레지스트리
///
/// 등록 순서가 곧 실행 순서입니다. 같은 이름은 두 번 등록할 수 없습니다.
#[derive(Default)]
pub struct ScenarioRegistry {
    scenarios: Vec<Box<dyn DynScenario>>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 시나리오를 등록합니다.
    pub fn register(&mut self, scenario: Box<dyn DynScenario>) -> Result<(), RegistryError> {
        if self.contains(scenario.name()) {
            return Err(RegistryError::AlreadyRegistered {
                name: scenario.name().to_owned(),
            });
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    /// 여러 시나리오를 순서대로 등록합니다.
    pub fn extend(
        &mut self,
        scenarios: impl IntoIterator<Item = Box<dyn DynScenario>>,
    ) -> Result<(), RegistryError> {
        for scenario in scenarios {
            self.register(scenario)?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenarios.iter().any(|s| s.name() == name)
    }

    /// 등록 순서대로 이름을 반환합니다.
    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn DynScenario> {
        self.scenarios.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use serde_json::json;

    struct Noop(&'static str);

    impl Scenario for Noop {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, _ctx: &mut ScenarioContext) -> ScenarioResult {
            Ok(())
        }
    }

    fn context() -> ScenarioContext {
        let client = AuthenticatedClient::new(&TargetConfig::default()).unwrap();
        ScenarioContext::new(client, HarnessConfig::default())
    }

    #[test]
    fn state_transitions_follow_lifecycle() {
        let mut state = ScenarioState::Pending;
        assert!(!state.advance(ScenarioState::Passed));
        assert!(state.advance(ScenarioState::Running));
        assert!(state.advance(ScenarioState::Failed));
        assert!(state.is_terminal());
        // 종료 상태는 바뀌지 않는다
        assert!(!state.advance(ScenarioState::Passed));
        assert!(!state.advance(ScenarioState::Running));
        assert_eq!(state, ScenarioState::Failed);
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut registry = ScenarioRegistry::new();
        registry.register(Box::new(Noop("a"))).unwrap();
        registry.register(Box::new(Noop("b"))).unwrap();
        let err = registry.register(Box::new(Noop("a"))).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn recall_missing_key_is_missing_prerequisite() {
        let ctx = context();
        let err = ctx.recall("profile.id").unwrap_err();
        assert!(matches!(err, ScenarioError::MissingPrerequisite { .. }));
    }

    #[test]
    fn resolve_substitutes_placeholders() {
        let mut ctx = context();
        ctx.remember("inv.profile_id", "p-1");
        ctx.remember("inv.slug", "rajesh-priya");
        assert_eq!(
            ctx.resolve("/admin/profiles/{inv.profile_id}/event-invitations")
                .unwrap(),
            "/admin/profiles/p-1/event-invitations"
        );
        assert_eq!(
            ctx.resolve("/invite/{inv.slug}/haldi").unwrap(),
            "/invite/rajesh-priya/haldi"
        );
        assert!(ctx.resolve("/admin/profiles/{nope}").is_err());
    }

    #[test]
    fn resolve_value_keeps_types_for_whole_placeholders() {
        let mut ctx = context();
        ctx.remember("langs", json!(["english", "telugu"]));
        ctx.remember("name", "Rajesh");
        let body = json!({"enabled_languages": "{langs}", "title": "Hi {name}", "n": 3});
        let resolved = ctx.resolve_value(&body).unwrap();
        assert_eq!(resolved["enabled_languages"], json!(["english", "telugu"]));
        assert_eq!(resolved["title"], json!("Hi Rajesh"));
        assert_eq!(resolved["n"], json!(3));
    }

    #[test]
    fn require_str_records_failure_for_missing_field() {
        let mut ctx = context();
        let err = ctx.require_str(&json!({}), "id").unwrap_err();
        assert!(matches!(err, ScenarioError::Assertion(_)));
        assert_eq!(ctx.checks().len(), 1);
        assert!(!ctx.checks()[0].passed);
    }
}
