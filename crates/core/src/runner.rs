//! 시나리오 러너 -- 로그인, 순차 실행, 실패 격리, 정리
//!
//! # 실행 흐름
//! ```text
//! admin login ─(실패)─→ 중단 (결과 1건)
//!      │
//!      ▼
//! scenario 1 → scenario 2 → ... → cleanup
//!      (인증 에러만 실행을 중단)
//! ```
//!
//! 시나리오는 한 번에 하나씩 await 됩니다. 실패는 기록되고 다음
//! 시나리오로 진행합니다.

use std::time::Instant;

use tracing::{Instrument, error, info, info_span, warn};

use crate::client::AuthenticatedClient;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::expect::Check;
use crate::metrics as m;
use crate::report::{Summary, TestResult};
use crate::scenario::{DynScenario, ScenarioContext, ScenarioRegistry, ScenarioState};

/// 로그인 결과 이름
pub const LOGIN_SCENARIO: &str = "admin login";

/// 순차 시나리오 러너
pub struct ScenarioRunner {
    config: HarnessConfig,
    client: AuthenticatedClient,
    filter: Option<String>,
}

impl ScenarioRunner {
    /// 설정으로 러너를 생성합니다.
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        let client = AuthenticatedClient::new(&config.target)?;
        Ok(Self {
            config,
            client,
            filter: None,
        })
    }

    /// 이름에 부분 문자열이 포함된 시나리오만 실행합니다.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = (!filter.is_empty()).then_some(filter);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn selected(&self, name: &str) -> bool {
        self.filter.as_deref().is_none_or(|f| name.contains(f))
    }

    /// 로그인 후 시나리오를 등록 순서대로 실행하고 요약을 반환합니다.
    pub async fn run(&self, registry: &ScenarioRegistry) -> Summary {
        let mut summary = Summary::default();
        let mut ctx = ScenarioContext::new(self.client.clone(), self.config.clone());

        info!(
            base_url = %self.config.target.base_url,
            scenarios = registry.len(),
            "starting run"
        );

        let login = self.login(&mut ctx).await;
        let login_passed = login.passed;
        summary.record(login);
        if !login_passed {
            error!("admin login failed, halting run");
            summary.halted = true;
            summary.requests = ctx.client().stats();
            return summary;
        }

        for scenario in registry.iter().filter(|s| self.selected(s.name())) {
            let span = info_span!("scenario", name = scenario.name());
            let (result, fatal) = run_one(scenario, &mut ctx).instrument(span).await;
            summary.record(result);
            if fatal {
                error!(scenario = scenario.name(), "fatal error, halting run");
                summary.halted = true;
                break;
            }
        }

        if self.config.run.cleanup {
            let client = ctx.client().clone();
            let report = ctx.tracker_mut().cleanup(&client).await;
            summary.cleanup = Some(report);
        } else if !ctx.tracker().is_empty() {
            warn!(
                leftover = ctx.tracker().pending().len(),
                "cleanup disabled, created resources left on the target"
            );
        }

        summary.requests = ctx.client().stats();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            requests = summary.requests.sent,
            "run finished"
        );
        summary
    }

    async fn login(&self, ctx: &mut ScenarioContext) -> TestResult {
        let started = Instant::now();
        let email = self.config.admin.email.clone();
        let password = self.config.admin.password.clone();

        let outcome = ctx
            .client_mut()
            .login(&email, &password)
            .instrument(info_span!("scenario", name = LOGIN_SCENARIO))
            .await;
        let elapsed = elapsed_ms(started);

        let result = match outcome {
            Ok(token) => {
                let check = Check {
                    label: "access_token".to_owned(),
                    passed: true,
                    expected: "present".to_owned(),
                    actual: format!("{} chars", token.access_token.len()),
                };
                info!(scenario = LOGIN_SCENARIO, "PASS");
                TestResult::passed(LOGIN_SCENARIO, vec![check], elapsed)
            }
            Err(e) => {
                error!(scenario = LOGIN_SCENARIO, error = %e, "FAIL");
                TestResult::failed(LOGIN_SCENARIO, e.to_string(), Vec::new(), elapsed)
            }
        };
        count_result(result.passed);
        result
    }
}

/// 시나리오 하나를 실행합니다. 두 번째 값은 실행 중단 여부입니다.
async fn run_one(scenario: &dyn DynScenario, ctx: &mut ScenarioContext) -> (TestResult, bool) {
    let mut state = ScenarioState::Pending;
    state.advance(ScenarioState::Running);
    let started = Instant::now();

    let outcome = scenario.run(ctx).await;
    let checks = ctx.take_checks();
    let elapsed = elapsed_ms(started);
    metrics::histogram!(m::SCENARIO_DURATION_SECONDS).record(elapsed as f64 / 1000.0);

    let failed_checks: Vec<&Check> = checks.iter().filter(|c| !c.passed).collect();
    let (passed, message, fatal) = match &outcome {
        Err(e) => (false, e.to_string(), e.is_fatal()),
        Ok(()) if !failed_checks.is_empty() => (
            false,
            format!(
                "{} of {} checks failed: {}",
                failed_checks.len(),
                checks.len(),
                failed_checks[0].describe()
            ),
            false,
        ),
        Ok(()) => (true, String::new(), false),
    };

    if passed {
        state.advance(ScenarioState::Passed);
        info!(scenario = scenario.name(), state = %state, elapsed_ms = elapsed, "PASS");
    } else {
        state.advance(ScenarioState::Failed);
        warn!(scenario = scenario.name(), state = %state, reason = %message, "FAIL");
    }
    count_result(passed);

    let result = if passed {
        TestResult::passed(scenario.name(), checks, elapsed)
    } else {
        TestResult::failed(scenario.name(), message, checks, elapsed)
    };
    (result, fatal)
}

fn count_result(passed: bool) {
    let result = if passed { "passed" } else { "failed" };
    metrics::counter!(m::SCENARIOS_TOTAL, m::LABEL_RESULT => result).increment(1);
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_selects_by_substring() {
        let runner = ScenarioRunner::new(HarnessConfig::default())
            .unwrap()
            .with_filter("422");
        assert!(runner.selected("missing venue returns 422"));
        assert!(!runner.selected("create minimal profile"));
    }

    #[test]
    fn empty_filter_selects_everything() {
        let runner = ScenarioRunner::new(HarnessConfig::default())
            .unwrap()
            .with_filter("");
        assert!(runner.selected("anything"));
    }
}
