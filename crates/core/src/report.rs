//! 실행 결과 -- 시나리오별 결과와 요약 보고서

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::RequestStats;
use crate::expect::Check;
use crate::tracker::CleanupReport;

/// 시나리오 하나의 실행 결과. 기록된 뒤에는 바뀌지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// 시나리오 이름
    pub name: String,
    /// 통과 여부
    pub passed: bool,
    /// 요약 메시지 (실패 시 진단 포함)
    pub message: String,
    /// 종료 시각
    pub timestamp: DateTime<Utc>,
    /// 소요 시간 (ms)
    pub duration_ms: u64,
    /// 시나리오 안에서 수행된 검사
    pub checks: Vec<Check>,
}

impl TestResult {
    pub fn passed(name: impl Into<String>, checks: Vec<Check>, duration_ms: u64) -> Self {
        let message = format!("{} checks passed", checks.len());
        Self {
            name: name.into(),
            passed: true,
            message,
            timestamp: Utc::now(),
            duration_ms,
            checks,
        }
    }

    pub fn failed(
        name: impl Into<String>,
        message: impl Into<String>,
        checks: Vec<Check>,
        duration_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            timestamp: Utc::now(),
            duration_ms,
            checks,
        }
    }
}

/// 실행 요약
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    /// 실행된 시나리오 수 (로그인 포함)
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// 실행 순서대로 정렬된 결과
    pub results: Vec<TestResult>,
    /// 인증 실패로 중단되었는지 여부
    pub halted: bool,
    /// 정리 결과 (정리를 건너뛰었으면 `None`)
    pub cleanup: Option<CleanupReport>,
    /// 로그인, 시나리오, 정리를 합친 요청 집계
    pub requests: RequestStats,
}

impl Summary {
    /// 결과를 추가하고 집계를 갱신합니다.
    pub fn record(&mut self, result: TestResult) {
        self.total += 1;
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// 모든 시나리오 통과 여부
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && !self.halted
    }

    /// 실패한 결과
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// 실행을 중단시킨 결과. 중단되지 않았으면 `None`입니다.
    ///
    /// 로그인 실패든 실행 중 인증 에러든 중단 직전의 마지막 실패입니다.
    pub fn halted_by(&self) -> Option<&TestResult> {
        if !self.halted {
            return None;
        }
        self.results.iter().rev().find(|r| !r.passed)
    }

    /// 사람이 읽을 요약 보고서
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Total: {}  Passed: {}  Failed: {}",
            self.total, self.passed, self.failed
        );
        if self.halted {
            let _ = writeln!(out, "Run halted after authentication failure");
        }

        if self.failed > 0 {
            let _ = writeln!(out, "\nFailed scenarios:");
            for result in self.failures() {
                let _ = writeln!(out, "  - {}: {}", result.name, result.message);
                for check in result.checks.iter().filter(|c| !c.passed) {
                    let _ = writeln!(out, "      {}", check.describe());
                }
            }
        }

        let _ = writeln!(
            out,
            "\nRequests: {} sent, {} transport errors",
            self.requests.sent, self.requests.transport_errors
        );

        if let Some(cleanup) = &self.cleanup {
            let _ = writeln!(
                out,
                "Cleanup: {} deleted, {} already gone, {} failed",
                cleanup.deleted.len(),
                cleanup.already_gone.len(),
                cleanup.failed.len()
            );
            for failure in &cleanup.failed {
                let _ = writeln!(out, "  - {}: {}", failure.resource, failure.reason);
            }
        }

        out
    }
}
