#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub mod error;
pub mod expect;
pub mod metrics;
pub mod report;
pub mod request;
pub mod runner;
pub mod scenario;
pub mod tracker;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{
    AssertionFailure, AuthError, CleanupError, ConfigError, HarnessError, RegistryError,
    ScenarioError, TransportError,
};

// 설정
pub use config::HarnessConfig;

// 클라이언트
pub use client::{ApiResponse, AuthenticatedClient, RequestStats, Session, Token};

// 검사 및 결과
pub use expect::{Check, Expectations, FieldPredicate, JsonType};
pub use report::{Summary, TestResult};

// 시나리오 및 러너
pub use request::{ExpectedStatus, RequestScenario};
pub use runner::ScenarioRunner;
pub use scenario::{
    BoxFuture, DynScenario, FnScenario, Scenario, ScenarioContext, ScenarioRegistry,
    ScenarioResult, ScenarioState,
};

// 리소스 추적
pub use tracker::{CleanupReport, ResourceKind, ResourceTracker, TrackedResource};
