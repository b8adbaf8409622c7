//! 기대값 검사 -- 상태 코드와 응답 필드 판정
//!
//! 검사는 예외가 아니라 [`Check`] 기록으로 남습니다. 한 시나리오 안의
//! 검사가 하나라도 실패하면 그 시나리오는 실패로 기록되지만, 시나리오는
//! 나머지 단계를 계속 진행할 수 있습니다.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ApiResponse;
use crate::error::AssertionFailure;

/// 점(.)으로 구분된 경로로 JSON 값을 조회합니다.
///
/// 배열은 숫자 세그먼트로 인덱싱합니다 (`events.0.name`).
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// JSON 값의 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Number,
    Bool,
    Array,
    Object,
    Null,
}

impl JsonType {
    /// 값의 타입을 판별합니다.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null => Self::Null,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 필드 판정 조건
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPredicate {
    /// 필드가 존재 (null 포함)
    Present,
    /// 값이 같음
    Equals(Value),
    /// 값이 다름
    NotEquals(Value),
    /// 타입이 같음
    IsType(JsonType),
    /// 집합 중 하나
    OneOf(Vec<Value>),
    /// 문자열 부분 일치 또는 배열 원소 포함
    Contains(String),
    /// 문자열 접두어
    StartsWith(String),
    /// null
    IsNull,
    /// 순서 무관 집합 동등
    SameSet(Vec<Value>),
    /// 비어 있지 않은 문자열 또는 배열
    NonEmpty,
}

impl FieldPredicate {
    /// 문자열 값 동등 조건
    pub fn eq_str(expected: &str) -> Self {
        Self::Equals(Value::String(expected.to_owned()))
    }

    /// 문자열 집합 동등 조건
    pub fn same_strings(expected: &[&str]) -> Self {
        Self::SameSet(expected.iter().map(|s| Value::String((*s).to_owned())).collect())
    }

    /// 필드 값을 판정합니다.
    ///
    /// 필드 없음은 [`AssertionFailure::MissingField`], 타입이 맞지 않으면
    /// [`AssertionFailure::WrongType`]입니다.
    pub fn evaluate(&self, field: &str, value: Option<&Value>) -> Result<(), AssertionFailure> {
        let value = value.ok_or_else(|| AssertionFailure::MissingField {
            field: field.to_owned(),
        })?;
        let wrong_type = |expected: &str| AssertionFailure::WrongType {
            field: field.to_owned(),
            expected: expected.to_owned(),
            actual: JsonType::of(value).to_string(),
        };
        let mismatch = |expected: String| AssertionFailure::Mismatch {
            field: field.to_owned(),
            expected,
            actual: value.to_string(),
        };

        match self {
            Self::Present => Ok(()),
            Self::Equals(expected) => {
                if value == expected {
                    Ok(())
                } else {
                    Err(mismatch(expected.to_string()))
                }
            }
            Self::NotEquals(unexpected) => {
                if value != unexpected {
                    Ok(())
                } else {
                    Err(mismatch(format!("anything but {unexpected}")))
                }
            }
            Self::IsType(expected) => {
                if JsonType::of(value) == *expected {
                    Ok(())
                } else {
                    Err(wrong_type(expected.as_str()))
                }
            }
            Self::OneOf(options) => {
                if options.contains(value) {
                    Ok(())
                } else {
                    Err(mismatch(format!("one of {}", Value::Array(options.clone()))))
                }
            }
            Self::Contains(needle) => {
                let needle = needle.as_str();
                match value {
                    Value::String(s) if s.contains(needle) => Ok(()),
                    Value::Array(items) if items.iter().any(|v| v.as_str() == Some(needle)) => Ok(()),
                    Value::String(_) | Value::Array(_) => {
                        Err(mismatch(format!("to contain {needle:?}")))
                    }
                    _ => Err(wrong_type("string or array")),
                }
            }
            Self::StartsWith(prefix) => match value {
                Value::String(s) if s.starts_with(prefix.as_str()) => Ok(()),
                Value::String(_) => Err(mismatch(format!("to start with {prefix:?}"))),
                _ => Err(wrong_type("string")),
            },
            Self::IsNull => {
                if value.is_null() {
                    Ok(())
                } else {
                    Err(mismatch("null".to_owned()))
                }
            }
            Self::SameSet(expected) => match value {
                Value::Array(items) => {
                    if same_set(items, expected) {
                        Ok(())
                    } else {
                        Err(mismatch(format!(
                            "{} (any order)",
                            Value::Array(expected.clone())
                        )))
                    }
                }
                _ => Err(wrong_type("array")),
            },
            Self::NonEmpty => match value {
                Value::String(s) if !s.is_empty() => Ok(()),
                Value::Array(items) if !items.is_empty() => Ok(()),
                Value::String(_) | Value::Array(_) => Err(mismatch("non-empty".to_owned())),
                _ => Err(wrong_type("string or array")),
            },
        }
    }
}

fn same_set(actual: &[Value], expected: &[Value]) -> bool {
    let mut a: Vec<String> = actual.iter().map(Value::to_string).collect();
    let mut e: Vec<String> = expected.iter().map(Value::to_string).collect();
    a.sort();
    e.sort();
    a == e
}

/// 단일 검사 기록
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    /// 검사 설명 (`status`, 필드 경로 등)
    pub label: String,
    /// 통과 여부
    pub passed: bool,
    /// 기대값
    pub expected: String,
    /// 실제값
    pub actual: String,
}

impl Check {
    /// 실패 진단 메시지
    pub fn describe(&self) -> String {
        format!(
            "{}: expected {}, got {}",
            self.label, self.expected, self.actual
        )
    }
}

/// 시나리오 하나의 검사 기록기
#[derive(Debug, Default)]
pub struct Expectations {
    checks: Vec<Check>,
}

impl Expectations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 상태 코드가 허용 집합에 속하는지 검사합니다.
    pub fn expect_status(&mut self, response: &ApiResponse, expected: &[u16]) -> bool {
        let passed = expected.contains(&response.status);
        let actual = if passed {
            response.status.to_string()
        } else {
            format!("{} ({})", response.status, response.snippet())
        };
        self.record(Check {
            label: "status".to_owned(),
            passed,
            expected: format!("{expected:?}"),
            actual,
        })
    }

    /// 본문 필드가 조건을 만족하는지 검사합니다.
    pub fn expect_field(&mut self, body: &Value, field: &str, predicate: FieldPredicate) -> bool {
        match predicate.evaluate(field, lookup(body, field)) {
            Ok(()) => self.record(Check {
                label: field.to_owned(),
                passed: true,
                expected: format!("{predicate:?}"),
                actual: lookup(body, field).map(Value::to_string).unwrap_or_default(),
            }),
            Err(failure) => self.record_failure(field, &failure),
        }
    }

    /// 임의 조건을 검사합니다.
    pub fn expect_that(&mut self, label: &str, passed: bool, detail: impl Into<String>) -> bool {
        let detail = detail.into();
        self.record(Check {
            label: label.to_owned(),
            passed,
            expected: "true".to_owned(),
            actual: if passed { "true".to_owned() } else { detail },
        })
    }

    /// 판정 실패를 기록합니다.
    pub fn record_failure(&mut self, label: &str, failure: &AssertionFailure) -> bool {
        let (expected, actual) = match failure {
            AssertionFailure::MissingField { .. } => ("present".to_owned(), "missing".to_owned()),
            AssertionFailure::WrongType {
                expected, actual, ..
            } => (format!("type {expected}"), format!("type {actual}")),
            AssertionFailure::Mismatch {
                expected, actual, ..
            } => (expected.clone(), actual.clone()),
            AssertionFailure::Custom(msg) => ("true".to_owned(), msg.clone()),
        };
        self.record(Check {
            label: label.to_owned(),
            passed: false,
            expected,
            actual,
        })
    }

    fn record(&mut self, check: Check) -> bool {
        let passed = check.passed;
        if passed {
            debug!(check = %check.label, expected = %check.expected, "check passed");
        } else {
            warn!(
                check = %check.label,
                expected = %check.expected,
                actual = %check.actual,
                "check failed"
            );
        }
        self.checks.push(check);
        passed
    }

    /// 기록된 검사
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// 실패한 검사
    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// 모든 검사 통과 여부
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// 기록을 꺼내고 비웁니다.
    pub fn take(&mut self) -> Vec<Check> {
        std::mem::take(&mut self.checks)
    }
}
