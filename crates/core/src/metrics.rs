//! 메트릭 상수 및 설명 등록
//!
//! 하네스가 기록하는 모든 메트릭의 이름과 설명을 한 곳에서 정의합니다.
//! 클라이언트, 러너, 트래커는 이 상수로 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! `invitecheck` 바이너리는 레코더를 설치하지 않으므로 CLI 실행에서는
//! 이 매크로들이 아무 일도 하지 않습니다. 라이브러리로 임베딩하는 쪽이
//! exporter를 설치했을 때만 값이 남습니다. 실행마다 필요한 요청 수는
//! [`RequestStats`](crate::client::RequestStats)로 [`Summary`](crate::report::Summary)에
//! 항상 실립니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `invitecheck_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// HTTP 메서드 레이블 키
pub const LABEL_METHOD: &str = "method";

/// HTTP 상태 클래스 레이블 키 (2xx, 4xx, 5xx, error)
pub const LABEL_STATUS_CLASS: &str = "status_class";

/// 결과 레이블 키 (passed, failed)
pub const LABEL_RESULT: &str = "result";

/// 리소스 종류 레이블 키 (profile, invitation, template)
pub const LABEL_KIND: &str = "kind";

// ─── HTTP 메트릭 ────────────────────────────────────────────────────

/// HTTP: 전송한 요청 수 (counter, labels: method, status_class)
pub const HTTP_REQUESTS_TOTAL: &str = "invitecheck_http_requests_total";

/// HTTP: 요청 왕복 시간 (histogram, 초)
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "invitecheck_http_request_duration_seconds";

// ─── 러너 메트릭 ────────────────────────────────────────────────────

/// Runner: 종료된 시나리오 수 (counter, label: result)
pub const SCENARIOS_TOTAL: &str = "invitecheck_scenarios_total";

/// Runner: 시나리오 소요 시간 (histogram, 초)
pub const SCENARIO_DURATION_SECONDS: &str = "invitecheck_scenario_duration_seconds";

// ─── 정리 메트릭 ────────────────────────────────────────────────────

/// Cleanup: 삭제에 실패한 리소스 수 (counter, label: kind)
pub const CLEANUP_FAILURES_TOTAL: &str = "invitecheck_cleanup_failures_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// HTTP 요청 시간 히스토그램 버킷 (초)
///
/// 5ms ~ 30s 범위 (기본 타임아웃이 30초)
pub const REQUEST_DURATION_BUCKETS: [f64; 10] =
    [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 30.0];

/// 상태 코드를 레이블용 클래스 문자열로 변환합니다.
pub fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더 설치 후 한 번 호출합니다. 레코더가 없으면 아무 효과가 없습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests sent to the target backend"
    );
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "Round-trip time of a single HTTP request in seconds"
    );
    describe_counter!(
        SCENARIOS_TOTAL,
        "Total number of scenarios that reached a terminal state"
    );
    describe_histogram!(
        SCENARIO_DURATION_SECONDS,
        "Time to run a single scenario in seconds"
    );
    describe_counter!(
        CLEANUP_FAILURES_TOTAL,
        "Total number of tracked resources whose delete failed"
    );
}
