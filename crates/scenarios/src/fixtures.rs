//! 요청 본문과 도메인 상수

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::{Value, json};

/// 프로필 컬렉션 경로
pub const PROFILES: &str = "/admin/profiles";

/// 존재하지 않는 리소스 id
pub const UNKNOWN_ID: &str = "00000000-0000-0000-0000-000000000000";

/// 지원 디자인
pub const DESIGNS: [&str; 8] = [
    "temple_divine",
    "royal_classic",
    "floral_soft",
    "cinematic_luxury",
    "heritage_scroll",
    "minimal_elegant",
    "modern_premium",
    "artistic_handcrafted",
];

/// design_id를 생략했을 때의 디자인
pub const DEFAULT_DESIGN: &str = "temple_divine";

/// 지원 신
pub const DEITIES: [&str; 3] = ["ganesha", "venkateswara", "shiva"];

/// 이벤트 초대장 종류
pub const EVENT_TYPES: [&str; 5] = [
    "engagement",
    "haldi",
    "mehendi",
    "marriage",
    "reception",
];

/// 프로필 생성 필수 필드
pub const REQUIRED_FIELDS: [&str; 5] = [
    "groom_name",
    "bride_name",
    "event_type",
    "event_date",
    "venue",
];

/// 감사 로그 항목 필드
pub const AUDIT_FIELDS: [&str; 7] = [
    "id",
    "action",
    "admin_id",
    "profile_id",
    "profile_slug",
    "details",
    "timestamp",
];

/// 오늘부터 `days`일 뒤 오전 10시 (`YYYY-MM-DDT10:00:00`)
pub fn event_date(days: i64) -> String {
    (Utc::now() + Duration::days(days))
        .format("%Y-%m-%dT10:00:00")
        .to_string()
}

/// 최소 필드 프로필 (Rajesh & Priya, 30일 뒤, Grand Palace)
pub fn minimal_profile() -> Value {
    profile("Rajesh", "Priya")
}

/// 이름만 바꾼 최소 필드 프로필
pub fn profile(groom: &str, bride: &str) -> Value {
    json!({
        "groom_name": groom,
        "bride_name": bride,
        "event_type": "marriage",
        "event_date": event_date(30),
        "venue": "Grand Palace",
        "enabled_languages": ["english"],
        "events": [],
    })
}

/// 필드 하나를 바꾼 사본
pub fn with(mut body: Value, field: &str, value: Value) -> Value {
    if let Value::Object(map) = &mut body {
        map.insert(field.to_owned(), value);
    }
    body
}

/// 필드 하나를 뺀 사본
pub fn without(mut body: Value, field: &str) -> Value {
    if let Value::Object(map) = &mut body {
        map.remove(field);
    }
    body
}

/// 템플릿 원본으로 쓰는 풍부한 프로필
pub fn template_source() -> Value {
    json!({
        "groom_name": "Arjun Sharma",
        "bride_name": "Priya Patel",
        "event_type": "Wedding",
        "event_date": event_date(60),
        "venue": "Grand Palace Banquet Hall",
        "city": "Mumbai",
        "invitation_message": "Join us as we celebrate our union in the presence of family and friends",
        "language": ["english", "telugu"],
        "enabled_languages": ["english", "telugu"],
        "design_id": "royal_classic",
        "deity_id": "ganesha",
        "whatsapp_groom": "+919876543210",
        "whatsapp_bride": "+919876543211",
        "about_couple": "<p>Arjun and Priya met during their college years.</p>",
        "family_details": "<p>Son of Mr. & Mrs. Sharma, Daughter of Mr. & Mrs. Patel</p>",
        "love_story": "<p>Our love story began in the library.</p>",
        "sections_enabled": {
            "opening": true,
            "welcome": true,
            "couple": true,
            "about": true,
            "family": true,
            "love_story": true,
            "photos": true,
            "video": false,
            "events": true,
            "rsvp": true,
            "greetings": true,
            "footer": true,
        },
        "events": [
            {
                "name": "Mehendi Ceremony",
                "date": event_date(58),
                "start_time": "16:00",
                "end_time": "20:00",
                "venue_name": "Sharma Residence",
                "visible": true,
                "order": 0,
            },
            {
                "name": "Wedding Ceremony",
                "date": event_date(60),
                "start_time": "10:00",
                "end_time": "14:00",
                "venue_name": "Grand Palace Banquet Hall",
                "visible": true,
                "order": 1,
            },
        ],
    })
}

/// 타임스탬프를 UTC로 해석합니다.
///
/// 오프셋이 없는 값(`2026-01-01T10:00:00.123456`)은 UTC로 간주합니다.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// 목록이 `field` 기준 최신 순인지 확인합니다.
///
/// 해석할 수 없는 값이 있으면 그 값을 `Err`로 돌려줍니다.
pub fn is_newest_first(items: &[Value], field: &str) -> Result<bool, String> {
    let mut stamps = Vec::with_capacity(items.len());
    for item in items {
        let raw = item.get(field).and_then(Value::as_str).unwrap_or_default();
        stamps.push(parse_timestamp(raw).ok_or_else(|| raw.to_owned())?);
    }
    Ok(stamps.windows(2).all(|pair| pair[0] >= pair[1]))
}

/// 목록 응답의 `id`들
pub fn ids(list: &Value) -> Vec<&str> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}
