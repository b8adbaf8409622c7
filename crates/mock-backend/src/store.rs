//! 인메모리 저장소 -- 프로필, 이벤트 초대장, 감사 로그
//!
//! 검증 규칙과 응답 형태만 흉내 냅니다. 실제 서비스의 설계가 아닙니다.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::error::ApiError;

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

/// 지원 신
pub const DEITIES: [&str; 3] = ["ganesha", "venkateswara", "shiva"];

/// 이벤트 초대장 종류
pub const EVENT_TYPES: [&str; 5] = ["engagement", "haldi", "mehendi", "marriage", "reception"];

/// 신을 두지 않는 이벤트
const DEITYLESS_EVENTS: [&str; 2] = ["haldi", "mehendi"];

/// 기본 디자인
pub const DEFAULT_DESIGN: &str = "temple_divine";

const REQUIRED_PROFILE_FIELDS: [&str; 5] =
    ["groom_name", "bride_name", "event_type", "event_date", "venue"];

/// 서버가 관리하는 필드 (요청으로 덮어쓸 수 없음)
const SERVER_FIELDS: [&str; 6] = [
    "id",
    "slug",
    "invitation_link",
    "is_template",
    "created_at",
    "updated_at",
];

const DEFAULT_SECTIONS: [(&str, bool); 8] = [
    ("opening", true),
    ("welcome", true),
    ("couple", true),
    ("photos", true),
    ("video", false),
    ("events", true),
    ("greetings", true),
    ("footer", true),
];

/// 단조 증가 시계
///
/// 같은 마이크로초 안에 두 리소스가 만들어져도 `created_at`이 겹치지 않게 합니다.
#[derive(Debug, Default)]
struct Clock {
    last: Option<DateTime<Utc>>,
}

impl Clock {
    fn tick(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last
            && now <= last
        {
            now = last + Duration::microseconds(1);
        }
        self.last = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// 저장소 본체
#[derive(Debug, Default)]
pub struct Store {
    profiles: Vec<Map<String, Value>>,
    invitations: Vec<Map<String, Value>>,
    audit: Vec<Value>,
    clock: Clock,
}

fn str_of<'a>(record: &'a Map<String, Value>, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn slugify(groom: &str, bride: &str) -> String {
    let base: String = format!("{groom}-{bride}")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let base = base
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{base}-{}", &suffix[..6])
}

fn validate_languages(value: &Value) -> Result<(), ApiError> {
    let langs = value
        .as_array()
        .ok_or_else(|| ApiError::validation("enabled_languages", "must be a list"))?;
    if !langs.iter().any(|l| l.as_str() == Some("english")) {
        return Err(ApiError::validation(
            "enabled_languages",
            "English is required and must be enabled",
        ));
    }
    Ok(())
}

fn validate_design(value: &Value) -> Result<(), ApiError> {
    match value.as_str() {
        Some(design) if DESIGNS.contains(&design) => Ok(()),
        _ => Err(ApiError::validation("design_id", "unknown design")),
    }
}

fn validate_deity(value: &Value) -> Result<(), ApiError> {
    match value {
        Value::Null => Ok(()),
        Value::String(deity) if DEITIES.contains(&deity.as_str()) => Ok(()),
        _ => Err(ApiError::validation("deity_id", "unknown deity")),
    }
}

impl Store {
    fn audit(
        &mut self,
        action: &str,
        admin_id: &str,
        profile: &Map<String, Value>,
        details: Value,
    ) {
        let timestamp = self.clock.tick();
        self.audit.push(json!({
            "id": Uuid::new_v4().to_string(),
            "action": action,
            "admin_id": admin_id,
            "profile_id": str_of(profile, "id"),
            "profile_slug": str_of(profile, "slug"),
            "details": details,
            "timestamp": timestamp,
        }));
    }

    fn profile_index(&self, id: &str) -> Result<usize, ApiError> {
        self.profiles
            .iter()
            .position(|p| str_of(p, "id") == id)
            .ok_or_else(|| ApiError::not_found("Profile not found"))
    }

    fn invitation_index(&self, id: &str) -> Result<usize, ApiError> {
        self.invitations
            .iter()
            .position(|i| str_of(i, "id") == id)
            .ok_or_else(|| ApiError::not_found("Event invitation not found"))
    }

    /// 서버 필드를 새로 부여한 프로필 사본을 만들어 저장합니다.
    fn insert_copy(&mut self, source: &Map<String, Value>) -> Map<String, Value> {
        let mut profile = source.clone();
        let slug = slugify(str_of(source, "groom_name"), str_of(source, "bride_name"));
        let now = self.clock.tick();
        profile.insert("id".into(), json!(Uuid::new_v4().to_string()));
        profile.insert("invitation_link".into(), json!(format!("/invite/{slug}")));
        profile.insert("slug".into(), json!(slug));
        profile.insert("is_template".into(), json!(false));
        profile.insert("created_at".into(), json!(now));
        profile.insert("updated_at".into(), json!(now));
        self.profiles.push(profile.clone());
        profile
    }

    // ─── 프로필 ──────────────────────────────────────────────────────

    pub fn create_profile(&mut self, admin_id: &str, body: Value) -> Result<Value, ApiError> {
        let Value::Object(mut input) = body else {
            return Err(ApiError::validation("body", "must be an object"));
        };
        for field in REQUIRED_PROFILE_FIELDS {
            match input.get(field) {
                Some(Value::String(_)) => {}
                Some(_) => return Err(ApiError::validation(field, "must be a string")),
                None => return Err(ApiError::validation(field, "Field required")),
            }
        }
        let languages = input
            .remove("enabled_languages")
            .unwrap_or_else(|| json!(["english"]));
        validate_languages(&languages)?;
        let design = input
            .remove("design_id")
            .unwrap_or_else(|| json!(DEFAULT_DESIGN));
        validate_design(&design)?;
        let deity = input.remove("deity_id").unwrap_or(Value::Null);
        validate_deity(&deity)?;

        let mut sections: Map<String, Value> = DEFAULT_SECTIONS
            .iter()
            .map(|(k, v)| ((*k).to_owned(), json!(v)))
            .collect();
        if let Some(Value::Object(given)) = input.remove("sections_enabled") {
            sections.extend(given);
        }

        for field in SERVER_FIELDS {
            input.remove(field);
        }
        input.insert("enabled_languages".into(), languages);
        input.insert("design_id".into(), design);
        input.insert("deity_id".into(), deity);
        input.insert("sections_enabled".into(), Value::Object(sections));
        input.entry("events").or_insert_with(|| json!([]));
        input.entry("is_active").or_insert(json!(true));

        let profile = self.insert_copy(&input);
        self.audit("profile_created", admin_id, &profile, json!({}));
        Ok(Value::Object(profile))
    }

    /// 템플릿이 아닌 프로필 (최신 순)
    pub fn list_profiles(&self) -> Value {
        Value::Array(
            self.profiles
                .iter()
                .rev()
                .filter(|p| p.get("is_template") != Some(&json!(true)))
                .cloned()
                .map(Value::Object)
                .collect(),
        )
    }

    /// 템플릿 (최신 순)
    pub fn list_templates(&self) -> Value {
        Value::Array(
            self.profiles
                .iter()
                .rev()
                .filter(|p| p.get("is_template") == Some(&json!(true)))
                .cloned()
                .map(Value::Object)
                .collect(),
        )
    }

    pub fn get_profile(&self, id: &str) -> Result<Value, ApiError> {
        let index = self.profile_index(id)?;
        Ok(Value::Object(self.profiles[index].clone()))
    }

    pub fn update_profile(
        &mut self,
        admin_id: &str,
        id: &str,
        body: Value,
    ) -> Result<Value, ApiError> {
        let index = self.profile_index(id)?;
        let Value::Object(mut changes) = body else {
            return Err(ApiError::validation("body", "must be an object"));
        };
        if let Some(languages) = changes.get("enabled_languages") {
            validate_languages(languages)?;
        }
        if let Some(design) = changes.get("design_id") {
            validate_design(design)?;
        }
        if let Some(deity) = changes.get("deity_id") {
            validate_deity(deity)?;
        }
        for field in SERVER_FIELDS {
            changes.remove(field);
        }
        let changed: Vec<Value> = changes.keys().map(|k| json!(k)).collect();
        let now = self.clock.tick();
        let profile = &mut self.profiles[index];
        profile.extend(changes);
        profile.insert("updated_at".into(), json!(now));
        let profile = profile.clone();
        self.audit(
            "profile_updated",
            admin_id,
            &profile,
            json!({ "fields": changed }),
        );
        Ok(Value::Object(profile))
    }

    pub fn delete_profile(&mut self, admin_id: &str, id: &str) -> Result<Value, ApiError> {
        let index = self.profile_index(id)?;
        let profile = self.profiles.remove(index);
        self.invitations.retain(|i| str_of(i, "profile_id") != id);
        self.audit("profile_deleted", admin_id, &profile, json!({}));
        Ok(json!({ "message": "Profile deleted successfully" }))
    }

    pub fn duplicate_profile(&mut self, admin_id: &str, id: &str) -> Result<Value, ApiError> {
        let index = self.profile_index(id)?;
        let source = self.profiles[index].clone();
        let copy = self.insert_copy(&source);
        self.audit(
            "profile_duplicated",
            admin_id,
            &copy,
            json!({ "source_profile_id": id }),
        );
        Ok(Value::Object(copy))
    }

    pub fn save_as_template(&mut self, id: &str) -> Result<Value, ApiError> {
        let index = self.profile_index(id)?;
        let now = self.clock.tick();
        let profile = &mut self.profiles[index];
        profile.insert("is_template".into(), json!(true));
        profile.insert("updated_at".into(), json!(now));
        Ok(Value::Object(profile.clone()))
    }

    pub fn create_from_template(
        &mut self,
        admin_id: &str,
        template_id: &str,
    ) -> Result<Value, ApiError> {
        let source = self
            .profiles
            .iter()
            .find(|p| str_of(p, "id") == template_id && p.get("is_template") == Some(&json!(true)))
            .cloned()
            .ok_or_else(|| ApiError::not_found("Template not found"))?;
        let profile = self.insert_copy(&source);
        self.audit(
            "profile_created",
            admin_id,
            &profile,
            json!({ "template_id": template_id }),
        );
        Ok(Value::Object(profile))
    }

    pub fn public_profile(&self, slug: &str) -> Result<Value, ApiError> {
        let profile = self
            .profiles
            .iter()
            .find(|p| str_of(p, "slug") == slug && p.get("is_active") != Some(&json!(false)))
            .ok_or_else(|| ApiError::not_found("Invitation not found"))?;
        let mut view = profile.clone();
        view.remove("is_template");
        Ok(Value::Object(view))
    }

    // ─── 이벤트 초대장 ───────────────────────────────────────────────

    pub fn create_invitation(&mut self, profile_id: &str, body: Value) -> Result<Value, ApiError> {
        let index = self.profile_index(profile_id)?;
        let slug = str_of(&self.profiles[index], "slug").to_owned();
        let profile_design = self.profiles[index]
            .get("design_id")
            .cloned()
            .unwrap_or_else(|| json!(DEFAULT_DESIGN));

        let event_type = body
            .get("event_type")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::validation("event_type", "Field required"))?
            .to_owned();
        if !EVENT_TYPES.contains(&event_type.as_str()) {
            return Err(ApiError::validation("event_type", "unknown event type"));
        }
        let design = body.get("design_id").cloned().unwrap_or(profile_design);
        validate_design(&design)?;
        let mut deity = body.get("deity_id").cloned().unwrap_or(Value::Null);
        validate_deity(&deity)?;
        if DEITYLESS_EVENTS.contains(&event_type.as_str()) {
            deity = Value::Null;
        }
        let enabled = body.get("enabled").cloned().unwrap_or(json!(true));

        if self
            .invitations
            .iter()
            .any(|i| str_of(i, "profile_id") == profile_id && str_of(i, "event_type") == event_type)
        {
            return Err(ApiError::bad_request(format!(
                "Event invitation for '{event_type}' already exists"
            )));
        }

        let now = self.clock.tick();
        let invitation = json!({
            "id": Uuid::new_v4().to_string(),
            "profile_id": profile_id,
            "event_type": event_type,
            "design_id": design,
            "deity_id": deity,
            "enabled": enabled,
            "invitation_link": format!("/invite/{slug}/{event_type}"),
            "created_at": now,
            "updated_at": now,
        });
        if let Value::Object(map) = &invitation {
            self.invitations.push(map.clone());
        }
        Ok(invitation)
    }

    pub fn list_invitations(&self, profile_id: &str) -> Result<Value, ApiError> {
        self.profile_index(profile_id)?;
        Ok(Value::Array(
            self.invitations
                .iter()
                .filter(|i| str_of(i, "profile_id") == profile_id)
                .cloned()
                .map(Value::Object)
                .collect(),
        ))
    }

    pub fn get_invitation(&self, id: &str) -> Result<Value, ApiError> {
        let index = self.invitation_index(id)?;
        Ok(Value::Object(self.invitations[index].clone()))
    }

    pub fn update_invitation(&mut self, id: &str, body: Value) -> Result<Value, ApiError> {
        let index = self.invitation_index(id)?;
        if let Some(design) = body.get("design_id") {
            validate_design(design)?;
        }
        if let Some(deity) = body.get("deity_id") {
            validate_deity(deity)?;
        }
        let now = self.clock.tick();
        let invitation = &mut self.invitations[index];
        let deityless = DEITYLESS_EVENTS.contains(&str_of(invitation, "event_type"));
        for key in ["design_id", "deity_id", "enabled"] {
            if let Some(value) = body.get(key) {
                invitation.insert(key.to_owned(), value.clone());
            }
        }
        if deityless {
            invitation.insert("deity_id".into(), Value::Null);
        }
        invitation.insert("updated_at".into(), json!(now));
        Ok(Value::Object(invitation.clone()))
    }

    pub fn delete_invitation(&mut self, id: &str) -> Result<Value, ApiError> {
        let index = self.invitation_index(id)?;
        self.invitations.remove(index);
        Ok(json!({ "message": "Event invitation deleted successfully" }))
    }

    pub fn public_invitation(&self, slug: &str, event_type: &str) -> Result<Value, ApiError> {
        let profile = self
            .profiles
            .iter()
            .find(|p| str_of(p, "slug") == slug && p.get("is_active") != Some(&json!(false)))
            .ok_or_else(|| ApiError::not_found("Invitation not found"))?;
        let invitation = self
            .invitations
            .iter()
            .find(|i| {
                str_of(i, "profile_id") == str_of(profile, "id")
                    && str_of(i, "event_type") == event_type
                    && i.get("enabled") != Some(&json!(false))
            })
            .ok_or_else(|| ApiError::not_found("Event invitation not found or disabled"))?;
        Ok(json!({
            "slug": slug,
            "event_type": event_type,
            "groom_name": profile.get("groom_name"),
            "bride_name": profile.get("bride_name"),
            "event_date": profile.get("event_date"),
            "venue": profile.get("venue"),
            "enabled_languages": profile.get("enabled_languages"),
            "design_id": invitation.get("design_id"),
            "deity_id": invitation.get("deity_id"),
        }))
    }

    // ─── 감사 로그 ───────────────────────────────────────────────────

    /// 감사 로그 (최신 순)
    pub fn audit_logs(&self) -> Value {
        Value::Array(self.audit.iter().rev().cloned().collect())
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn invitation_count(&self) -> usize {
        self.invitations.len()
    }
}
