//! `profile-save` -- 프로필 생성 검증과 기본 CRUD

use invitecheck_core::expect::{FieldPredicate, JsonType};
use invitecheck_core::request::RequestScenario;
use invitecheck_core::scenario::{BoxFuture, FnScenario, ScenarioContext, ScenarioResult};
use invitecheck_core::tracker::ResourceKind;
use serde_json::{Value, json};

use super::{ScenarioList, titled};
use crate::fixtures::{self, PROFILES, REQUIRED_FIELDS, UNKNOWN_ID};
use crate::steps;

pub const NAME: &str = "profile-save";

const PROFILE_ID: &str = "profile-save.id";

/// english가 빠진 언어 조합
const WITHOUT_ENGLISH: [(&str, &[&str]); 4] = [
    ("telugu only", &["telugu"]),
    ("hindi only", &["hindi"]),
    ("telugu, tamil, kannada", &["telugu", "tamil", "kannada"]),
    ("empty list", &[]),
];

/// english를 포함한 언어 조합
const WITH_ENGLISH: [(&str, &[&str]); 4] = [
    ("english only", &["english"]),
    ("english + telugu", &["english", "telugu"]),
    ("english + tamil + kannada", &["english", "tamil", "kannada"]),
    (
        "all supported languages",
        &["english", "telugu", "tamil", "kannada", "malayalam"],
    ),
];

/// 생성 응답의 필드 타입
const RESPONSE_TYPES: [(&str, JsonType); 15] = [
    ("id", JsonType::String),
    ("slug", JsonType::String),
    ("groom_name", JsonType::String),
    ("bride_name", JsonType::String),
    ("event_type", JsonType::String),
    ("event_date", JsonType::String),
    ("venue", JsonType::String),
    ("enabled_languages", JsonType::Array),
    ("events", JsonType::Array),
    ("created_at", JsonType::String),
    ("updated_at", JsonType::String),
    ("is_active", JsonType::Bool),
    ("invitation_link", JsonType::String),
    ("sections_enabled", JsonType::Object),
    ("design_id", JsonType::String),
];

pub fn scenarios() -> ScenarioList {
    let mut list: ScenarioList = Vec::new();
    let by_id = format!("{PROFILES}/{{{PROFILE_ID}}}");
    let unknown = format!("{PROFILES}/{UNKNOWN_ID}");

    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, "create profile with minimal fields"),
            PROFILES,
            fixtures::minimal_profile(),
        )
        .expect(&[200, 201])
        .field("slug", FieldPredicate::NonEmpty)
        .field("invitation_link", FieldPredicate::StartsWith("/invite/".to_owned()))
        .field("groom_name", FieldPredicate::eq_str("Rajesh"))
        .field("bride_name", FieldPredicate::eq_str("Priya"))
        .capture("id", PROFILE_ID)
        .track_as(ResourceKind::Profile),
    ));

    for field in REQUIRED_FIELDS {
        list.push(Box::new(
            RequestScenario::post(
                titled(NAME, &format!("missing {field} returns 422")),
                PROFILES,
                fixtures::without(fixtures::minimal_profile(), field),
            )
            .expect(&[422])
            .field("detail", FieldPredicate::Present)
            .track_as(ResourceKind::Profile),
        ));
    }

    for (label, languages) in WITHOUT_ENGLISH {
        list.push(Box::new(
            RequestScenario::post(
                titled(NAME, &format!("languages without english ({label}) return 422")),
                PROFILES,
                fixtures::with(fixtures::minimal_profile(), "enabled_languages", json!(languages)),
            )
            .expect(&[422])
            .track_as(ResourceKind::Profile),
        ));
    }

    for (i, (label, languages)) in WITH_ENGLISH.iter().enumerate() {
        let body = fixtures::with(
            fixtures::profile(&format!("Test Groom {}", i + 1), &format!("Test Bride {}", i + 1)),
            "enabled_languages",
            json!(languages),
        );
        list.push(Box::new(
            RequestScenario::post(
                titled(NAME, &format!("languages {label} accepted")),
                PROFILES,
                body,
            )
            .expect(&[200, 201])
            .field("enabled_languages", FieldPredicate::same_strings(languages))
            .track_as(ResourceKind::Profile),
        ));
    }

    let mut format_check = RequestScenario::post(
        titled(NAME, "create response has full profile shape"),
        PROFILES,
        fixtures::profile("Response Test Groom", "Response Test Bride"),
    )
    .expect(&[200, 201])
    .track_as(ResourceKind::Profile);
    for (field, ty) in RESPONSE_TYPES {
        format_check = format_check.field(field, FieldPredicate::IsType(ty));
    }
    list.push(Box::new(
        format_check
            .field("groom_name", FieldPredicate::eq_str("Response Test Groom"))
            .field("is_active", FieldPredicate::Equals(json!(true)))
            .field("invitation_link", FieldPredicate::StartsWith("/invite/".to_owned())),
    ));

    list.push(Box::new(FnScenario::new(
        titled(NAME, "languages round-trip through admin and public views"),
        language_round_trip,
    )));

    list.push(Box::new(
        RequestScenario::get(titled(NAME, "get profile by id"), by_id.clone())
            .field("groom_name", FieldPredicate::eq_str("Rajesh"))
            .field("venue", FieldPredicate::eq_str("Grand Palace"))
            .field("slug", FieldPredicate::NonEmpty),
    ));
    list.push(Box::new(
        RequestScenario::get(titled(NAME, "unknown profile id returns 404"), unknown.clone())
            .expect(&[404]),
    ));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "profile list contains created profile"),
        list_contains_profile,
    )));

    list.push(Box::new(
        RequestScenario::put(
            titled(NAME, "partial update changes only given fields"),
            by_id.clone(),
            json!({ "venue": "Royal Gardens" }),
        )
        .field("venue", FieldPredicate::eq_str("Royal Gardens"))
        .field("groom_name", FieldPredicate::eq_str("Rajesh"))
        .field("enabled_languages", FieldPredicate::same_strings(&["english"])),
    ));
    list.push(Box::new(
        RequestScenario::put(
            titled(NAME, "update of unknown profile returns 404"),
            unknown.clone(),
            json!({ "venue": "Nowhere" }),
        )
        .expect(&[404]),
    ));
    list.push(Box::new(
        RequestScenario::put(
            titled(NAME, "update dropping english returns 422"),
            by_id.clone(),
            json!({ "enabled_languages": ["telugu"] }),
        )
        .expect(&[422]),
    ));

    list.push(Box::new(
        RequestScenario::delete(titled(NAME, "delete profile"), by_id.clone())
            .expect(&[200, 204])
            .untrack_var(ResourceKind::Profile, PROFILE_ID),
    ));
    list.push(Box::new(
        RequestScenario::get(titled(NAME, "deleted profile returns 404"), by_id).expect(&[404]),
    ));

    list
}

fn language_round_trip(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let languages = ["english", "telugu"];
        let body = fixtures::with(
            fixtures::profile("Round Trip Groom", "Round Trip Bride"),
            "enabled_languages",
            json!(languages),
        );
        let created = steps::create_profile(ctx, &body).await?;
        let id = ctx.require_str(&created, "id")?;
        let slug = ctx.require_str(&created, "slug")?;

        let admin = steps::fetch(ctx, &format!("{PROFILES}/{id}")).await?;
        ctx.expect_field(&admin, "enabled_languages", FieldPredicate::same_strings(&languages));

        let public = steps::fetch_public(ctx, &format!("/invite/{slug}")).await?;
        ctx.expect_field(&public, "enabled_languages", FieldPredicate::same_strings(&languages));
        Ok(())
    })
}

fn list_contains_profile(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let id = ctx.recall_str(PROFILE_ID)?;
        let list = steps::fetch(ctx, PROFILES).await?;
        ctx.expect_that(
            "profile list is an array",
            list.is_array(),
            format!("got {}", list),
        );
        let entry: Value = steps::find_by_id(ctx, &list, &id)?.clone();
        ctx.expect_field(&entry, "groom_name", FieldPredicate::eq_str("Rajesh"));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use invitecheck_core::scenario::DynScenario;

    #[test]
    fn names_are_prefixed_and_unique() {
        let list = scenarios();
        let mut names: Vec<&str> = list.iter().map(|s| s.name()).collect();
        assert!(names.iter().all(|n| n.starts_with("profile-save: ")));
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn every_required_field_has_a_missing_case() {
        let list = scenarios();
        for field in REQUIRED_FIELDS {
            let expected = format!("profile-save: missing {field} returns 422");
            assert!(list.iter().any(|s| s.name() == expected), "{field}");
        }
    }
}
