//! `templates` -- 템플릿 저장, 목록, 템플릿에서 생성, 복제

use invitecheck_core::error::AssertionFailure;
use invitecheck_core::expect::FieldPredicate;
use invitecheck_core::request::{ExpectedStatus, RequestScenario};
use invitecheck_core::scenario::{BoxFuture, FnScenario, ScenarioContext, ScenarioResult};
use invitecheck_core::tracker::ResourceKind;
use serde_json::{Value, json};
use tracing::warn;

use super::{ScenarioList, titled};
use crate::fixtures::{self, PROFILES, UNKNOWN_ID};
use crate::steps;

pub const NAME: &str = "templates";

const SOURCE_ID: &str = "templates.source_id";
const COPY_ID: &str = "templates.copy_id";

/// 템플릿 목록 항목에 있어야 하는 필드
const TEMPLATE_FIELDS: [&str; 9] = [
    "id",
    "slug",
    "groom_name",
    "bride_name",
    "design_id",
    "deity_id",
    "events",
    "sections_enabled",
    "created_at",
];

/// 템플릿에서 만든 프로필로 복사되는 필드
const COPIED_FIELDS: [&str; 12] = [
    "groom_name",
    "bride_name",
    "design_id",
    "deity_id",
    "venue",
    "city",
    "invitation_message",
    "enabled_languages",
    "about_couple",
    "family_details",
    "love_story",
    "sections_enabled",
];

pub fn scenarios() -> ScenarioList {
    let mut list: ScenarioList = Vec::new();
    let source = format!("{PROFILES}/{{{SOURCE_ID}}}");

    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, "create template source profile"),
            PROFILES,
            fixtures::template_source(),
        )
        .expect(&[200, 201])
        .field("design_id", FieldPredicate::eq_str("royal_classic"))
        .field("deity_id", FieldPredicate::eq_str("ganesha"))
        .capture("id", SOURCE_ID)
        .track_as(ResourceKind::Profile),
    ));
    list.push(Box::new(
        RequestScenario::get(titled(NAME, "is_template defaults to false"), source.clone())
            .field("is_template", FieldPredicate::Equals(json!(false))),
    ));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "save profile as template keeps its data"),
        save_as_template,
    )));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "template list contains only templates"),
        list_templates,
    )));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "create profile from template"),
        create_from_template,
    )));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "regular profile list excludes templates"),
        regular_list_excludes_templates,
    )));
    list.push(Box::new(
        RequestScenario::post_empty(
            titled(NAME, "duplicate profile"),
            format!("{PROFILES}/{{{COPY_ID}}}/duplicate"),
        )
        .expect(&[200, 201])
        .field("is_template", FieldPredicate::Equals(json!(false)))
        .field("groom_name", FieldPredicate::eq_str("Arjun Sharma"))
        .field("slug", FieldPredicate::NonEmpty)
        .track_as(ResourceKind::Profile),
    ));

    // 에지 케이스
    list.push(Box::new(
        RequestScenario::post_empty(
            titled(NAME, "save-as-template on unknown profile returns 404"),
            format!("{PROFILES}/{UNKNOWN_ID}/save-as-template"),
        )
        .expect(&[404]),
    ));
    list.push(Box::new(
        RequestScenario::post_empty(
            titled(NAME, "create from unknown template returns 404"),
            format!("{PROFILES}/from-template/{UNKNOWN_ID}"),
        )
        .expect(&[404])
        .track_as(ResourceKind::Profile),
    ));
    list.push(Box::new(
        RequestScenario::post_empty(
            titled(NAME, "create from non-template profile returns 404"),
            format!("{PROFILES}/from-template/{{{COPY_ID}}}"),
        )
        .expect(&[404])
        .track_as(ResourceKind::Profile),
    ));
    list.push(Box::new(
        RequestScenario::post_empty(
            titled(NAME, "duplicate unknown profile returns 404"),
            format!("{PROFILES}/{UNKNOWN_ID}/duplicate"),
        )
        .expect(&[404]),
    ));
    list.push(Box::new(
        RequestScenario::post_empty(
            titled(NAME, "unauthenticated save-as-template is rejected"),
            format!("{PROFILES}/{{{SOURCE_ID}}}/save-as-template"),
        )
        .anonymous()
        .expect_configured(ExpectedStatus::Unauthenticated),
    ));

    list.push(Box::new(
        RequestScenario::get(titled(NAME, "template unchanged after use"), source)
            .field("is_template", FieldPredicate::Equals(json!(true)))
            .field("groom_name", FieldPredicate::eq_str("Arjun Sharma"))
            .field("bride_name", FieldPredicate::eq_str("Priya Patel"))
            .field("venue", FieldPredicate::eq_str("Grand Palace Banquet Hall")),
    ));

    list
}

fn save_as_template(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let id = ctx.recall_str(SOURCE_ID)?;
        let saved = steps::post_empty(ctx, &format!("{PROFILES}/{id}/save-as-template")).await?;
        ctx.tracker_mut().retag(&id, ResourceKind::Template);

        ctx.expect_field(&saved, "is_template", FieldPredicate::Equals(json!(true)));
        ctx.expect_field(&saved, "id", FieldPredicate::eq_str(&id));
        ctx.expect_field(&saved, "groom_name", FieldPredicate::eq_str("Arjun Sharma"));
        ctx.expect_field(&saved, "bride_name", FieldPredicate::eq_str("Priya Patel"));
        ctx.expect_field(&saved, "venue", FieldPredicate::eq_str("Grand Palace Banquet Hall"));
        Ok(())
    })
}

fn list_templates(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let id = ctx.recall_str(SOURCE_ID)?;
        let templates = steps::fetch(ctx, "/admin/templates").await?;
        let Some(items) = templates.as_array() else {
            return Err(AssertionFailure::WrongType {
                field: "templates".to_owned(),
                expected: "array".to_owned(),
                actual: templates.to_string(),
            }
            .into());
        };

        let ours = steps::find_by_id(ctx, &templates, &id)?.clone();
        for field in TEMPLATE_FIELDS {
            ctx.expect_field(&ours, field, FieldPredicate::Present);
        }

        let non_templates = items
            .iter()
            .filter(|t| t.get("is_template") != Some(&json!(true)))
            .count();
        ctx.expect_that(
            "only templates listed",
            non_templates == 0,
            format!("{non_templates} entries without is_template=true"),
        );

        // 정렬은 경고만 남긴다
        match fixtures::is_newest_first(items, "created_at") {
            Ok(true) => {}
            Ok(false) => warn!("templates are not sorted newest first"),
            Err(raw) => warn!(created_at = %raw, "unparsable template created_at"),
        }
        Ok(())
    })
}

fn create_from_template(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let template_id = ctx.recall_str(SOURCE_ID)?;
        let created =
            steps::post_empty(ctx, &format!("{PROFILES}/from-template/{template_id}")).await?;
        let copy_id = ctx.require_str(&created, "id")?;
        ctx.track(ResourceKind::Profile, copy_id.clone());
        ctx.remember(COPY_ID, copy_id.clone());

        let template = steps::fetch(ctx, &format!("{PROFILES}/{template_id}")).await?;

        ctx.expect_field(&created, "id", FieldPredicate::NotEquals(json!(template_id)));
        ctx.expect_field(
            &created,
            "slug",
            FieldPredicate::NotEquals(template.get("slug").cloned().unwrap_or(Value::Null)),
        );
        ctx.expect_field(&created, "is_template", FieldPredicate::Equals(json!(false)));
        steps::expect_same_fields(ctx, &created, &template, &COPIED_FIELDS);

        let events = |v: &Value| v.get("events").and_then(Value::as_array).map(Vec::len);
        ctx.expect_that(
            "events copied",
            events(&created).is_some() && events(&created) == events(&template),
            format!("{:?} events vs {:?}", events(&created), events(&template)),
        );

        let stamp = |v: &Value| {
            v.get("created_at")
                .and_then(Value::as_str)
                .and_then(fixtures::parse_timestamp)
        };
        let (fresh, original) = (stamp(&created), stamp(&template));
        ctx.expect_that(
            "created_at newer than template",
            matches!((fresh, original), (Some(f), Some(o)) if f > o),
            format!("{fresh:?} vs {original:?}"),
        );
        Ok(())
    })
}

fn regular_list_excludes_templates(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let template_id = ctx.recall_str(SOURCE_ID)?;
        let profiles = steps::fetch(ctx, PROFILES).await?;
        let listed = fixtures::ids(&profiles);

        ctx.expect_that(
            "template absent from profile list",
            !listed.contains(&template_id.as_str()),
            "template listed as regular profile",
        );
        if ctx.has_var(COPY_ID) {
            let copy_id = ctx.recall_str(COPY_ID)?;
            ctx.expect_that(
                "profile created from template is listed",
                listed.contains(&copy_id.as_str()),
                "copy missing from profile list",
            );
        }
        let flagged = profiles
            .as_array()
            .map_or(0, |items| {
                items
                    .iter()
                    .filter(|p| p.get("is_template") == Some(&json!(true)))
                    .count()
            });
        ctx.expect_that(
            "no template in regular list",
            flagged == 0,
            format!("{flagged} templates listed"),
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use invitecheck_core::scenario::DynScenario;

    #[test]
    fn source_is_created_first_and_checked_last() {
        let list = scenarios();
        assert_eq!(list[0].name(), "templates: create template source profile");
        assert_eq!(
            list.last().map(|s| s.name()),
            Some("templates: template unchanged after use")
        );
    }
}
