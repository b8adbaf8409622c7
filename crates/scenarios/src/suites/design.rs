//! `design-system` -- 디자인 기본값, 8종 디자인, 조회 경로별 design_id

use invitecheck_core::expect::FieldPredicate;
use invitecheck_core::request::RequestScenario;
use invitecheck_core::scenario::{BoxFuture, FnScenario, ScenarioContext, ScenarioResult};
use invitecheck_core::tracker::ResourceKind;
use serde_json::json;

use super::{ScenarioList, titled};
use crate::fixtures::{self, DEFAULT_DESIGN, DESIGNS, PROFILES};
use crate::steps;

pub const NAME: &str = "design-system";

const PROFILE_ID: &str = "design-system.id";
const PROFILE_SLUG: &str = "design-system.slug";

/// 수정 후 디자인
const UPDATED_DESIGN: &str = "cinematic_luxury";

pub fn scenarios() -> ScenarioList {
    let mut list: ScenarioList = Vec::new();
    let by_id = format!("{PROFILES}/{{{PROFILE_ID}}}");

    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, &format!("profile without design_id defaults to {DEFAULT_DESIGN}")),
            PROFILES,
            fixtures::profile("Design Default Groom", "Design Default Bride"),
        )
        .expect(&[200, 201])
        .field("design_id", FieldPredicate::eq_str(DEFAULT_DESIGN))
        .capture("id", PROFILE_ID)
        .capture("slug", PROFILE_SLUG)
        .track_as(ResourceKind::Profile),
    ));

    for design in DESIGNS {
        let body = fixtures::with(
            fixtures::profile("Design Groom", "Design Bride"),
            "design_id",
            json!(design),
        );
        list.push(Box::new(
            RequestScenario::post(
                titled(NAME, &format!("create profile with {design}")),
                PROFILES,
                body,
            )
            .expect(&[200, 201])
            .field("design_id", FieldPredicate::eq_str(design))
            .track_as(ResourceKind::Profile),
        ));
    }

    list.push(Box::new(
        RequestScenario::put(
            titled(NAME, &format!("update design to {UPDATED_DESIGN}")),
            by_id.clone(),
            json!({ "design_id": UPDATED_DESIGN }),
        )
        .field("design_id", FieldPredicate::eq_str(UPDATED_DESIGN)),
    ));
    list.push(Box::new(
        RequestScenario::get(titled(NAME, "get by id returns updated design"), by_id)
            .field("design_id", FieldPredicate::eq_str(UPDATED_DESIGN)),
    ));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "profile list carries design_id"),
        list_carries_design,
    )));
    list.push(Box::new(
        RequestScenario::get(
            titled(NAME, "public invitation returns design_id"),
            format!("/invite/{{{PROFILE_SLUG}}}"),
        )
        .anonymous()
        .field("design_id", FieldPredicate::eq_str(UPDATED_DESIGN)),
    ));

    list
}

fn list_carries_design(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let id = ctx.recall_str(PROFILE_ID)?;
        let list = steps::fetch(ctx, PROFILES).await?;
        let every_entry_has_design = list
            .as_array()
            .is_some_and(|items| items.iter().all(|p| p.get("design_id").is_some()));
        ctx.expect_that(
            "every listed profile has design_id",
            every_entry_has_design,
            "design_id missing from list entries",
        );
        let entry = steps::find_by_id(ctx, &list, &id)?.clone();
        ctx.expect_field(&entry, "design_id", FieldPredicate::eq_str(UPDATED_DESIGN));
        Ok(())
    })
}
