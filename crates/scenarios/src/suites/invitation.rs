//! `event-invitations` -- 이벤트 초대장 CRUD, 신 규칙, 공개 뷰, 활성화 토글

use invitecheck_core::error::ScenarioError;
use invitecheck_core::expect::FieldPredicate;
use invitecheck_core::request::{ExpectedStatus, RequestScenario};
use invitecheck_core::scenario::{BoxFuture, FnScenario, ScenarioContext, ScenarioResult};
use invitecheck_core::tracker::ResourceKind;
use serde_json::{Value, json};

use super::{ScenarioList, titled};
use crate::fixtures::{self, DEITIES, EVENT_TYPES, PROFILES, UNKNOWN_ID};
use crate::steps;

pub const NAME: &str = "event-invitations";

const PROFILE_ID: &str = "event-invitations.profile_id";
const PROFILE_SLUG: &str = "event-invitations.slug";
const MARRIAGE_ID: &str = "event-invitations.marriage_id";
const HALDI_ID: &str = "event-invitations.haldi_id";

const INVITATIONS: &str = "/admin/event-invitations";

const MARRIAGE_DEITY: &str = DEITIES[0];
const UPDATED_DESIGN: &str = "floral_soft";

pub fn scenarios() -> ScenarioList {
    let mut list: ScenarioList = Vec::new();
    let collection = format!("{PROFILES}/{{{PROFILE_ID}}}/event-invitations");
    let marriage = format!("{INVITATIONS}/{{{MARRIAGE_ID}}}");
    let haldi = format!("{INVITATIONS}/{{{HALDI_ID}}}");

    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, "create host profile"),
            PROFILES,
            fixtures::profile("Invitation Groom", "Invitation Bride"),
        )
        .expect(&[200, 201])
        .capture("id", PROFILE_ID)
        .capture("slug", PROFILE_SLUG)
        .track_as(ResourceKind::Profile),
    ));

    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, "create marriage invitation keeps deity"),
            collection.clone(),
            json!({
                "event_type": "marriage",
                "design_id": "royal_classic",
                "deity_id": MARRIAGE_DEITY,
                "enabled": true,
            }),
        )
        .expect(&[200, 201])
        .field("event_type", FieldPredicate::eq_str("marriage"))
        .field("deity_id", FieldPredicate::eq_str(MARRIAGE_DEITY))
        .field("invitation_link", FieldPredicate::NonEmpty)
        .capture("id", MARRIAGE_ID)
        .track_as(ResourceKind::Invitation),
    ));

    for (event_type, var) in [("haldi", Some(HALDI_ID)), ("mehendi", None)] {
        let mut scenario = RequestScenario::post(
            titled(NAME, &format!("{event_type} invitation drops deity")),
            collection.clone(),
            json!({
                "event_type": event_type,
                "design_id": "floral_soft",
                "deity_id": MARRIAGE_DEITY,
                "enabled": true,
            }),
        )
        .expect(&[200, 201])
        .field("event_type", FieldPredicate::eq_str(event_type))
        .field("deity_id", FieldPredicate::IsNull)
        .track_as(ResourceKind::Invitation);
        if let Some(var) = var {
            scenario = scenario.capture("id", var);
        }
        list.push(Box::new(scenario));
    }

    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, "duplicate event_type returns 400"),
            collection.clone(),
            json!({ "event_type": "marriage", "deity_id": MARRIAGE_DEITY }),
        )
        .expect(&[400])
        .track_as(ResourceKind::Invitation),
    ));
    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, "invalid event_type returns 422"),
            collection.clone(),
            json!({ "event_type": "birthday" }),
        )
        .expect(&[422])
        .track_as(ResourceKind::Invitation),
    ));
    list.push(Box::new(
        RequestScenario::post(
            titled(NAME, "invalid deity returns 422"),
            collection.clone(),
            json!({ "event_type": "reception", "deity_id": "zeus" }),
        )
        .expect(&[422])
        .track_as(ResourceKind::Invitation),
    ));

    list.push(Box::new(FnScenario::new(
        titled(NAME, "list invitations of profile"),
        list_invitations,
    )));
    list.push(Box::new(
        RequestScenario::get(titled(NAME, "get invitation by id"), marriage.clone())
            .field("event_type", FieldPredicate::eq_str("marriage"))
            .field("deity_id", FieldPredicate::eq_str(MARRIAGE_DEITY)),
    ));
    list.push(Box::new(
        RequestScenario::put(
            titled(NAME, "update invitation design"),
            marriage,
            json!({ "design_id": UPDATED_DESIGN }),
        )
        .field("design_id", FieldPredicate::eq_str(UPDATED_DESIGN))
        .field("deity_id", FieldPredicate::eq_str(MARRIAGE_DEITY)),
    ));
    list.push(Box::new(
        RequestScenario::get(
            titled(NAME, "public event view matches invitation"),
            format!("/invite/{{{PROFILE_SLUG}}}/marriage"),
        )
        .anonymous()
        .field("event_type", FieldPredicate::eq_str("marriage"))
        .field("design_id", FieldPredicate::eq_str(UPDATED_DESIGN))
        .field("deity_id", FieldPredicate::eq_str(MARRIAGE_DEITY)),
    ));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "disabled invitation is hidden from public"),
        disable_hides_public_view,
    )));
    list.push(Box::new(FnScenario::new(
        titled(NAME, "re-enabled invitation is public again"),
        enable_restores_public_view,
    )));

    list.push(Box::new(
        RequestScenario::delete(titled(NAME, "delete invitation"), haldi.clone())
            .expect(&[200, 204])
            .untrack_var(ResourceKind::Invitation, HALDI_ID),
    ));
    list.push(Box::new(
        RequestScenario::get(titled(NAME, "deleted invitation is gone"), haldi)
            .expect_configured(ExpectedStatus::MissingInvitation),
    ));
    list.push(Box::new(
        RequestScenario::get(
            titled(NAME, "unknown invitation id"),
            format!("{INVITATIONS}/{UNKNOWN_ID}"),
        )
        .expect_configured(ExpectedStatus::MissingInvitation),
    ));

    list
}

fn list_invitations(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let profile_id = ctx.recall_str(PROFILE_ID)?;
        let marriage_id = ctx.recall_str(MARRIAGE_ID)?;
        let path = format!("{PROFILES}/{profile_id}/event-invitations");
        let list = steps::fetch(ctx, &path).await?;
        let items = list.as_array().map(Vec::as_slice).unwrap_or_default();

        let kinds: Vec<&str> = items
            .iter()
            .filter_map(|i| i.get("event_type").and_then(Value::as_str))
            .collect();
        for kind in ["marriage", "haldi", "mehendi"] {
            ctx.expect_that(
                &format!("{kind} listed"),
                kinds.contains(&kind),
                format!("listed event types: {kinds:?}"),
            );
        }
        ctx.expect_that(
            "event types supported",
            kinds.len() == items.len() && kinds.iter().all(|k| EVENT_TYPES.contains(k)),
            format!("listed event types: {kinds:?}"),
        );

        let deities: Vec<&Value> = items.iter().filter_map(|i| i.get("deity_id")).collect();
        ctx.expect_that(
            "deities supported or null",
            deities
                .iter()
                .all(|d| d.is_null() || d.as_str().is_some_and(|d| DEITIES.contains(&d))),
            format!("listed deities: {deities:?}"),
        );
        steps::find_by_id(ctx, &list, &marriage_id)?;
        Ok(())
    })
}

/// 공개 뷰 경로와 관리자 경로
fn paths(ctx: &ScenarioContext) -> Result<(String, String), ScenarioError> {
    let slug = ctx.recall_str(PROFILE_SLUG)?;
    let id = ctx.recall_str(MARRIAGE_ID)?;
    Ok((format!("/invite/{slug}/marriage"), format!("{INVITATIONS}/{id}")))
}

fn disable_hides_public_view(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let (public, admin) = paths(ctx)?;
        let response = ctx.client().put(&admin, &json!({ "enabled": false })).await?;
        ctx.require_status(&response, &[200], "PUT", &admin)?;
        ctx.expect_field(&response.body, "enabled", FieldPredicate::Equals(json!(false)));

        let response = ctx.anonymous().get(&public).await?;
        ctx.expect_status(&response, &[404]);
        Ok(())
    })
}

fn enable_restores_public_view(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let (public, admin) = paths(ctx)?;
        let response = ctx.client().put(&admin, &json!({ "enabled": true })).await?;
        ctx.require_status(&response, &[200], "PUT", &admin)?;

        let view = steps::fetch_public(ctx, &public).await?;
        ctx.expect_field(&view, "design_id", FieldPredicate::eq_str(UPDATED_DESIGN));
        ctx.expect_field(&view, "deity_id", FieldPredicate::eq_str(MARRIAGE_DEITY));
        Ok(())
    })
}
