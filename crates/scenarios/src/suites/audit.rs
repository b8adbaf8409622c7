//! `audit-logs` -- 관리 작업이 감사 로그에 남는지 확인

use invitecheck_core::error::{AssertionFailure, ScenarioError};
use invitecheck_core::expect::FieldPredicate;
use invitecheck_core::request::{ExpectedStatus, RequestScenario};
use invitecheck_core::scenario::{BoxFuture, FnScenario, ScenarioContext, ScenarioResult};
use invitecheck_core::tracker::ResourceKind;
use serde_json::{Value, json};

use super::{ScenarioList, titled};
use crate::fixtures::{self, AUDIT_FIELDS, PROFILES};
use crate::steps;

pub const NAME: &str = "audit-logs";

const PROFILE_ID: &str = "audit-logs.profile_id";
const PROFILE_SLUG: &str = "audit-logs.slug";

const AUDIT_LOGS: &str = "/admin/audit-logs";

pub fn scenarios() -> ScenarioList {
    let mut list: ScenarioList = Vec::new();
    list.push(Box::new(
        RequestScenario::get(titled(NAME, "unauthenticated request is rejected"), AUDIT_LOGS)
            .anonymous()
            .expect_configured(ExpectedStatus::Unauthenticated),
    ));

    let flow: [(&str, StepFn); 4] = [
        ("profile creation is logged", creation_is_logged),
        ("profile update is logged", update_is_logged),
        ("profile deletion is logged", deletion_is_logged),
        ("entries are newest first", entries_newest_first),
    ];
    for (name, step) in flow {
        list.push(Box::new(FnScenario::new(titled(NAME, name), step)));
    }
    list
}

type StepFn = for<'a> fn(&'a mut ScenarioContext) -> BoxFuture<'a, ScenarioResult>;

/// 프로필에 대한 `action` 항목을 찾아 형태를 검사합니다.
///
/// 액션 이름은 부분 일치로 찾습니다 (`create` → `profile_created`).
async fn expect_entry(ctx: &mut ScenarioContext, action: &str) -> ScenarioResult {
    let id = ctx.recall_str(PROFILE_ID)?;
    let slug = ctx.recall_str(PROFILE_SLUG)?;
    let logs = steps::fetch(ctx, AUDIT_LOGS).await?;

    let entry = logs
        .as_array()
        .and_then(|items| {
            items.iter().find(|e| {
                e.get("profile_id").and_then(Value::as_str) == Some(id.as_str())
                    && e.get("action")
                        .and_then(Value::as_str)
                        .is_some_and(|a| a.contains(action))
            })
        })
        .cloned();
    ctx.expect_that(
        &format!("{action} entry logged"),
        entry.is_some(),
        format!("no '{action}' entry for profile {id}"),
    );
    let entry = entry.ok_or_else(|| -> ScenarioError {
        AssertionFailure::Custom(format!("no '{action}' audit entry for {id}")).into()
    })?;

    for field in AUDIT_FIELDS {
        ctx.expect_field(&entry, field, FieldPredicate::Present);
    }
    ctx.expect_field(&entry, "profile_slug", FieldPredicate::eq_str(&slug));
    Ok(())
}

fn creation_is_logged(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let created =
            steps::create_profile(ctx, &fixtures::profile("Audit Groom", "Audit Bride")).await?;
        let id = ctx.require_str(&created, "id")?;
        let slug = ctx.require_str(&created, "slug")?;
        ctx.remember(PROFILE_ID, id);
        ctx.remember(PROFILE_SLUG, slug);
        expect_entry(ctx, "create").await
    })
}

fn update_is_logged(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let id = ctx.recall_str(PROFILE_ID)?;
        let path = format!("{PROFILES}/{id}");
        let response = ctx.client().put(&path, &json!({ "venue": "Audit Hall" })).await?;
        ctx.require_status(&response, &[200], "PUT", &path)?;
        expect_entry(ctx, "update").await
    })
}

fn deletion_is_logged(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let id = ctx.recall_str(PROFILE_ID)?;
        let path = format!("{PROFILES}/{id}");
        let response = ctx.client().delete(&path).await?;
        ctx.require_status(&response, &[200, 204], "DELETE", &path)?;
        ctx.tracker_mut().untrack(ResourceKind::Profile, &id);
        expect_entry(ctx, "delete").await
    })
}

fn entries_newest_first(ctx: &mut ScenarioContext) -> BoxFuture<'_, ScenarioResult> {
    Box::pin(async move {
        let logs = steps::fetch(ctx, AUDIT_LOGS).await?;
        let items = logs.as_array().map(Vec::as_slice).unwrap_or_default();
        ctx.expect_that("audit log is not empty", !items.is_empty(), "no entries");
        match fixtures::is_newest_first(items, "timestamp") {
            Ok(sorted) => {
                ctx.expect_that("sorted newest first", sorted, "timestamps out of order");
            }
            Err(raw) => {
                ctx.expect_that(
                    "timestamps parse",
                    false,
                    format!("unparsable timestamp {raw:?}"),
                );
            }
        }
        Ok(())
    })
}
