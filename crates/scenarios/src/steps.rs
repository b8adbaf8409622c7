//! 여러 시나리오가 공유하는 요청 단계

use invitecheck_core::error::{AssertionFailure, ScenarioError};
use invitecheck_core::scenario::ScenarioContext;
use invitecheck_core::tracker::ResourceKind;
use serde_json::Value;

use crate::fixtures::PROFILES;

/// 프로필을 만들고 정리 대상으로 기록합니다.
pub async fn create_profile(
    ctx: &mut ScenarioContext,
    body: &Value,
) -> Result<Value, ScenarioError> {
    let response = ctx.client().post(PROFILES, body).await?;
    ctx.require_status(&response, &[200, 201], "POST", PROFILES)?;
    let id = ctx.require_str(&response.body, "id")?;
    ctx.track(ResourceKind::Profile, id);
    Ok(response.body)
}

/// 인증된 GET. 200이 아니면 중단합니다.
pub async fn fetch(ctx: &mut ScenarioContext, path: &str) -> Result<Value, ScenarioError> {
    let response = ctx.client().get(path).await?;
    ctx.require_status(&response, &[200], "GET", path)?;
    Ok(response.body)
}

/// 토큰 없는 GET. 200이 아니면 중단합니다.
pub async fn fetch_public(ctx: &mut ScenarioContext, path: &str) -> Result<Value, ScenarioError> {
    let response = ctx.anonymous().get(path).await?;
    ctx.require_status(&response, &[200], "GET", path)?;
    Ok(response.body)
}

/// 본문 없는 POST. 200이 아니면 중단합니다.
pub async fn post_empty(ctx: &mut ScenarioContext, path: &str) -> Result<Value, ScenarioError> {
    let response = ctx.client().post_empty(path).await?;
    ctx.require_status(&response, &[200, 201], "POST", path)?;
    Ok(response.body)
}

/// 두 본문의 필드가 같은지 하나씩 검사합니다.
pub fn expect_same_fields(ctx: &mut ScenarioContext, left: &Value, right: &Value, fields: &[&str]) {
    for field in fields {
        let (a, b) = (left.get(*field), right.get(*field));
        ctx.expect_that(
            &format!("{field} copied"),
            a == b,
            format!("{} != {}", show(a), show(b)),
        );
    }
}

/// 목록에서 `id`가 일치하는 항목을 찾습니다. 없으면 중단합니다.
pub fn find_by_id<'a>(
    ctx: &mut ScenarioContext,
    list: &'a Value,
    id: &str,
) -> Result<&'a Value, ScenarioError> {
    let found = list.as_array().and_then(|items| {
        items
            .iter()
            .find(|item| item.get("id").and_then(Value::as_str) == Some(id))
    });
    ctx.expect_that(&format!("list contains {id}"), found.is_some(), "not in list");
    found.ok_or_else(|| AssertionFailure::Custom(format!("{id} not found in list")).into())
}

fn show(value: Option<&Value>) -> String {
    value.map_or_else(|| "<missing>".to_owned(), Value::to_string)
}
