//! HTTP 라우트와 핸들러

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ApiError;
use crate::store::Store;

type ApiResult = Result<Json<Value>, ApiError>;

/// 관리자 계정
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

/// 테스트가 조작하는 서버 동작
#[derive(Debug, Default)]
pub struct Knobs {
    pub delay_ms: AtomicU64,
    pub fail_deletes: AtomicBool,
    pub requests: AtomicUsize,
    pub deletes: AtomicUsize,
}

/// 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub admin: Arc<AdminAccount>,
    pub knobs: Arc<Knobs>,
}

impl AppState {
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// bearer 토큰을 확인하고 관리자 id를 반환합니다.
    fn authorize(&self, headers: &HeaderMap) -> Result<String, ApiError> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::NotAuthenticated)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::NotAuthenticated)?;
        if token == self.admin.token {
            Ok(self.admin.id.clone())
        } else {
            Err(ApiError::InvalidCredentials)
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/admin/profiles", get(list_profiles).post(create_profile))
        .route("/admin/profiles/from-template/{id}", post(from_template))
        .route(
            "/admin/profiles/{id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route("/admin/profiles/{id}/duplicate", post(duplicate_profile))
        .route("/admin/profiles/{id}/save-as-template", post(save_as_template))
        .route(
            "/admin/profiles/{id}/event-invitations",
            get(list_invitations).post(create_invitation),
        )
        .route(
            "/admin/event-invitations/{id}",
            get(get_invitation)
                .put(update_invitation)
                .delete(delete_invitation),
        )
        .route("/admin/templates", get(list_templates))
        .route("/admin/audit-logs", get(audit_logs))
        .route("/invite/{slug}", get(public_profile))
        .route("/invite/{slug}/{event_type}", get(public_invitation));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), knobs))
        .with_state(state)
}

/// 요청 수 집계, 지연 주입, 삭제 실패 주입
async fn knobs(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.knobs.requests.fetch_add(1, Ordering::SeqCst);
    debug!(method = %req.method(), path = %req.uri().path(), "mock request");

    if req.method() == Method::DELETE {
        state.knobs.deletes.fetch_add(1, Ordering::SeqCst);
        if state.knobs.fail_deletes.load(Ordering::SeqCst) {
            return ApiError::Injected.into_response();
        }
    }

    let delay = state.knobs.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    next.run(req).await
}

async fn login(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if email != Some(state.admin.email.as_str()) || password != Some(state.admin.password.as_str())
    {
        return Err(ApiError::InvalidCredentials);
    }
    Ok(Json(json!({
        "access_token": state.admin.token,
        "token_type": "bearer",
        "admin": { "id": state.admin.id, "email": state.admin.email },
    })))
}

// ─── 프로필 ──────────────────────────────────────────────────────────

async fn list_profiles(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    state.authorize(&headers)?;
    Ok(Json(state.store().list_profiles()))
}

async fn create_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    let admin_id = state.authorize(&headers)?;
    state.store().create_profile(&admin_id, body).map(Json)
}

async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    state.authorize(&headers)?;
    state.store().get_profile(&id).map(Json)
}

async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    let admin_id = state.authorize(&headers)?;
    state.store().update_profile(&admin_id, &id, body).map(Json)
}

async fn delete_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let admin_id = state.authorize(&headers)?;
    state.store().delete_profile(&admin_id, &id).map(Json)
}

async fn duplicate_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let admin_id = state.authorize(&headers)?;
    state.store().duplicate_profile(&admin_id, &id).map(Json)
}

async fn save_as_template(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    state.authorize(&headers)?;
    state.store().save_as_template(&id).map(Json)
}

async fn from_template(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let admin_id = state.authorize(&headers)?;
    state.store().create_from_template(&admin_id, &id).map(Json)
}

async fn list_templates(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    state.authorize(&headers)?;
    Ok(Json(state.store().list_templates()))
}

// ─── 이벤트 초대장 ───────────────────────────────────────────────────

async fn list_invitations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    state.authorize(&headers)?;
    state.store().list_invitations(&id).map(Json)
}

async fn create_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    state.authorize(&headers)?;
    state.store().create_invitation(&id, body).map(Json)
}

async fn get_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    state.authorize(&headers)?;
    state.store().get_invitation(&id).map(Json)
}

async fn update_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    state.authorize(&headers)?;
    state.store().update_invitation(&id, body).map(Json)
}

async fn delete_invitation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    state.authorize(&headers)?;
    state.store().delete_invitation(&id).map(Json)
}

// ─── 감사 로그 / 공개 ────────────────────────────────────────────────

async fn audit_logs(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    state.authorize(&headers)?;
    Ok(Json(state.store().audit_logs()))
}

async fn public_profile(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult {
    state.store().public_profile(&slug).map(Json)
}

async fn public_invitation(
    State(state): State<AppState>,
    Path((slug, event_type)): Path<(String, String)>,
) -> ApiResult {
    state.store().public_invitation(&slug, &event_type).map(Json)
}
