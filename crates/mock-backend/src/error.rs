//! 에러 응답 -- `{"detail": ...}` 형식

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 핸들러 에러
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{field}: {msg}")]
    Validation { field: String, msg: String },

    #[error("injected failure")]
    Injected,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(field: &str, msg: &str) -> Self {
        Self::Validation {
            field: field.to_owned(),
            msg: msg.to_owned(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Injected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Validation { field, msg } => json!({
                "detail": [{ "loc": ["body", field], "msg": msg, "type": "value_error" }]
            }),
            other => json!({ "detail": other.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}
