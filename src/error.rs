use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::database::StoreError;
use crate::infrastructure::{TokenError, UpstreamError};

/// Handler-level error. The `&'static str` payloads are what the caller sees;
/// anything carried in `source` fields is logged and never sent back.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(&'static str),
    #[error("authentication failed: {0}")]
    Authentication(&'static str),
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error("failed to {action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("failed to issue token: {0}")]
    Token(#[from] TokenError),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl AppError {
    /// Wraps an unexpected store failure, naming what the handler was doing.
    pub fn storage(action: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Storage { action, source }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection);
        AppError::Validation("invalid request")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {}", rejection);
        AppError::Validation("invalid request")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) | AppError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg.to_string())
            }
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            AppError::Storage { action, source } => {
                tracing::error!("Failed to {}: {}", action, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("failed to {action}"),
                )
            }
            AppError::Upstream(err) => {
                tracing::error!("Text generation failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to generate summary".to_string(),
                )
            }
            AppError::Token(err) => {
                tracing::error!("Token signing failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to generate token".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message,
        });

        (status, body).into_response()
    }
}
