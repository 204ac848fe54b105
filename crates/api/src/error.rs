use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use presenca_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `presenca_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a domain error to an HTTP status, error code, and message.
///
/// Business-rule rejections are 409 so the client can surface them and let
/// the user retry with different input.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::DuplicateCheckin { .. } => {
            (StatusCode::CONFLICT, "DUPLICATE_CHECKIN", err.to_string())
        }
        CoreError::CapacityExceeded { .. } => {
            (StatusCode::CONFLICT, "CAPACITY_EXCEEDED", err.to_string())
        }
        CoreError::StatusConflict { .. } => {
            (StatusCode::CONFLICT, "STATUS_CONFLICT", err.to_string())
        }
        CoreError::InvalidTransition(_) => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
        }
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Store(msg) => {
            tracing::error!(error = %msg, "Store error");
            internal_error()
        }
    }
}
