//! Maps core failure kinds to HTTP responses with JSON error bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use messdesk_core::Error as CoreError;

pub enum ApiError {
    Core(CoreError),
    /// Missing or bad credentials at the auth boundary.
    Unauthorized(String),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Core(CoreError::Internal(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Core(CoreError::Validation(m)) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Core(CoreError::NotFound(m)) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::Core(CoreError::Authorization(m)) => (StatusCode::FORBIDDEN, m.clone()),
            ApiError::Core(CoreError::Conflict(m)) => (StatusCode::CONFLICT, m.clone()),
            ApiError::Core(e @ CoreError::Internal(source)) => {
                error!("internal error: {:#}", source);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
