//! HTTP error mapping. Every failure body is `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nofake_common::NofakeError;
use serde_json::json;
use thiserror::Error;

/// Message shown for every 500; details only go to the logs.
pub const INTERNAL_MESSAGE: &str = "Error interno del servidor";
pub const INVALID_BODY_MESSAGE: &str = "El cuerpo de la solicitud debe ser JSON válido";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<NofakeError> for ApiError {
    fn from(err: NofakeError) -> Self {
        match err {
            NofakeError::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "http.request.rejected");
        ApiError::BadRequest(INVALID_BODY_MESSAGE.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "http.request.failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = ApiError::from(NofakeError::Validation("El tema es requerido".into()));
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "El tema es requerido"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_errors_hide_details() {
        let err = ApiError::from(NofakeError::Oracle("quota exceeded".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
