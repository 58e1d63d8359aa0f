// ============================================================================
// Preview API - Error Mapping
// File: crates/preview-api/src/error.rs
// ============================================================================

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use preview_core::DomainError;

const NOT_FOUND_PAGE: &str = include_str!("../templates/not_found.html");

#[derive(Error, Debug)]
pub enum ApiError {
    /// Rendered as the 404 page. Covers denied access too.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                return (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response();
            }
            ApiError::StoreUnavailable(msg) => {
                tracing::error!("Session store unavailable: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "StoreUnavailable", msg)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::StoreUnavailable(msg) => ApiError::StoreUnavailable(msg),
            DomainError::SlotNotFound(id) => ApiError::NotFound(id),
            DomainError::InvalidSlotId(id) => ApiError::NotFound(id),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<handlebars::RenderError> for ApiError {
    fn from(e: handlebars::RenderError) -> Self {
        ApiError::InternalError(format!("template rendering failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        let store = ApiError::from(DomainError::StoreUnavailable("down".into()));
        assert_eq!(store.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = ApiError::from(DomainError::SlotNotFound("x.png".into()));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let bad_id = ApiError::from(DomainError::InvalidSlotId("../x".into()));
        assert_eq!(bad_id.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_error_is_json() {
        let response = ApiError::InternalError("disk full".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "InternalError");
        assert_eq!(json["message"], "disk full");
    }
}
