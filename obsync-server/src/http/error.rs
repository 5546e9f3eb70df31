//! API error type with IntoResponse
//!
//! Errors are converted to `{"status": "error", "message": ...}` with the
//! matching status code. Server-side failures are logged and answered with a
//! generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use obsync_core::path_grammar::ATTACHMENT_PATH_PATTERN;
use obsync_core::SyncError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Attachment path outside the grammar (400)
    InvalidAttachmentPath { path: String },

    /// Required field missing or blank (400)
    MissingField { field: String },

    /// Any other rejected request, e.g. update of an unknown post (400)
    BadRequest { message: String },

    /// Request body could not be parsed (status from the extractor)
    Rejected { status: StatusCode, message: String },

    /// Internal error (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidAttachmentPath { path } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Attachment path invalid: {}. Must be {} (lowercase only)",
                    path, ATTACHMENT_PATH_PATTERN
                ),
            ),
            Self::MissingField { field } => (
                StatusCode::BAD_REQUEST,
                format!("Missing required frontmatter field: {}", field),
            ),
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::Rejected { status, message } => (status, message),
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "status": "error",
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::InvalidAttachmentPath { path } => Self::InvalidAttachmentPath { path },
            SyncError::MissingRequiredField { field } => Self::MissingField { field },
            SyncError::PostNotFound { .. } => Self::BadRequest {
                message: e.to_string(),
            },
            SyncError::FileOperation { .. } | SyncError::Io { .. } | SyncError::Config { .. } => {
                Self::Internal {
                    message: e.to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn invalid_attachment_path_is_400_with_pattern() {
        let err = ApiError::from(SyncError::invalid_attachment_path("bad/path.png"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("bad/path.png"));
        assert!(message.contains("media/{ext}/{postId}/{postId}-{13digit}.{ext}"));
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn missing_field_is_400() {
        let response = ApiError::from(SyncError::missing_field("title")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_post_on_update_is_400() {
        let response = ApiError::from(SyncError::post_not_found("p1")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "No article found for postId: p1");
    }

    #[tokio::test]
    async fn file_errors_are_500_without_details() {
        let response =
            ApiError::from(SyncError::file_operation("p1", "/secret/path denied")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal server error");
    }
}
