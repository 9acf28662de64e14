//! API error types with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::session::{SessionError, TransitionError};
use crate::store::StoreError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session required")]
    SessionRequired,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Already registered: {field}")]
    AlreadyRegistered { field: String },
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("Transition rejected: {0}")]
    TransitionRejected(TransitionError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = Vec::new();
        let (status, code, message) = match self {
            ApiError::SessionRequired => (
                StatusCode::UNAUTHORIZED,
                "SESSION_REQUIRED",
                "Start a session first".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                crate::session::INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            ApiError::Forbidden(detail) => (StatusCode::FORBIDDEN, "FORBIDDEN", detail),
            ApiError::AlreadyRegistered { field } => (
                StatusCode::CONFLICT,
                "ALREADY_REGISTERED",
                format!("This {field} is already registered"),
            ),
            ApiError::Validation(messages) => {
                details = messages;
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_FAILED",
                    "Please correct the highlighted fields".to_string(),
                )
            }
            ApiError::TransitionRejected(err) => {
                (StatusCode::CONFLICT, "TRANSITION_REJECTED", err.to_string())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Unavailable(detail) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", detail)
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyRegistered { field } => ApiError::AlreadyRegistered { field },
            StoreError::Validation(messages) => ApiError::Validation(messages),
            StoreError::PatientNotFound(id) => ApiError::NotFound(format!("patient {id}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        ApiError::TransitionRejected(err)
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Transition(e) => e.into(),
            SessionError::Store(e) => e.into(),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn session_required_returns_401() {
        let (status, json) = body_json(ApiError::SessionRequired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "SESSION_REQUIRED");
    }

    #[tokio::test]
    async fn validation_lists_every_message() {
        let (status, json) = body_json(ApiError::Validation(vec![
            "Phone number must be exactly 10 digits".into(),
            "Working days must be between 1 and 7".into(),
        ]))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let (status, json) = body_json(ApiError::Internal("disk I/O error at page 7".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "An internal error occurred");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn duplicate_maps_to_conflict() {
        let err: ApiError = StoreError::AlreadyRegistered { field: "email".into() }.into();
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "ALREADY_REGISTERED");
        assert_eq!(json["error"]["message"], "This email is already registered");
    }

    #[tokio::test]
    async fn transition_maps_to_rejected() {
        let err: ApiError = TransitionError::RoleRequired.into();
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "TRANSITION_REJECTED");
    }

    #[test]
    fn missing_patient_maps_to_not_found() {
        let err: ApiError = StoreError::PatientNotFound(4).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn session_limit_maps_to_unavailable() {
        let (status, json) = body_json(ApiError::Unavailable("Too many active sessions".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "UNAVAILABLE");
    }
}
