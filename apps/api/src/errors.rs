use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::prediction::RecordError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Access denied: {0}")]
    AuthorizationDenied(String),

    #[error("Invalid sharing token: {0}")]
    TokenInvalid(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Render failure: {0}")]
    RenderFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A stored row that cannot be turned into a record means the report cannot
/// be built, not that the caller did something wrong.
impl From<RecordError> for AppError {
    fn from(e: RecordError) -> Self {
        AppError::RenderFailure(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::IdentityProvider(e.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationDenied(_) | AppError::TokenInvalid(_) => StatusCode::FORBIDDEN,
            AppError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RenderFailure(_)
            | AppError::Database(_)
            | AppError::IdentityProvider(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::AuthenticationRequired => (
                "AUTHENTICATION_REQUIRED",
                "Authentication required".to_string(),
            ),
            AppError::AuthorizationDenied(msg) => {
                tracing::info!("Authorization denied: {msg}");
                (
                    "FORBIDDEN",
                    "You do not have access to this report".to_string(),
                )
            }
            AppError::TokenInvalid(msg) => {
                tracing::info!("Sharing token rejected: {msg}");
                (
                    "TOKEN_INVALID",
                    "The sharing link is invalid or has expired".to_string(),
                )
            }
            AppError::RecordNotFound(id) => ("NOT_FOUND", format!("Result {id} not found")),
            AppError::RenderFailure(msg) => {
                tracing::error!("Render failure: {msg}");
                (
                    "RENDER_FAILURE",
                    "The report could not be generated".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                ("DATABASE_ERROR", "A database error occurred".to_string())
            }
            AppError::IdentityProvider(msg) => {
                tracing::error!("Identity provider error: {msg}");
                (
                    "IDENTITY_PROVIDER_ERROR",
                    "Session could not be verified".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::AuthenticationRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::AuthorizationDenied("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::TokenInvalid("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::RecordNotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::RenderFailure("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_record_error_is_a_render_failure() {
        let err: AppError = RecordError::UnknownKind("multimodal".into()).into();
        assert!(matches!(err, AppError::RenderFailure(_)));
    }

    #[tokio::test]
    async fn test_render_failure_hides_detail() {
        let response = AppError::RenderFailure("printpdf exploded at op 42".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "RENDER_FAILURE");
        assert!(!body["error"]["message"].as_str().unwrap().contains("op 42"));
    }
}
