//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::domain::{DomainError, PeriodError};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("{0}")]
    Validation(String),

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("{}", .0.public_message())]
    Unauthenticated(#[from] AuthError),

    #[error("Access denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Period(#[from] PeriodError),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Wrap a storage failure with the operation that failed.
    ///
    /// ```ignore
    /// repo.find(id).await.map_err(AppError::storage("Failed to get goal"))?;
    /// ```
    pub fn storage(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Storage { context, source }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::Period(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request", None)
            }
            AppError::InvalidBody(reason) => {
                (StatusCode::BAD_REQUEST, "invalid_body", Some(reason.clone()))
            }

            // 401 Unauthorized
            AppError::Unauthenticated(auth_err) => {
                tracing::debug!(error = %auth_err, "Authentication failed");
                (StatusCode::UNAUTHORIZED, "unauthenticated", auth_err.details())
            }

            // 403 Forbidden
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),

            // 404 Not Found
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::InvalidAmount(err) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(err.to_string()))
                }
                DomainError::InvalidDateRange(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_date_range", Some(msg.clone()))
                }
                DomainError::BusinessRuleViolation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "business_rule_violation",
                    Some(msg.clone()),
                ),
            },

            // 500 Internal Server Error
            AppError::Storage { context, source } => {
                tracing::error!(error = ?source, "{}", context);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    Some(source.to_string()),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AmountError;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let (status, body) = render(AppError::NotFound("Goal")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Goal not found");
        assert_eq!(body["error_code"], "not_found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_forbidden_message() {
        let (status, body) = render(AppError::Forbidden).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Access denied");
    }

    #[tokio::test]
    async fn test_period_error_is_bad_request() {
        let (status, body) = render(PeriodError::InvalidMonth.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid month parameter. Must be between 1 and 12"
        );
    }

    #[tokio::test]
    async fn test_auth_error_details() {
        let (status, body) = render(AuthError::MissingKeyId.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
        assert_eq!(body["details"], "token header has no key id");
    }

    #[tokio::test]
    async fn test_storage_error_keeps_context() {
        let err = AppError::storage("Failed to get goal")(sqlx::Error::RowNotFound);
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to get goal");
        assert_eq!(body["error_code"], "database_error");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_domain_amount_error() {
        let err: AppError = DomainError::from(AmountError::Zero).into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_amount");
        assert_eq!(body["details"], "Amount cannot be zero");

        let err: AppError = DomainError::rule("nope").into();
        assert_eq!(render(err).await.0, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
