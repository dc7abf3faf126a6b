//! Unified error handling for the identity use cases.
//!
//! Provides a single error type that callers receive from every use case,
//! convertible to an Axum HTTP response. Internal details (storage text,
//! hashing or signing diagnostics) are logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{0}")]
    Validation(String),

    // Authentication & Authorization
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Exhausted: {0}")]
    Exhausted(String),

    // External collaborator errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[cfg(feature = "jwt")]
    #[error("Token error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Exhausted(_) => "EXHAUSTED",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::TokenIssuance(_) => "TOKEN_ISSUANCE_ERROR",
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "UNAUTHORIZED",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Exhausted(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TokenIssuance(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::Exhausted(_) => "Unable to generate a unique value".to_string(),

            // Hide details for internal/security errors
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {}", msg);
                "A storage error occurred".to_string()
            }
            AppError::TokenIssuance(msg) => {
                tracing::error!("Token issuance error: {}", msg);
                "Unable to issue session tokens".to_string()
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Timeout(op) => {
                tracing::error!("Timed out during {}", op);
                "The request timed out".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Authentication => AppError::InvalidCredentials,
            DomainError::Authorization(msg) => AppError::Forbidden(msg),
            DomainError::NotFound(_) => AppError::NotFound,
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Persistence(msg) => AppError::Persistence(msg),
            DomainError::Exhausted(msg) => AppError::Exhausted(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn token_issuance(msg: impl Into<String>) -> Self {
        AppError::TokenIssuance(msg.into())
    }

    pub fn timeout(op: impl Into<String>) -> Self {
        AppError::Timeout(op.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_taxonomy() {
        assert!(matches!(
            AppError::from(DomainError::validation("bad")),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::Authentication),
            AppError::InvalidCredentials
        ));
        assert!(matches!(
            AppError::from(DomainError::authorization("no")),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::conflict("email is already registered")),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::Exhausted("x".into())),
            AppError::Exhausted(_)
        ));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Persistence("duplicate key value violates constraint".into());
        assert_eq!(err.user_message(), "A storage error occurred");
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::TokenIssuance("InvalidKeyFormat".into());
        assert!(!err.user_message().contains("InvalidKeyFormat"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = AppError::conflict("email is already registered");
        assert_eq!(err.user_message(), "email is already registered");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidCredentials.user_message(), "Invalid credentials");
    }
}
