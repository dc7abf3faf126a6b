//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, database, tokens).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input; the caller can correct it and retry
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad credentials. The message never says which part was wrong.
    #[error("invalid credentials")]
    Authentication,

    /// Valid identity, insufficient right (e.g. wrong current password)
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness collision
    #[error("{0}")]
    Conflict(String),

    /// Repository failure other than not-found or conflict
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A bounded search ran out of candidates
    #[error("Exhausted: {0}")]
    Exhausted(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create an authorization error
    pub fn authorization(msg: impl Into<String>) -> Self {
        DomainError::Authorization(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        DomainError::Persistence(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }

    /// True for repository misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
