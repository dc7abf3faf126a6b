//! Collaborator interfaces the use cases depend on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::AppResult;
use domain::{DomainEvent, Email};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Which secret signed a token and what it may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
    pub typ: TokenKind,
    pub jti: Uuid,
}

/// Mints and validates signed session credentials.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn generate_access_token(&self, user_id: Uuid) -> AppResult<String>;

    async fn generate_refresh_token(&self, user_id: Uuid) -> AppResult<String>;

    /// Validate an access token and return its claims.
    fn validate_token(&self, token: &str) -> AppResult<TokenClaims>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<String>;

    /// Access-token lifetime in seconds.
    fn access_token_expiry_seconds(&self) -> i64;
}

/// Receives drained domain events.
///
/// Callers treat failures as best-effort: they are logged, never surfaced.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, events: &[DomainEvent]) -> AppResult<()>;
}

/// Outbound account e-mail.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_welcome_email(&self, to: &Email, first_name: &str) -> AppResult<()>;

    async fn send_email_verification(&self, to: &Email, token: &str) -> AppResult<()>;

    async fn send_password_reset_email(&self, to: &Email, token: &str) -> AppResult<()>;
}
