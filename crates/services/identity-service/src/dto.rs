//! Request and response shapes for the identity use cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::User;

use crate::ports::TOKEN_TYPE_BEARER;

/// Input for account creation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Created account. Never carries the password in any form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl CreateUserResponse {
    pub fn from_user(user: &User) -> AppResult<Self> {
        Ok(Self {
            id: persisted_id(user)?,
            email: user.email().to_string(),
            username: user.username().to_string(),
            first_name: user.profile().first_name.clone(),
            last_name: user.profile().last_name.clone(),
            created_at: user.created_at(),
        })
    }
}

/// Input for login. `identifier` is an email or a username; empty client
/// fields mean unknown.
#[derive(Debug, Clone)]
pub struct AuthenticateUserRequest {
    pub identifier: String,
    pub password: String,
    pub ip_address: String,
    pub user_agent: String,
}

/// Profile fields safe to hand to the owning client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfileView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub locale: String,
    pub timezone: String,
    pub email_verified: bool,
    pub mfa_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserProfileView {
    pub fn from_user(user: &User) -> AppResult<Self> {
        let credentials = user.credentials();
        let profile = user.profile();
        Ok(Self {
            id: persisted_id(user)?,
            email: credentials.email.to_string(),
            username: credentials.username.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            display_name: profile.display_name.clone(),
            gender: profile.gender.as_str().to_string(),
            bio: profile.bio.clone(),
            locale: profile.locale.clone(),
            timezone: profile.timezone.clone(),
            email_verified: credentials.email_verified,
            mfa_enabled: credentials.mfa_enabled,
            last_login_at: credentials.last_login_at,
            created_at: user.created_at(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSettings {
    pub locale: String,
    pub timezone: String,
}

/// What the client needs to render its first screen after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthBootstrap {
    pub permissions: Vec<String>,
    pub settings: ClientSettings,
    pub features: Vec<String>,
}

impl AuthBootstrap {
    pub fn for_user(user: &User) -> Self {
        let credentials = user.credentials();
        let profile = user.profile();

        let mut permissions = vec!["profile:read".to_string(), "profile:write".to_string()];
        if !credentials.email_verified {
            permissions.push("email:verify".to_string());
        }

        let mut features = Vec::new();
        if credentials.mfa_enabled {
            features.push("mfa".to_string());
        } else {
            features.push("mfa_enrollment".to_string());
        }

        Self {
            permissions,
            settings: ClientSettings {
                locale: profile.locale.clone(),
                timezone: profile.timezone.clone(),
            },
            features,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticateUserResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
    pub user: UserProfileView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<AuthBootstrap>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl RefreshTokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
        }
    }
}

fn persisted_id(user: &User) -> AppResult<Uuid> {
    user.id()
        .ok_or_else(|| AppError::internal("user has not been persisted"))
}
