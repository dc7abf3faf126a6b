//! Repository port for the `User` aggregate.

use async_trait::async_trait;
use uuid::Uuid;

use crate::email::Email;
use crate::error::DomainResult;
use crate::user::User;
use crate::username::Username;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Durable storage for users.
///
/// Lookups miss with `DomainError::NotFound`, never with an empty success.
/// Implementations enforce email and username uniqueness themselves and
/// report collisions as `DomainError::Conflict`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and assign its id
    async fn create(&self, user: &mut User) -> DomainResult<()>;

    /// Find user by ID
    async fn get_by_id(&self, id: Uuid) -> DomainResult<User>;

    /// Find user by normalized email
    async fn get_by_email(&self, email: &Email) -> DomainResult<User>;

    /// Find user by username
    async fn get_by_username(&self, username: &Username) -> DomainResult<User>;

    /// Persist the current credentials and profile of an existing user
    async fn update(&self, user: &User) -> DomainResult<()>;

    /// Delete user and owned rows
    async fn delete_by_id(&self, id: Uuid) -> DomainResult<()>;

    /// Whether any user holds the email or the username
    async fn exists(&self, email: &Email, username: &Username) -> DomainResult<bool>;
}
