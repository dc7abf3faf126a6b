//! Credential verification and session issuance.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{DomainError, Email, PasswordHash, User, UserRepository, Username};

use crate::deadline::Deadline;
use crate::dto::{AuthBootstrap, AuthenticateUserRequest, AuthenticateUserResponse, UserProfileView};
use crate::ports::{EventPublisher, TokenIssuer, TOKEN_TYPE_BEARER};
use crate::usecases::publish_pending_events;

/// Verified when the identifier matches nobody, so both failure paths cost
/// one hash verification.
static DUMMY_HASH: Lazy<Option<PasswordHash>> =
    Lazy::new(|| PasswordHash::new("Dummy-Passw0rd!").ok());

pub struct AuthenticateUser {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenIssuer>,
    publisher: Arc<dyn EventPublisher>,
}

impl AuthenticateUser {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenIssuer>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repo,
            tokens,
            publisher,
        }
    }

    #[instrument(skip_all, fields(ip_address = %request.ip_address))]
    pub async fn execute(
        &self,
        request: AuthenticateUserRequest,
        deadline: Deadline,
    ) -> AppResult<AuthenticateUserResponse> {
        let AuthenticateUserRequest {
            identifier,
            password,
            ip_address,
            user_agent,
        } = request;

        let found = self.find_user(&identifier, &deadline).await?;

        // The dummy hash is built lazily, so it is resolved on the blocking pool too.
        let stored_hash = found
            .as_ref()
            .map(|user| user.credentials().password_hash.clone());
        let password_valid = deadline
            .run_blocking("verify_password", move || {
                stored_hash
                    .as_ref()
                    .or(DUMMY_HASH.as_ref())
                    .is_some_and(|hash| hash.verify(&password))
            })
            .await?;

        let mut user = match found {
            Some(user) if password_valid => user,
            _ => {
                warn!("Authentication failed");
                return Err(DomainError::Authentication.into());
            }
        };
        let user_id = user
            .id()
            .ok_or_else(|| AppError::internal("stored user has no id"))?;

        user.record_login(&ip_address, &user_agent);
        // Best-effort write; authentication already succeeded.
        if let Err(e) = deadline.run("update_user", self.repo.update(&user)).await {
            error!(user_id = %user_id, error = %e, "Failed to update login record");
        }

        let (access_token, refresh_token) = self.issue_tokens(user_id, &deadline).await?;

        publish_pending_events(self.publisher.as_ref(), &deadline, &mut user).await;

        let response = AuthenticateUserResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.tokens.access_token_expiry_seconds(),
            user: UserProfileView::from_user(&user)?,
            bootstrap: Some(AuthBootstrap::for_user(&user)),
        };

        info!(
            user_id = %user_id,
            username = %user.username(),
            user_agent = %user_agent,
            "User authenticated"
        );
        Ok(response)
    }

    /// Email-shaped lookup first, then username-shaped. A miss on both is `None`.
    async fn find_user(&self, identifier: &str, deadline: &Deadline) -> AppResult<Option<User>> {
        if let Ok(email) = Email::parse(identifier) {
            let lookup = deadline
                .run("get_by_email", self.repo.get_by_email(&email))
                .await;
            if let Some(user) = absorb_miss(lookup)? {
                return Ok(Some(user));
            }
        }

        if let Ok(username) = Username::parse(identifier) {
            let lookup = deadline
                .run("get_by_username", self.repo.get_by_username(&username))
                .await;
            return absorb_miss(lookup);
        }

        Ok(None)
    }

    async fn issue_tokens(&self, user_id: Uuid, deadline: &Deadline) -> AppResult<(String, String)> {
        let access = deadline
            .run(
                "issue_access_token",
                self.tokens.generate_access_token(user_id),
            )
            .await
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "Failed to generate access token");
                e
            })?;
        let refresh = deadline
            .run(
                "issue_refresh_token",
                self.tokens.generate_refresh_token(user_id),
            )
            .await
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "Failed to generate refresh token");
                e
            })?;
        Ok((access, refresh))
    }
}

/// Turn a not-found lookup into `None`; other errors pass through.
fn absorb_miss(result: AppResult<User>) -> AppResult<Option<User>> {
    match result {
        Ok(user) => Ok(Some(user)),
        Err(AppError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockEventPublisher, MockTokenIssuer};
    use chrono::Utc;
    use domain::{Credentials, DomainEvent, Gender, MockUserRepository, Profile};
    use std::time::Duration;

    static ALICE_HASH: Lazy<PasswordHash> =
        Lazy::new(|| PasswordHash::new("Str0ng!Pass").unwrap());

    fn alice(id: Uuid) -> User {
        User::restore(
            id,
            Utc::now(),
            Utc::now(),
            Credentials {
                email: Email::parse("alice@example.com").unwrap(),
                username: Username::parse("alice123").unwrap(),
                password_hash: ALICE_HASH.clone(),
                email_verified: false,
                mfa_enabled: false,
                mfa_secret: None,
                last_login_at: None,
            },
            Profile {
                first_name: "Alice".to_string(),
                last_name: "Smith".to_string(),
                gender: Gender::Unspecified,
                date_of_birth: None,
                bio: None,
                display_name: None,
                avatar_photo_id: None,
                relationship_id: None,
                locale: "en".to_string(),
                timezone: "UTC".to_string(),
            },
        )
    }

    fn login(identifier: &str, password: &str) -> AuthenticateUserRequest {
        AuthenticateUserRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
            ip_address: "203.0.113.7".to_string(),
            user_agent: "test-agent".to_string(),
        }
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(10))
    }

    fn working_tokens() -> MockTokenIssuer {
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_generate_access_token()
            .returning(|_| Ok("access".to_string()));
        tokens
            .expect_generate_refresh_token()
            .returning(|_| Ok("refresh".to_string()));
        tokens.expect_access_token_expiry_seconds().return_const(900_i64);
        tokens
    }

    fn quiet_publisher() -> MockEventPublisher {
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().returning(|_| Ok(()));
        publisher
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().returning(move |_| Ok(alice(id)));
        repo.expect_update()
            .withf(|user| user.credentials().last_login_at.is_some())
            .times(1)
            .returning(|_| Ok(()));

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(move |events| {
                events.len() == 1
                    && matches!(events[0], DomainEvent::UserLoggedIn { .. })
                    && events[0].aggregate_id() == Some(id)
            })
            .times(1)
            .returning(|_| Ok(()));

        let use_case =
            AuthenticateUser::new(Arc::new(repo), Arc::new(working_tokens()), Arc::new(publisher));
        let response = use_case
            .execute(login("Alice@Example.com", "Str0ng!Pass"), deadline())
            .await
            .unwrap();

        assert_eq!(response.access_token, "access");
        assert_eq!(response.refresh_token, "refresh");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 900);
        assert_eq!(response.user.id, id);
        assert!(response.bootstrap.is_some());
    }

    #[tokio::test]
    async fn test_login_by_username() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().never();
        repo.expect_get_by_username().returning(move |_| Ok(alice(id)));
        repo.expect_update().returning(|_| Ok(()));

        let use_case = AuthenticateUser::new(
            Arc::new(repo),
            Arc::new(working_tokens()),
            Arc::new(quiet_publisher()),
        );
        let response = use_case
            .execute(login("alice123", "Str0ng!Pass"), deadline())
            .await
            .unwrap();

        assert_eq!(response.user.username, "alice123");
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let mut missing = MockUserRepository::new();
        missing
            .expect_get_by_email()
            .returning(|_| Err(DomainError::not_found("user")));
        missing
            .expect_get_by_username()
            .returning(|_| Err(DomainError::not_found("user")));

        let mut present = MockUserRepository::new();
        present
            .expect_get_by_email()
            .returning(|_| Ok(alice(Uuid::new_v4())));
        present.expect_update().never();

        let mut tokens = MockTokenIssuer::new();
        tokens.expect_generate_access_token().never();

        let unknown = AuthenticateUser::new(
            Arc::new(missing),
            Arc::new(MockTokenIssuer::new()),
            Arc::new(MockEventPublisher::new()),
        )
        .execute(login("nobody@example.com", "Str0ng!Pass"), deadline())
        .await
        .unwrap_err();

        let mismatch = AuthenticateUser::new(
            Arc::new(present),
            Arc::new(tokens),
            Arc::new(MockEventPublisher::new()),
        )
        .execute(login("alice@example.com", "Wr0ng!Pass"), deadline())
        .await
        .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(mismatch, AppError::InvalidCredentials));
        assert_eq!(
            unknown.user_message(),
            AppError::from(DomainError::Authentication).user_message()
        );
        assert_eq!(unknown.to_string(), mismatch.to_string());
        assert_eq!(unknown.status(), mismatch.status());
    }

    #[tokio::test]
    async fn test_token_failure_aborts() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(alice(Uuid::new_v4())));
        repo.expect_update().returning(|_| Ok(()));

        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_generate_access_token()
            .returning(|_| Ok("access".to_string()));
        tokens
            .expect_generate_refresh_token()
            .returning(|_| Err(AppError::token_issuance("signing failed")));

        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().never();

        let use_case = AuthenticateUser::new(Arc::new(repo), Arc::new(tokens), Arc::new(publisher));
        let err = use_case
            .execute(login("alice@example.com", "Str0ng!Pass"), deadline())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TokenIssuance(_)));
    }

    #[tokio::test]
    async fn test_update_failure_is_tolerated() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(alice(Uuid::new_v4())));
        repo.expect_update()
            .returning(|_| Err(DomainError::persistence("disk full")));

        let use_case = AuthenticateUser::new(
            Arc::new(repo),
            Arc::new(working_tokens()),
            Arc::new(quiet_publisher()),
        );
        let result = use_case
            .execute(login("alice@example.com", "Str0ng!Pass"), deadline())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_publish_failure_is_tolerated() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(alice(Uuid::new_v4())));
        repo.expect_update().returning(|_| Ok(()));

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .returning(|_| Err(AppError::internal("broker down")));

        let use_case =
            AuthenticateUser::new(Arc::new(repo), Arc::new(working_tokens()), Arc::new(publisher));
        let result = use_case
            .execute(login("alice@example.com", "Str0ng!Pass"), deadline())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_invalid_credentials() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Err(DomainError::persistence("connection reset")));

        let use_case = AuthenticateUser::new(
            Arc::new(repo),
            Arc::new(MockTokenIssuer::new()),
            Arc::new(MockEventPublisher::new()),
        );
        let err = use_case
            .execute(login("alice@example.com", "Str0ng!Pass"), deadline())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_expired_deadline_times_out() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Ok(alice(Uuid::new_v4())));

        let use_case = AuthenticateUser::new(
            Arc::new(repo),
            Arc::new(MockTokenIssuer::new()),
            Arc::new(MockEventPublisher::new()),
        );
        let expired = Deadline::at(tokio::time::Instant::now());
        let err = use_case
            .execute(login("alice@example.com", "Str0ng!Pass"), expired)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unknown_user_check_runs_on_blocking_pool() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Err(DomainError::not_found("user")));
        repo.expect_get_by_username().never();

        let use_case = AuthenticateUser::new(
            Arc::new(repo),
            Arc::new(MockTokenIssuer::new()),
            Arc::new(MockEventPublisher::new()),
        );
        // Lookups are ready immediately; only the hash check can observe expiry.
        let expired = Deadline::at(tokio::time::Instant::now());
        let err = use_case
            .execute(login("nobody@example.com", "Str0ng!Pass"), expired)
            .await
            .unwrap_err();

        match err {
            AppError::Timeout(op) => assert_eq!(op, "verify_password"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
