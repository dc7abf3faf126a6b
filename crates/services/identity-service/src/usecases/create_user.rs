//! Account creation.

use std::sync::Arc;

use tracing::{error, info, instrument};

use common::AppResult;
use domain::{IdentityService, User, UserRepository};

use crate::deadline::Deadline;
use crate::dto::{CreateUserRequest, CreateUserResponse};
use crate::ports::EventPublisher;
use crate::usecases::publish_pending_events;

/// Validate, build, persist, publish. Issues no tokens.
#[derive(Clone)]
pub struct CreateUser {
    repo: Arc<dyn UserRepository>,
    identity: IdentityService,
    publisher: Arc<dyn EventPublisher>,
}

impl CreateUser {
    pub fn new(repo: Arc<dyn UserRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            identity: IdentityService::new(repo.clone()),
            repo,
            publisher,
        }
    }

    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn execute(
        &self,
        request: CreateUserRequest,
        deadline: Deadline,
    ) -> AppResult<CreateUserResponse> {
        deadline
            .run(
                "validate_user",
                self.identity.validate_user_for_creation(
                    &request.email,
                    &request.username,
                    &request.password,
                ),
            )
            .await?;

        let CreateUserRequest {
            email,
            username,
            first_name,
            last_name,
            password,
        } = request;
        let mut user = deadline
            .run_blocking("hash_password", move || {
                User::new(&email, &username, &first_name, &last_name, &password)
            })
            .await??;

        // Storage has the last word on uniqueness; a lost race arrives as Conflict.
        if let Err(e) = deadline.run("create_user", self.repo.create(&mut user)).await {
            error!(error = %e, "Failed to persist new user");
            return Err(e);
        }

        publish_pending_events(self.publisher.as_ref(), &deadline, &mut user).await;

        let response = CreateUserResponse::from_user(&user)?;
        info!(
            user_id = %response.id,
            username = %response.username,
            "User created"
        );
        Ok(response)
    }

    /// Whether `email` is free to register. Exposed for pre-submit checks.
    pub async fn is_email_available(&self, email: &str, deadline: Deadline) -> AppResult<bool> {
        deadline
            .run("email_available", self.identity.is_email_available(email))
            .await
    }

    pub async fn is_username_available(
        &self,
        username: &str,
        deadline: Deadline,
    ) -> AppResult<bool> {
        deadline
            .run(
                "username_available",
                self.identity.is_username_available(username),
            )
            .await
    }
}
