//! Application state for dependency injection.

use std::sync::Arc;
use std::time::Duration;

use domain::UserRepository;
use identity_service_lib::{AuthenticateUser, CreateUser, Deadline, TokenIssuer};
use user_service_lib::infra::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub create_user: Arc<CreateUser>,
    pub authenticate_user: Arc<AuthenticateUser>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub users: Arc<dyn UserRepository>,
    /// `None` when running on the in-memory store
    pub database: Option<Database>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        create_user: Arc<CreateUser>,
        authenticate_user: Arc<AuthenticateUser>,
        tokens: Arc<dyn TokenIssuer>,
        users: Arc<dyn UserRepository>,
        database: Option<Database>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            create_user,
            authenticate_user,
            tokens,
            users,
            database,
            request_timeout,
        }
    }

    /// Fresh deadline for one inbound request.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }
}
