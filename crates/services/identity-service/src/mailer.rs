//! Account e-mail triggered by domain events.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use common::AppResult;
use domain::{DomainEvent, Email};

use crate::ports::EmailService;

/// `EmailService` that only logs. Used until a delivery provider is wired in.
#[derive(Debug, Default, Clone)]
pub struct LogEmailService;

#[async_trait]
impl EmailService for LogEmailService {
    async fn send_welcome_email(&self, to: &Email, first_name: &str) -> AppResult<()> {
        info!(to = %to, first_name, "Welcome email queued");
        Ok(())
    }

    async fn send_email_verification(&self, to: &Email, _token: &str) -> AppResult<()> {
        info!(to = %to, "Verification email queued");
        Ok(())
    }

    async fn send_password_reset_email(&self, to: &Email, _token: &str) -> AppResult<()> {
        info!(to = %to, "Password reset email queued");
        Ok(())
    }
}

/// Send a welcome e-mail for every `UserCreated` seen on `events`.
///
/// The task ends when every sender has been dropped.
pub fn spawn_welcome_mailer(
    mut events: broadcast::Receiver<DomainEvent>,
    email_service: Arc<dyn EmailService>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(DomainEvent::UserCreated {
                    meta,
                    email,
                    first_name,
                    ..
                }) => {
                    if let Err(e) = email_service.send_welcome_email(&email, &first_name).await {
                        error!(
                            user_id = ?meta.aggregate_id,
                            error = %e,
                            "Failed to send welcome email"
                        );
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Welcome mailer fell behind, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
