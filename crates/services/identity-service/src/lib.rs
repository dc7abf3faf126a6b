//! Identity Service Library
//!
//! Application layer over the identity domain: the `CreateUser` and
//! `AuthenticateUser` use cases, the collaborator ports they depend on, and
//! the default adapters (JWT tokens, event publishers, log-only e-mail).

pub mod deadline;
pub mod dto;
pub mod mailer;
pub mod ports;
pub mod publisher;
pub mod token;
pub mod usecases;

pub use deadline::Deadline;
pub use mailer::{spawn_welcome_mailer, LogEmailService};
pub use ports::{EmailService, EventPublisher, TokenClaims, TokenIssuer, TokenKind};
pub use publisher::{BroadcastEventPublisher, TracingEventPublisher};
pub use token::JwtTokenIssuer;
pub use usecases::{AuthenticateUser, CreateUser};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::{MockEmailService, MockEventPublisher, MockTokenIssuer};
