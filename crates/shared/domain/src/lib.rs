//! Domain layer - Identity aggregate, value objects and domain rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Persistence is reached only through the `UserRepository` trait.

pub mod constants;
pub mod email;
pub mod error;
pub mod events;
pub mod gender;
pub mod password;
pub mod repository;
pub mod service;
pub mod user;
pub mod username;
pub mod validation;

pub use constants::*;
pub use email::Email;
pub use error::{DomainError, DomainResult};
pub use events::{DomainEvent, EventMetadata};
pub use gender::Gender;
pub use password::{validate_password_rules, PasswordHash};
pub use repository::UserRepository;
pub use service::{IdentityService, PasswordStrength};
pub use user::{Credentials, Profile, User};
pub use username::Username;

#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockUserRepository;
