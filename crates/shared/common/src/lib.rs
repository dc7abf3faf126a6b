//! Common utilities shared across the identity crates.
//!
//! This crate provides:
//! - The use-case error taxonomy with HTTP conversion
//! - Configuration structures loaded from the environment

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult};
