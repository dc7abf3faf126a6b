//! HTTP handlers.

mod auth_handler;
mod health_handler;

pub use auth_handler::{auth_routes, AvailabilityQuery, AvailabilityResponse, LoginRequest};
pub use health_handler::{health_check, health_routes, HealthResponse};
