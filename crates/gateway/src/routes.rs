//! Route configuration.

use axum::Router;

use crate::handlers::{auth_routes, health_routes};
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes(state.clone()))
        .with_state(state)
}
