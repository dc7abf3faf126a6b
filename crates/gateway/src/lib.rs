//! API Gateway Library
//!
//! HTTP surface over the identity use cases: registration, login, token
//! refresh, the caller's profile and health.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use domain::{DomainEvent, UserRepository};
use identity_service_lib::{
    spawn_welcome_mailer, AuthenticateUser, BroadcastEventPublisher, CreateUser, EventPublisher,
    JwtTokenIssuer, LogEmailService, TokenIssuer, TracingEventPublisher,
};
use user_service_lib::infra::Database;
use user_service_lib::{InMemoryUserStore, UserStore};

use crate::config::{GatewayConfig, EVENT_CHANNEL_CAPACITY};
use crate::routes::create_router;
use crate::state::AppState;

/// Where user records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Database,
    /// Process-local; everything is lost on exit
    InMemory,
}

/// Wire repositories, use cases and event listeners for `config`.
pub async fn build_state(
    config: &GatewayConfig,
    storage: Storage,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let (users, database): (Arc<dyn UserRepository>, Option<Database>) = match storage {
        Storage::Database => {
            let database = Database::connect(&config.database).await?;
            let store = UserStore::new(database.get_connection());
            (Arc::new(store), Some(database))
        }
        Storage::InMemory => {
            warn!("Using in-memory user store, data will not survive a restart");
            (Arc::new(InMemoryUserStore::new()), None)
        }
    };

    let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtTokenIssuer::new(&config.jwt));

    let events = BroadcastEventPublisher::new(EVENT_CHANNEL_CAPACITY);
    spawn_welcome_mailer(events.subscribe(), Arc::new(LogEmailService));
    spawn_event_log(events.subscribe());
    let publisher: Arc<dyn EventPublisher> = Arc::new(events);

    Ok(AppState::new(
        Arc::new(CreateUser::new(users.clone(), publisher.clone())),
        Arc::new(AuthenticateUser::new(
            users.clone(),
            tokens.clone(),
            publisher,
        )),
        tokens,
        users,
        database,
        config.service.request_timeout(),
    ))
}

/// Mirror every published event into the log.
fn spawn_event_log(mut events: broadcast::Receiver<DomainEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let log = TracingEventPublisher;
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = log.publish(std::slice::from_ref(&event)).await {
                        warn!(error = %e, "Failed to log event");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Run the HTTP server with the given configuration.
pub async fn run_server(
    config: GatewayConfig,
    storage: Storage,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&config, storage).await?;

    let app = create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.service.server_addr().parse()?;
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
