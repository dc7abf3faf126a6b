//! Gateway configuration.

use common::{AppResult, DatabaseConfig, JwtConfig, ServiceConfig};

/// Capacity of the in-process domain event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything the gateway process needs to start.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails when the JWT secrets are missing or too weak.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            service: ServiceConfig::from_env(),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env()?,
        })
    }
}
