//! User Service Library
//!
//! Persistence for the identity domain: SeaORM entities, the `UserStore`
//! repository, an in-memory repository, and schema migrations.

pub mod infra;
pub mod repository;

use tracing::info;

use common::DatabaseConfig;

use crate::infra::Database;

pub use crate::repository::{InMemoryUserStore, UserStore};

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Snapshot of the identity store reported by `user-service check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    /// Defined migrations not yet applied, oldest first
    pub pending_migrations: Vec<String>,
    pub users: u64,
}

impl StoreReport {
    pub fn is_ready(&self) -> bool {
        self.pending_migrations.is_empty()
    }
}

/// Ping the database and report pending migrations and the user count.
///
/// Does not apply migrations. The user count is zero while the schema is
/// incomplete.
pub async fn inspect_store(db: &Database) -> Result<StoreReport, Box<dyn std::error::Error>> {
    db.ping().await?;

    let pending_migrations: Vec<String> = db
        .migration_status()
        .await?
        .into_iter()
        .filter(|(_, applied)| !applied)
        .map(|(name, _)| name)
        .collect();

    let users = if pending_migrations.is_empty() {
        UserStore::new(db.get_connection()).count().await?
    } else {
        0
    };

    Ok(StoreReport {
        pending_migrations,
        users,
    })
}

/// Run a migration action against the configured database.
pub async fn run_migrations(
    config: &DatabaseConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(config).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}
