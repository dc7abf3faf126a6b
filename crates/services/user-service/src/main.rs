//! User Service - identity store administration.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::DatabaseConfig;
use user_service_lib::infra::Database;
use user_service_lib::{inspect_store, MigrateAction};

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "Identity store administration")]
struct Cli {
    /// Overrides DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply, roll back, list or reset the identity schema
    Migrate {
        #[arg(value_enum)]
        action: MigrateArg,
    },
    /// Report connectivity, pending migrations and stored users
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum MigrateArg {
    Up,
    Down,
    Status,
    Fresh,
}

impl From<MigrateArg> for MigrateAction {
    fn from(arg: MigrateArg) -> Self {
        match arg {
            MigrateArg::Up => MigrateAction::Up,
            MigrateArg::Down => MigrateAction::Down,
            MigrateArg::Status => MigrateAction::Status,
            MigrateArg::Fresh => MigrateAction::Fresh,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = DatabaseConfig::from_env();
    if let Some(url) = cli.database_url {
        config.url = url;
    }

    match cli.command {
        Commands::Migrate { action } => {
            user_service_lib::run_migrations(&config, action.into()).await?;
        }
        Commands::Check => {
            let db = Database::connect_without_migrations(&config).await?;
            let report = inspect_store(&db).await?;
            if report.is_ready() {
                info!(users = report.users, "Identity store is up to date");
            } else {
                warn!(
                    pending = ?report.pending_migrations,
                    "Identity store has pending migrations"
                );
            }
        }
    }

    Ok(())
}
