//! Repsheet Server
//!
//! Run with: `cargo run` or `repsheet [serve|migrate|seed]`
//!
//! Configuration via environment variables:
//! - REPSHEET_DATABASE__TYPE: postgres or sqlite
//! - REPSHEET_DATABASE__URL: connection string (postgres)
//! - REPSHEET_DATABASE__PATH: file path (sqlite)
//! - REPSHEET_SERVER__PORT: port to listen on (default: 8080)
//! - REPSHEET_POSITIONS__POLICY: reject (default) or clamp

use std::sync::Arc;

use clap::{Parser, Subcommand};
use repsheet::{
    api::{self, AppState},
    config::{Config, DatabaseConfig},
    NewUser, NewWorkout, PositionManager, WorkoutStore,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "repsheet",
    about = "Per-user ordered workout lists",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run migrations and start the REST API server (default).
    Serve,
    /// Run pending database migrations and exit.
    Migrate,
    /// Run migrations and load two users with three workouts.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repsheet=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);

    // Load config from environment or use defaults
    let config = Config::from_env().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "No config found, using SQLite in-memory database");
        Config::in_memory()
    });

    // Connect to database based on config
    match &config.database {
        #[cfg(feature = "postgres")]
        DatabaseConfig::Postgres {
            url,
            max_connections,
            acquire_timeout_secs,
            lock_timeout_ms,
        } => {
            use repsheet::PostgresStore;

            tracing::info!("Connecting to PostgreSQL...");
            let store = PostgresStore::connect_with_options(
                url,
                *max_connections,
                std::time::Duration::from_secs(*acquire_timeout_secs),
                std::time::Duration::from_millis(*lock_timeout_ms),
            )
            .await?;

            run(command, config, store).await
        }

        #[cfg(feature = "sqlite")]
        DatabaseConfig::Sqlite { path } => {
            use repsheet::SqliteStore;

            tracing::info!("Connecting to SQLite at {}...", path);
            let store = SqliteStore::connect(&DatabaseConfig::sqlite_url(path)).await?;

            run(command, config, store).await
        }

        #[allow(unreachable_patterns)]
        _ => {
            anyhow::bail!("No database backend enabled. Compile with --features postgres or --features sqlite");
        }
    }
}

async fn run<S: WorkoutStore>(command: Command, config: Config, store: S) -> anyhow::Result<()> {
    store.migrate().await?;
    tracing::info!("Database migrated");

    match command {
        Command::Migrate => Ok(()),
        Command::Seed => seed(store).await,
        Command::Serve => run_server(config, store).await,
    }
}

async fn run_server<S: WorkoutStore>(config: Config, store: S) -> anyhow::Result<()> {
    tracing::info!(policy = ?config.positions.policy, "Starting Repsheet server...");

    let manager = PositionManager::new(store, config.positions.clone());
    let state = Arc::new(AppState { manager });
    let app = api::router(state).layer(TraceLayer::new_for_http());

    let addr = config.server.address();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn seed<S: WorkoutStore>(store: S) -> anyhow::Result<()> {
    let first = store.insert_user(&NewUser::new("user 1")).await?;
    let second = store.insert_user(&NewUser::new("user 2")).await?;

    let manager = PositionManager::new(store, Default::default());
    manager
        .insert(
            first.id,
            NewWorkout::new("push day")
                .with_description("bench, overhead press, dips")
                .with_loads(185, 135, 95),
            0,
        )
        .await?;
    manager
        .insert(
            first.id,
            NewWorkout::new("pull day").with_loads(225, 185, 135),
            1,
        )
        .await?;
    manager
        .insert(second.id, NewWorkout::new("leg day"), 0)
        .await?;

    tracing::info!(users = 2, workouts = 3, "Seeded database");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
