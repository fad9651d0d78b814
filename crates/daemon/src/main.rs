//! Lectio CMS - Publish Worker Daemon
//!
//! Composition root: wires the SQLite content store into the
//! scheduled-publishing worker and runs it until shutdown.

mod telemetry;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use lectio_core::application::worker::constants::DEFAULT_PUBLISH_INTERVAL;
use lectio_core::application::{shutdown_channel, PublishWorker, Publisher};
use lectio_core::port::id_provider::UuidProvider;
use lectio_core::port::time_provider::SystemTimeProvider;
use lectio_infra_sqlite::{
    create_pool, run_migrations, SqliteLessonRepository, SqlitePublishingLogRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.lectio/lectio.db";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON format for production)
    let log_format = std::env::var("LECTIO_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Lectio daemon v{} starting...", VERSION);

    // 1.1. Initialize OpenTelemetry (optional)
    if let Err(e) = telemetry::init_telemetry() {
        tracing::warn!(error = ?e, "Failed to initialize OpenTelemetry (continuing without it)");
    }

    // 2. Load configuration
    let db_path = std::env::var("LECTIO_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

    let publish_interval = std::env::var("LECTIO_PUBLISH_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_PUBLISH_INTERVAL);

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let lessons = Arc::new(SqliteLessonRepository::new(pool.clone()));
    let publishing_log = Arc::new(SqlitePublishingLogRepository::new(pool.clone()));

    let publisher = Publisher::new(lessons, publishing_log, id_provider, time_provider);

    // 5. Start publish worker
    info!(
        interval_secs = publish_interval.as_secs(),
        "Starting publish worker..."
    );
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let worker = PublishWorker::new(publisher, publish_interval);
    let worker_handle = tokio::spawn(async move {
        worker.run(shutdown_rx).await;
    });

    info!("System ready. Scheduled lessons will publish automatically.");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    shutdown_tx.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(5), worker_handle).await;

    info!("Shutdown complete.");

    Ok(())
}
