use bird_extract::{
    config::AppConfig,
    db::{
        self,
        queries::{PgCounters, PgJobStore},
        JobStore,
    },
    services::{
        fetcher::RetryingFetcher, lookup::WikipediaClient, metrics::Metrics,
        processor::JobProcessor, worker::spawn_workers,
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!(pid = std::process::id(), "Starting lookup worker");

    // Load configuration
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize database
    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // Initialize services
    let store: Arc<dyn JobStore> = Arc::new(PgJobStore::new(db_pool.clone()));
    let metrics = Metrics::new(Arc::new(PgCounters::new(db_pool)));

    let lookup = WikipediaClient::new(config.lookup_base_url.clone())
        .expect("Failed to initialize lookup client");
    let fetcher = RetryingFetcher::new(Arc::new(lookup), config.retry_config());
    let processor = Arc::new(JobProcessor::new(store.clone(), fetcher, metrics));

    let worker_config = config.worker_config();
    tracing::info!(
        concurrency = worker_config.concurrency,
        poll_interval_ms = worker_config.poll_interval.as_millis() as u64,
        "Worker ready, starting job processing loops"
    );

    let shutdown = CancellationToken::new();
    let mut workers = spawn_workers(worker_config, store, processor, shutdown.clone());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, finishing in-flight jobs");
            shutdown.cancel();
        }
        _ = workers.join_next() => {
            tracing::error!("Worker loop exited unexpectedly");
            shutdown.cancel();
        }
    }

    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Worker task panicked");
        }
    }

    tracing::info!("All workers stopped");
}
