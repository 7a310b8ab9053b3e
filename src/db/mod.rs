use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

use crate::models::job::{Job, TransitionError};

pub mod memory;
pub mod queries;

/// Initialize PostgreSQL connection pool
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt job record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
}

/// Transactional map from job id to job record.
///
/// Every method is atomic with respect to every other call on the same store.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All records in the store's natural iteration order.
    async fn scan(&self) -> Result<Vec<Job>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Job>, StoreError>;

    /// Upsert, replacing any record stored under `job.id`.
    async fn put(&self, job: &Job) -> Result<(), StoreError>;

    /// Insert `job` unless a record with the same name exists.
    /// Returns `false` (and writes nothing) on a name conflict.
    async fn insert_unique(&self, job: &Job) -> Result<bool, StoreError>;

    /// Flip the first queued record to processing and return it, in one
    /// transaction. Returns `None` without writing when nothing is queued.
    async fn claim_next(&self) -> Result<Option<Job>, StoreError>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Named integer counters with atomic increments.
#[async_trait]
pub trait CounterSink: Send + Sync {
    async fn increment(&self, key: &str) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<u64, StoreError>;
}
