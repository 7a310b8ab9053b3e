use serde::Deserialize;
use std::time::Duration;

use crate::services::fetcher::RetryConfig;
use crate::services::lookup::DEFAULT_LOOKUP_URL;
use crate::services::worker::WorkerConfig;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3200"). Unused by worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string for jobs and counters
    pub database_url: String,

    /// Worker loops started by each worker process
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: u32,

    /// Idle sleep between polls when no job is queued
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Lookup retries after the first attempt
    #[serde(default = "default_fetch_max_retries")]
    pub fetch_max_retries: u32,

    /// Backoff before the first retry; doubles per retry
    #[serde(default = "default_fetch_base_delay_ms")]
    pub fetch_base_delay_ms: u64,

    /// Wikipedia action API endpoint
    #[serde(default = "default_lookup_base_url")]
    pub lookup_base_url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3200".to_string()
}

fn default_worker_concurrency() -> u32 {
    1
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_fetch_max_retries() -> u32 {
    RetryConfig::DEFAULT.max_retries
}

fn default_fetch_base_delay_ms() -> u64 {
    RetryConfig::DEFAULT.base_delay.as_millis() as u64
}

fn default_lookup_base_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.fetch_max_retries,
            Duration::from_millis(self.fetch_base_delay_ms),
        )
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            concurrency: self.worker_concurrency,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}
