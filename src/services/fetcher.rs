//! Extract lookup with exponential backoff.
//!
//! Every failure is treated as transient: transport errors, non-success
//! statuses and undecodable bodies are all retried until the attempt budget
//! runs out, then the last error is returned.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::services::lookup::{ExtractSource, FetchError};

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,

    /// Delay before the first retry; doubles for each later one.
    pub base_delay: Duration,
}

impl RetryConfig {
    /// 5 retries with 500ms, 1s, 2s, 4s, 8s delays.
    pub const DEFAULT: Self = Self {
        max_retries: 5,
        base_delay: Duration::from_millis(500),
    };

    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after failed attempt `attempt` (0-indexed): `base_delay * 2^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|attempt| self.delay_for_attempt(attempt))
    }

    /// Total sleep across all retries, excluding request time.
    pub fn total_max_wait(&self) -> Duration {
        self.delays().sum()
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Wraps an [`ExtractSource`] with bounded retries.
#[derive(Clone)]
pub struct RetryingFetcher {
    source: Arc<dyn ExtractSource>,
    retry: RetryConfig,
}

impl RetryingFetcher {
    pub fn new(source: Arc<dyn ExtractSource>, retry: RetryConfig) -> Self {
        Self { source, retry }
    }

    pub async fn fetch(&self, subject: &str, worker_id: u32) -> Result<Option<String>, FetchError> {
        let total = self.retry.total_attempts();
        let mut attempt = 0;

        loop {
            info!(
                worker_id,
                subject,
                attempt = attempt + 1,
                total,
                "Fetching extract"
            );

            match self.source.fetch_extract(subject).await {
                Ok(extract) => {
                    info!(
                        worker_id,
                        subject,
                        found = extract.is_some(),
                        "Extract fetch succeeded"
                    );
                    return Ok(extract);
                }
                Err(e) if attempt >= self.retry.max_retries => {
                    warn!(worker_id, subject, attempts = total, error = %e, "Extract fetch failed, giving up");
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        worker_id,
                        subject,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Extract fetch failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
