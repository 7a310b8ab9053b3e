use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{JobStore, StoreError};
use crate::models::job::{Job, JobStatus};
use crate::services::fetcher::RetryingFetcher;
use crate::services::metrics::Metrics;

/// Drives a claimed job to a terminal state.
pub struct JobProcessor {
    store: Arc<dyn JobStore>,
    fetcher: RetryingFetcher,
    metrics: Metrics,
}

impl JobProcessor {
    pub fn new(store: Arc<dyn JobStore>, fetcher: RetryingFetcher, metrics: Metrics) -> Self {
        Self {
            store,
            fetcher,
            metrics,
        }
    }

    /// Look up `job.name` and write the job back exactly once, as `complete`
    /// or `failed`. Lookup failures become a `failed` record; only a store
    /// failure on the write-back is returned.
    pub async fn process(&self, job: &Job, worker_id: u32) -> Result<Job, StoreError> {
        info!(worker_id, job_id = %job.id, name = %job.name, "Processing job");

        let finished = match self.fetcher.fetch(&job.name, worker_id).await {
            Ok(result) => job.complete(result)?,
            Err(e) => job.fail(e.to_string())?,
        };

        self.store.put(&finished).await?;

        match finished.status {
            JobStatus::Complete => {
                info!(worker_id, job_id = %finished.id, "Job complete");
                self.metrics.record_job_processed(worker_id).await;
            }
            _ => {
                warn!(
                    worker_id,
                    job_id = %finished.id,
                    error = finished.error.as_deref().unwrap_or_default(),
                    "Job failed"
                );
                self.metrics.record_processing_error().await;
            }
        }

        Ok(finished)
    }
}
