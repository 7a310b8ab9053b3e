//! Polling worker loop.
//!
//! Each worker repeatedly claims one job and processes it to completion
//! before polling again. When nothing is queued it sleeps for the poll
//! interval. Store errors are logged and the loop carries on after the same
//! idle sleep. Cancellation is observed between jobs, so a job that has been
//! claimed is always written back before the worker stops.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::db::{JobStore, StoreError};
use crate::services::claim::claim_job;
use crate::services::processor::JobProcessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Number of concurrent worker loops.
    pub concurrency: u32,

    /// Sleep between polls when no job is queued.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            poll_interval: Duration::from_millis(1000),
        }
    }
}

pub struct Worker {
    id: u32,
    store: Arc<dyn JobStore>,
    processor: Arc<JobProcessor>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl Worker {
    pub fn new(
        id: u32,
        store: Arc<dyn JobStore>,
        processor: Arc<JobProcessor>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            store,
            processor,
            poll_interval,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled.
    pub async fn run(self) {
        info!(worker_id = self.id, "Worker started");

        while !self.shutdown.is_cancelled() {
            match self.run_once().await {
                Ok(true) => {
                    debug!(worker_id = self.id, "Job processed, checking for next job");
                }
                Ok(false) => {
                    trace!(worker_id = self.id, "No jobs queued, sleeping");
                    self.idle().await;
                }
                Err(e) => {
                    error!(worker_id = self.id, error = %e, "Store error, will retry");
                    self.idle().await;
                }
            }
        }

        info!(worker_id = self.id, "Worker stopped");
    }

    /// One claim-and-process iteration.
    /// Returns Ok(true) if a job was processed, Ok(false) if none was queued.
    pub async fn run_once(&self) -> Result<bool, StoreError> {
        let Some(job) = claim_job(self.store.as_ref(), self.id).await? else {
            return Ok(false);
        };
        self.processor.process(&job, self.id).await?;
        Ok(true)
    }

    async fn idle(&self) {
        tokio::select! {
            _ = self.shutdown.cancelled() => {}
            _ = sleep(self.poll_interval) => {}
        }
    }
}

/// Spawn `config.concurrency` workers with ids `1..=concurrency`.
pub fn spawn_workers(
    config: WorkerConfig,
    store: Arc<dyn JobStore>,
    processor: Arc<JobProcessor>,
    shutdown: CancellationToken,
) -> JoinSet<()> {
    let mut workers = JoinSet::new();
    for id in 1..=config.concurrency.max(1) {
        let worker = Worker::new(
            id,
            store.clone(),
            processor.clone(),
            config.poll_interval,
            shutdown.clone(),
        );
        workers.spawn(worker.run());
    }
    workers
}
