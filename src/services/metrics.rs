use std::sync::Arc;
use tracing::warn;

use crate::db::CounterSink;

pub const JOBS_CREATED: &str = "jobs_created";
pub const RESULT_REQUESTS: &str = "result_requests";
pub const PROCESSING_ERRORS: &str = "processing_errors";
pub const JOBS_PROCESSED_PREFIX: &str = "jobs_processed:";

pub fn jobs_processed_key(worker_id: u32) -> String {
    format!("{JOBS_PROCESSED_PREFIX}{worker_id}")
}

/// Register descriptions for the Prometheus exporter.
pub fn describe() {
    metrics::describe_counter!("jobs_created_total", "Total lookup jobs submitted");
    metrics::describe_counter!("result_requests_total", "Total job result reads");
    metrics::describe_counter!(
        "jobs_processed_total",
        "Total jobs completed, labelled by worker"
    );
    metrics::describe_counter!(
        "processing_errors_total",
        "Total jobs that failed after exhausting lookup retries"
    );
}

/// Job counters. Each event is persisted through the [`CounterSink`] and
/// mirrored to the process-wide `metrics` recorder.
///
/// A sink failure is logged and dropped; counters never fail the caller.
#[derive(Clone)]
pub struct Metrics {
    sink: Arc<dyn CounterSink>,
}

impl Metrics {
    pub fn new(sink: Arc<dyn CounterSink>) -> Self {
        Self { sink }
    }

    async fn increment(&self, key: &str) {
        if let Err(e) = self.sink.increment(key).await {
            warn!(counter = key, error = %e, "Failed to increment counter");
        }
    }

    pub async fn record_job_created(&self) {
        metrics::counter!("jobs_created_total").increment(1);
        self.increment(JOBS_CREATED).await;
    }

    pub async fn record_result_request(&self) {
        metrics::counter!("result_requests_total").increment(1);
        self.increment(RESULT_REQUESTS).await;
    }

    pub async fn record_job_processed(&self, worker_id: u32) {
        metrics::counter!("jobs_processed_total", "worker" => worker_id.to_string()).increment(1);
        self.increment(&jobs_processed_key(worker_id)).await;
    }

    pub async fn record_processing_error(&self) {
        metrics::counter!("processing_errors_total").increment(1);
        self.increment(PROCESSING_ERRORS).await;
    }
}
