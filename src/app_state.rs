use std::sync::Arc;

use crate::db::{CounterSink, JobStore};
use crate::services::metrics::Metrics;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>, counters: Arc<dyn CounterSink>) -> Self {
        Self {
            store,
            metrics: Metrics::new(counters),
        }
    }
}
