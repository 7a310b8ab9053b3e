use axum::routing::get;
use axum::Router;

use crate::app_state::AppState;

pub mod health;
pub mod jobs;
pub mod metrics;

/// API routes. The Prometheus endpoint has its own state and is attached by
/// the server binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/bird", get(jobs::get_job_result).post(jobs::create_job))
        .with_state(state)
}
