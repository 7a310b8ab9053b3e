use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::db::StoreError;
use crate::models::job::{Job, JobStatus};
use crate::models::lookup::{CreateJobRequest, ErrorResponse, JobQuery, JobResultResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("name is required")]
    InvalidName,

    #[error("Job with this name already exists")]
    Conflict,

    #[error("Job not found")]
    NotFound,

    #[error("Job not complete")]
    NotComplete,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidName => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::NotFound | ApiError::NotComplete => StatusCode::NOT_FOUND,
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Job store request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let error = match self {
            ApiError::Store(_) => "internal store error".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// POST /bird: queue a lookup job for a subject name.
pub async fn create_job(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected job request body");
        ApiError::InvalidName
    })?;
    let request = request.normalized();
    request.validate().map_err(|_| ApiError::InvalidName)?;
    let name = request.name.ok_or(ApiError::InvalidName)?;

    let job = Job::new(name);
    if !state.store.insert_unique(&job).await? {
        return Err(ApiError::Conflict);
    }

    state.metrics.record_job_created().await;
    tracing::info!(job_id = %job.id, name = %job.name, "Job queued");

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /bird?name=: the result of a completed job.
pub async fn get_job_result(
    State(state): State<AppState>,
    query: Result<Query<JobQuery>, QueryRejection>,
) -> Result<Json<JobResultResponse>, ApiError> {
    state.metrics.record_result_request().await;

    let Ok(Query(query)) = query else {
        return Err(ApiError::NotFound);
    };
    let name = query.normalized_name().ok_or(ApiError::NotFound)?;
    let job = state
        .store
        .find_by_name(name)
        .await?
        .ok_or(ApiError::NotFound)?;

    if job.status != JobStatus::Complete {
        return Err(ApiError::NotComplete);
    }

    Ok(Json(job.into()))
}
