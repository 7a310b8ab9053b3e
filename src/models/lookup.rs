use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{Job, JobStatus};

/// Body of `POST /bird`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[garde(required, length(min = 1, max = 255))]
    pub name: Option<String>,
}

impl CreateJobRequest {
    /// Trims the subject name so whitespace-only names fail validation.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
        }
    }
}

/// Query string of `GET /bird`.
#[derive(Debug, Deserialize)]
pub struct JobQuery {
    pub name: Option<String>,
}

impl JobQuery {
    /// The name trimmed the same way as on creation. `None` when missing or blank.
    pub fn normalized_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Response for a completed lookup. `result` is always present, `null` when
/// the subject had no extract.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobResultResponse {
    pub id: Uuid,
    pub name: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub result: Option<String>,
}

impl From<Job> for JobResultResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            name: job.name,
            status: job.status,
            created_at: job.created_at,
            result: job.result,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
