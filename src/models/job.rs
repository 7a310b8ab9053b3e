use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a lookup job.
///
/// Transitions are strictly `Queued -> Processing -> {Complete | Failed}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "processing" => Some(JobStatus::Processing),
            "complete" => Some(JobStatus::Complete),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Complete)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lookup job and, once terminal, its outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub name: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job {id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub id: Uuid,
    pub from: JobStatus,
    pub to: JobStatus,
}

impl Job {
    /// A fresh queued job for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: JobStatus::Queued,
            created_at: Utc::now(),
            result: None,
            error: None,
        }
    }

    fn transition(&self, to: JobStatus) -> Result<Job, TransitionError> {
        if !self.status.can_transition_to(to) {
            return Err(TransitionError {
                id: self.id,
                from: self.status,
                to,
            });
        }
        Ok(Job {
            status: to,
            ..self.clone()
        })
    }

    /// `queued -> processing`. Every other field is carried over unchanged.
    pub fn claim(&self) -> Result<Job, TransitionError> {
        self.transition(JobStatus::Processing)
    }

    /// `processing -> complete`. `result` is `None` when the lookup found no content.
    pub fn complete(&self, result: Option<String>) -> Result<Job, TransitionError> {
        let mut job = self.transition(JobStatus::Complete)?;
        job.result = result;
        job.error = None;
        Ok(job)
    }

    /// `processing -> failed`.
    pub fn fail(&self, error: impl Into<String>) -> Result<Job, TransitionError> {
        let mut job = self.transition(JobStatus::Failed)?;
        job.result = None;
        job.error = Some(error.into());
        Ok(job)
    }
}
