//! Atomic claim of queued jobs.
//!
//! A claim scans records in the store's natural order and flips the first
//! `queued` one to `processing`. Stores run [`claim_first_queued`] inside a
//! single transaction so no two callers can observe the same record as
//! queued. Stores with a status index may skip the scan (see
//! `PgJobStore::claim_next`) as long as the flip stays atomic.

use tracing::debug;

use crate::db::{JobStore, StoreError};
use crate::models::job::{Job, JobStatus};

/// Claims the first queued record among `records`, mutating it in place.
///
/// Records with any other status are left untouched. Nothing is written when
/// no queued record is found.
pub fn claim_first_queued<'a, I>(records: I) -> Option<Job>
where
    I: IntoIterator<Item = &'a mut Job>,
{
    let slot = records
        .into_iter()
        .find(|job| job.status == JobStatus::Queued)?;
    // Only queued records reach here, so the transition is always valid.
    let claimed = slot.claim().ok()?;
    *slot = claimed.clone();
    Some(claimed)
}

/// Claims one job for `worker_id`, or `None` if nothing is queued.
pub async fn claim_job(store: &dyn JobStore, worker_id: u32) -> Result<Option<Job>, StoreError> {
    let claimed = store.claim_next().await?;
    if let Some(job) = &claimed {
        debug!(worker_id, job_id = %job.id, name = %job.name, "Claimed job");
    }
    Ok(claimed)
}
