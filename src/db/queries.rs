use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{CounterSink, JobStore, StoreError};
use crate::models::job::{Job, JobStatus};

const JOB_COLUMNS: &str = "id, name, status, created_at, result, error";

fn job_from_row(row: &PgRow) -> Result<Job, StoreError> {
    let status_str: String = row.try_get("status")?;
    let status = JobStatus::parse(&status_str)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown job status '{status_str}'")))?;

    Ok(Job {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        status,
        created_at: row.try_get("created_at")?,
        result: row.try_get("result")?,
        error: row.try_get("error")?,
    })
}

/// Job store on PostgreSQL.
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn scan(&self) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(job_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn put(&self, job: &Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, name, status, created_at, result, error)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET status = EXCLUDED.status,
                result = EXCLUDED.result,
                error = EXCLUDED.error,
                updated_at = NOW()
            "#,
        )
        .bind(job.id)
        .bind(&job.name)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .bind(job.result.as_deref())
        .bind(job.error.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_unique(&self, job: &Job) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (id, name, status, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(job.id)
        .bind(&job.name)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Uses the partial `status = 'queued'` index instead of a full scan.
    /// `SKIP LOCKED` keeps concurrent claimers from blocking on, or
    /// double-claiming, a row another transaction already holds.
    async fn claim_next(&self) -> Result<Option<Job>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id FROM jobs
            WHERE status = 'queued'
            ORDER BY created_at
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };
        let id: Uuid = row.try_get("id")?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE jobs
            SET status = 'processing', updated_at = NOW()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        let job = job_from_row(&row)?;

        tx.commit().await?;
        Ok(Some(job))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Counter sink on PostgreSQL. Increments are a single upsert, so concurrent
/// writers never lose updates.
#[derive(Clone)]
pub struct PgCounters {
    pool: PgPool,
}

impl PgCounters {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterSink for PgCounters {
    async fn increment(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO counters (key, value) VALUES ($1, 1)
            ON CONFLICT (key) DO UPDATE SET value = counters.value + 1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT value FROM counters WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let value: i64 = r.try_get("value")?;
                Ok(value.max(0) as u64)
            }
            None => Ok(0),
        }
    }
}
