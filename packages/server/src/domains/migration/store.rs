//! Persistence for migration jobs.
//!
//! The "at most one active job" rule is enforced here, not in the runner:
//! Postgres carries a partial unique index over active rows, so two racing
//! `create` calls cannot both claim the slot. The in-memory store does the
//! same check under its lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::DomainError;

use super::models::MigrationJob;

const ACTIVE_SLOT_INDEX: &str = "one_active_migration_job";

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job, claiming the single active slot. Fails with
    /// `Conflict` when another job is pending or running.
    async fn create(&self, job: MigrationJob) -> Result<MigrationJob, DomainError>;

    /// Write back mutable job state (status, progress, error message).
    async fn update(&self, job: &MigrationJob) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<MigrationJob>, DomainError>;

    async fn find_active(&self) -> Result<Option<MigrationJob>, DomainError>;

    /// Every job, newest first.
    async fn find_all(&self) -> Result<Vec<MigrationJob>, DomainError>;

    /// Remove a job row. A running loop notices the missing row at its next
    /// day boundary and stops. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;
}

// =============================================================================
// Postgres implementation
// =============================================================================

// `current_date` is reserved in Postgres, so the column is `current_day`
// and this row struct does the renaming.
#[derive(sqlx::FromRow)]
struct JobRow {
    id: i64,
    start_date: String,
    end_date: String,
    status: String,
    current_day: Option<String>,
    total_days: i32,
    completed_days: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for MigrationJob {
    type Error = DomainError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(MigrationJob {
            id: row.id,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status.parse()?,
            current_date: row.current_day,
            total_days: row.total_days,
            completed_days: row.completed_days,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

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
    async fn create(&self, job: MigrationJob) -> Result<MigrationJob, DomainError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO migration_jobs
                (start_date, end_date, status, current_day, total_days,
                 completed_days, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&job.start_date)
        .bind(&job.end_date)
        .bind(job.status.to_string())
        .bind(&job.current_date)
        .bind(job.total_days)
        .bind(job.completed_days)
        .bind(&job.error_message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some(ACTIVE_SLOT_INDEX) => {
                DomainError::Conflict("migration job is already running".to_string())
            }
            _ => DomainError::Database(e),
        })?;
        row.try_into()
    }

    async fn update(&self, job: &MigrationJob) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE migration_jobs
            SET status = $2,
                current_day = $3,
                completed_days = $4,
                error_message = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(job.status.to_string())
        .bind(&job.current_date)
        .bind(job.completed_days)
        .bind(&job.error_message)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("migration job {}", job.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MigrationJob>, DomainError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM migration_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(MigrationJob::try_from).transpose()
    }

    async fn find_active(&self) -> Result<Option<MigrationJob>, DomainError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM migration_jobs
            WHERE status IN ('pending', 'running')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(MigrationJob::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<MigrationJob>, DomainError> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM migration_jobs ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MigrationJob::try_from).collect()
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM migration_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// In-memory implementation (tests, embedding)
// =============================================================================

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<i64, MigrationJob>>,
    next_id: AtomicI64,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, mut job: MigrationJob) -> Result<MigrationJob, DomainError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        if jobs.values().any(|j| j.status.is_active()) {
            return Err(DomainError::Conflict(
                "migration job is already running".to_string(),
            ));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        job.id = id;
        let now = Utc::now();
        job.created_at = now;
        job.updated_at = now;
        jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn update(&self, job: &MigrationJob) -> Result<(), DomainError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let Some(stored) = jobs.get_mut(&job.id) else {
            return Err(DomainError::NotFound(format!("migration job {}", job.id)));
        };
        stored.status = job.status;
        stored.current_date = job.current_date.clone();
        stored.completed_days = job.completed_days;
        stored.error_message = job.error_message.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MigrationJob>, DomainError> {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(jobs.get(&id).cloned())
    }

    async fn find_active(&self) -> Result<Option<MigrationJob>, DomainError> {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(jobs
            .values()
            .filter(|j| j.status.is_active())
            .max_by_key(|j| (j.created_at, j.id))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<MigrationJob>, DomainError> {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<MigrationJob> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(jobs.remove(&id).is_some())
    }
}
