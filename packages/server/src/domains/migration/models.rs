//! Migration job state: a date-range backfill of the dispatch board, tracked
//! day by day so a restarted or cancelled job shows exactly how far it got.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::DomainError;

/// Lifecycle of a backfill job. `Pending` and `Running` are the two active
/// states; at most one active job exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(DomainError::Internal(anyhow::anyhow!(
                "unknown job status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationJob {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub status: JobStatus,
    /// The day the runner is currently crawling, `YYYYMMDD`.
    pub current_date: Option<String>,
    pub total_days: i32,
    pub completed_days: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MigrationJob {
    /// A fresh pending job. The store assigns the real id and timestamps on
    /// create; the zero id never leaves the store layer.
    pub fn pending(start_date: &str, end_date: &str, total_days: i32) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            status: JobStatus::Pending,
            current_date: None,
            total_days,
            completed_days: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whole-percent progress, rounded. Zero when the job has no days.
    pub fn progress_percent(&self) -> i32 {
        if self.total_days <= 0 {
            return 0;
        }
        ((self.completed_days as f64 / self.total_days as f64) * 100.0).round() as i32
    }
}

/// API shape of a job, with derived progress included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationJobDto {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub status: JobStatus,
    pub current_date: Option<String>,
    pub total_days: i32,
    pub completed_days: i32,
    pub progress_percent: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&MigrationJob> for MigrationJobDto {
    fn from(job: &MigrationJob) -> Self {
        Self {
            id: job.id,
            start_date: job.start_date.clone(),
            end_date: job.end_date.clone(),
            status: job.status,
            current_date: job.current_date.clone(),
            total_days: job.total_days,
            completed_days: job.completed_days,
            progress_percent: job.progress_percent(),
            error_message: job.error_message.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<JobStatus>().unwrap(), status);
        }
        assert!("paused".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_active_vs_terminal() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::Running.is_active());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_progress_percent_rounds() {
        let mut job = MigrationJob::pending("20260101", "20260103", 3);
        assert_eq!(job.progress_percent(), 0);
        job.completed_days = 1;
        assert_eq!(job.progress_percent(), 33);
        job.completed_days = 2;
        assert_eq!(job.progress_percent(), 67);
        job.completed_days = 3;
        assert_eq!(job.progress_percent(), 100);
    }

    #[test]
    fn test_progress_percent_zero_days() {
        let job = MigrationJob::pending("20260101", "20260101", 0);
        assert_eq!(job.progress_percent(), 0);
    }
}
