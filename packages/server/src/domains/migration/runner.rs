//! The migration runner: backfills the route store over an inclusive date
//! range, one crawled day at a time.
//!
//! # Lifecycle
//!
//! ```text
//! start(range)
//!     │ validate range, claim the single active slot (store enforces it)
//!     ├─► job persisted as `pending`, returned to the caller immediately
//!     └─► spawned task: pending ─► running ─► completed
//!                                    │
//!                                    ├─ cancel(id) flips the row; the task
//!                                    │  re-reads it before every day and
//!                                    │  stops at the next boundary
//!                                    └─ a whole-job error lands in `failed`
//!                                       with the message on the row
//! ```
//!
//! A single day failing to crawl does not fail the job; the day is skipped
//! and the loop moves on, so `completed_days` can end below `total_days` on
//! a job that still finishes as `completed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::common::{DomainError, SearchDate};
use crate::domains::routes::RouteStore;
use crate::kernel::{CrawlOptions, Crawler};

use super::models::{JobStatus, MigrationJob};
use super::store::JobStore;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Pause between crawled days, to stay polite to the dispatch site.
    pub day_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            day_delay: Duration::from_millis(1000),
        }
    }
}

pub struct MigrationRunner {
    jobs: Arc<dyn JobStore>,
    crawler: Arc<dyn Crawler>,
    routes: Arc<dyn RouteStore>,
    config: RunnerConfig,
    running: AtomicBool,
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl MigrationRunner {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        crawler: Arc<dyn Crawler>,
        routes: Arc<dyn RouteStore>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            jobs,
            crawler,
            routes,
            config,
            running: AtomicBool::new(false),
            task: tokio::sync::Mutex::new(None),
        }
    }

    /// Validate the range, claim the active slot and kick off the backfill.
    /// Returns the pending job; progress is observed through `get_job`.
    pub async fn start(
        self: &Arc<Self>,
        start_date: &str,
        end_date: &str,
    ) -> Result<MigrationJob, DomainError> {
        let start = SearchDate::parse(start_date)?;
        let end = SearchDate::parse(end_date)?;
        let days = start.days_until(end);
        if days < 1 {
            return Err(DomainError::Validation(
                "start date must not be after end date".to_string(),
            ));
        }

        if self.jobs.find_active().await?.is_some() {
            return Err(DomainError::Conflict(
                "migration job is already running".to_string(),
            ));
        }

        // The store re-checks atomically; the early check above just gives a
        // cleaner error under no contention.
        let job = self
            .jobs
            .create(MigrationJob::pending(
                &start.to_string(),
                &end.to_string(),
                days as i32,
            ))
            .await?;

        info!(
            job_id = job.id,
            start = %job.start_date,
            end = %job.end_date,
            total_days = job.total_days,
            "migration job created"
        );
        self.spawn_execution(job.clone()).await;
        Ok(job)
    }

    async fn spawn_execution(self: &Arc<Self>, job: MigrationJob) {
        if self.running.swap(true, Ordering::SeqCst) {
            // The store's active-slot claim should make this unreachable.
            warn!(job_id = job.id, "runner busy, job left pending");
            return;
        }
        let runner = self.clone();
        let handle = tokio::spawn(async move {
            runner.run_to_completion(job).await;
        });
        let mut task = self.task.lock().await;
        *task = Some(handle);
    }

    async fn run_to_completion(&self, job: MigrationJob) {
        let job_id = job.id;
        if let Err(e) = self.execute(job).await {
            error!(job_id, "migration job failed: {e}");
            match self.jobs.find_by_id(job_id).await {
                Ok(Some(mut failed)) => {
                    failed.status = JobStatus::Failed;
                    failed.error_message = Some(e.to_string());
                    if let Err(update_err) = self.jobs.update(&failed).await {
                        error!(job_id, "could not record job failure: {update_err}");
                    }
                }
                Ok(None) => warn!(job_id, "failed job no longer exists"),
                Err(find_err) => error!(job_id, "could not load failed job: {find_err}"),
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }

    async fn execute(&self, job: MigrationJob) -> Result<(), DomainError> {
        // The snapshot handed to the spawned task is stale by now; re-read
        // before the pending -> running flip so a cancel issued right after
        // creation is never overwritten.
        let mut job = match self.jobs.find_by_id(job.id).await? {
            None => {
                warn!(job_id = job.id, "job disappeared before starting");
                return Ok(());
            }
            Some(current) if current.status == JobStatus::Cancelled => {
                info!(job_id = job.id, "job cancelled before starting");
                return Ok(());
            }
            Some(current) => current,
        };
        job.status = JobStatus::Running;
        self.jobs.update(&job).await?;

        let start = SearchDate::parse(&job.start_date)?;
        let end = SearchDate::parse(&job.end_date)?;

        for day in start.iter_through(end) {
            // Re-read before every day so an external cancel (or a deleted
            // row) stops the loop at the next day boundary.
            match self.jobs.find_by_id(job.id).await? {
                None => {
                    warn!(job_id = job.id, "job disappeared mid-run, stopping");
                    break;
                }
                Some(current) if current.status == JobStatus::Cancelled => {
                    info!(job_id = job.id, "job cancelled, stopping");
                    break;
                }
                Some(current) => job = current,
            }

            job.current_date = Some(day.to_string());
            self.jobs.update(&job).await?;

            match self.crawl_day(day).await {
                Ok(count) => {
                    // Re-read before writing progress: a cancel that landed
                    // while the day was crawling must not be overwritten.
                    match self.jobs.find_by_id(job.id).await? {
                        None => break,
                        Some(current) => job = current,
                    }
                    job.completed_days += 1;
                    self.jobs.update(&job).await?;
                    info!(
                        job_id = job.id,
                        date = %day,
                        routes = count,
                        completed_days = job.completed_days,
                        total_days = job.total_days,
                        "migrated day"
                    );
                }
                Err(e) => {
                    warn!(job_id = job.id, date = %day, "day failed, skipping: {e}");
                }
            }

            tokio::time::sleep(self.config.day_delay).await;
        }

        // Only a job that is still running earned `completed`; a cancel that
        // raced the last day keeps its `cancelled` status.
        if let Some(mut finished) = self.jobs.find_by_id(job.id).await? {
            if finished.status == JobStatus::Running {
                finished.status = JobStatus::Completed;
                self.jobs.update(&finished).await?;
                info!(
                    job_id = finished.id,
                    completed_days = finished.completed_days,
                    total_days = finished.total_days,
                    "migration job completed"
                );
            }
        }
        Ok(())
    }

    async fn crawl_day(&self, day: SearchDate) -> Result<u64, DomainError> {
        let records = self
            .crawler
            .crawl(&day.to_string(), &CrawlOptions::default())
            .await?;
        if records.is_empty() {
            return Ok(0);
        }
        self.routes.upsert_many(&records).await
    }

    pub async fn get_job(&self, id: i64) -> Result<MigrationJob, DomainError> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("migration job {id}")))
    }

    pub async fn get_all_jobs(&self) -> Result<Vec<MigrationJob>, DomainError> {
        self.jobs.find_all().await
    }

    pub async fn get_active_job(&self) -> Result<Option<MigrationJob>, DomainError> {
        self.jobs.find_active().await
    }

    /// Flip an active job to `cancelled`. The running task notices at its
    /// next day boundary; the flipped row is returned right away.
    pub async fn cancel(&self, id: i64) -> Result<MigrationJob, DomainError> {
        let mut job = self.get_job(id).await?;
        if job.status.is_terminal() {
            return Err(DomainError::NotActive);
        }
        job.status = JobStatus::Cancelled;
        self.jobs.update(&job).await?;
        info!(job_id = id, "migration job cancelled");
        self.get_job(id).await
    }

    /// Wait for an in-flight job task to wind down. Called on server
    /// shutdown so a half-written day is not abandoned mid-upsert.
    pub async fn shutdown(&self) {
        let handle = {
            let mut task = self.task.lock().await;
            task.take()
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("migration task panicked: {e}");
            }
        }
    }
}
