//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! One job: crawl the dispatch board for the current default search date,
//! twice per business day. The board publishes morning dispatches around
//! 06:00 and afternoon updates around 14:00 KST, and carries no data on
//! Sundays, hence the MON-SAT schedule.

use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::routes::SyncService;

const SYNC_SCHEDULE: &str = "0 0 6,14 * * MON-SAT";

/// Start all scheduled tasks
pub async fn start_scheduler(sync: Arc<SyncService>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sync_job = Job::new_async(SYNC_SCHEDULE, move |_uuid, _lock| {
        let sync = sync.clone();
        Box::pin(async move {
            match sync.execute(None).await {
                Ok(result) => {
                    tracing::info!(
                        date = %result.date,
                        count = result.count,
                        "Scheduled sync complete"
                    );
                }
                Err(e) => {
                    tracing::error!("Scheduled sync failed: {}", e);
                }
            }
        })
    })?;

    scheduler.add(sync_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (dispatch sync at 06:00 and 14:00, Mon-Sat)");
    Ok(scheduler)
}
