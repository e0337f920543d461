//! Pulls the dispatch board for one day and lands it in the route store.
//! Used by the cron schedule, the manual `/api/sync` endpoint and the
//! startup sync.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::common::{DomainError, SearchDate};
use crate::kernel::{CrawlOptions, Crawler, MemoryCache};

use super::store::RouteStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub count: u64,
    pub date: String,
}

pub struct SyncService {
    crawler: Arc<dyn Crawler>,
    routes: Arc<dyn RouteStore>,
    cache: Arc<MemoryCache>,
}

impl SyncService {
    pub fn new(
        crawler: Arc<dyn Crawler>,
        routes: Arc<dyn RouteStore>,
        cache: Arc<MemoryCache>,
    ) -> Self {
        Self {
            crawler,
            routes,
            cache,
        }
    }

    /// Crawl one search date (default: the date the board currently shows)
    /// and upsert whatever came back. Stale cache entries for that date are
    /// dropped so the next search sees fresh data.
    pub async fn execute(&self, date: Option<&str>) -> Result<SyncResult, DomainError> {
        let date = match date {
            Some(raw) => SearchDate::parse(raw)?,
            None => SearchDate::default_for_crawling(),
        };
        let date = date.to_string();

        let records = self.crawler.crawl(&date, &CrawlOptions::default()).await?;
        let count = if records.is_empty() {
            info!(%date, "sync found no dispatch records");
            0
        } else {
            self.routes.upsert_many(&records).await?
        };

        self.cache.invalidate_pattern(&format!("routes:*:{date}"));
        self.cache.delete(&format!("stats:{date}"));

        info!(%date, count, "sync complete");
        Ok(SyncResult { count, date })
    }
}
