//! Test doubles: crawlers with scripted or gated behavior, and a job store
//! wrapper that fails on demand.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use dispatch_core::common::DomainError;
use dispatch_core::domains::migration::{JobStore, MigrationJob};
use dispatch_core::domains::routes::NewRoute;
use dispatch_core::kernel::{CrawlOptions, Crawler};

pub fn sample_route(date: &str, code: &str) -> NewRoute {
    NewRoute {
        search_date: date.to_string(),
        line_code: code.to_string(),
        line_name: Some("서울-부산".to_string()),
        car_code: Some("0012".to_string()),
        car_number: Some("서울80아1234".to_string()),
        count: 3,
        quantity: 12,
        section_fare: 150_000,
        total_fare: 1_250_000,
    }
}

/// Crawler that returns one record per day, except for dates scripted to
/// fail, which answer with a crawling error.
pub struct ScriptedCrawler {
    pub fail_dates: HashSet<String>,
    pub empty: bool,
    pub crawled: Mutex<Vec<String>>,
}

impl ScriptedCrawler {
    pub fn new() -> Self {
        Self {
            fail_dates: HashSet::new(),
            empty: false,
            crawled: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(dates: &[&str]) -> Self {
        let mut crawler = Self::new();
        crawler.fail_dates = dates.iter().map(|d| d.to_string()).collect();
        crawler
    }

    pub fn empty() -> Self {
        let mut crawler = Self::new();
        crawler.empty = true;
        crawler
    }

    pub fn crawled_dates(&self) -> Vec<String> {
        self.crawled.lock().unwrap().clone()
    }
}

#[async_trait]
impl Crawler for ScriptedCrawler {
    async fn crawl(
        &self,
        date: &str,
        _options: &CrawlOptions,
    ) -> Result<Vec<NewRoute>, DomainError> {
        self.crawled.lock().unwrap().push(date.to_string());
        if self.fail_dates.contains(date) {
            return Err(DomainError::Crawling(format!("no response for {date}")));
        }
        if self.empty {
            return Ok(Vec::new());
        }
        Ok(vec![sample_route(date, "101102")])
    }
}

/// Crawler that blocks until the test hands out a permit, one per crawled
/// day. Lets tests stop a migration at an exact day boundary.
pub struct GatedCrawler {
    gate: Semaphore,
}

impl GatedCrawler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
        })
    }

    pub fn allow_days(&self, days: usize) {
        self.gate.add_permits(days);
    }
}

#[async_trait]
impl Crawler for GatedCrawler {
    async fn crawl(
        &self,
        date: &str,
        _options: &CrawlOptions,
    ) -> Result<Vec<NewRoute>, DomainError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| DomainError::Crawling("gate closed".to_string()))?;
        permit.forget();
        Ok(vec![sample_route(date, "101102")])
    }
}

/// Job store wrapper that fails exactly one `update` call, chosen by its
/// ordinal. Used to drive a job into the failed state.
pub struct FlakyJobStore {
    inner: Arc<dyn JobStore>,
    fail_update_call: u32,
    update_calls: AtomicU32,
}

impl FlakyJobStore {
    pub fn failing_update(inner: Arc<dyn JobStore>, call: u32) -> Self {
        Self {
            inner,
            fail_update_call: call,
            update_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl JobStore for FlakyJobStore {
    async fn create(&self, job: MigrationJob) -> Result<MigrationJob, DomainError> {
        self.inner.create(job).await
    }

    async fn update(&self, job: &MigrationJob) -> Result<(), DomainError> {
        let call = self.update_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_update_call {
            return Err(DomainError::Internal(anyhow::anyhow!(
                "simulated store outage"
            )));
        }
        self.inner.update(job).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MigrationJob>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_active(&self) -> Result<Option<MigrationJob>, DomainError> {
        self.inner.find_active().await
    }

    async fn find_all(&self) -> Result<Vec<MigrationJob>, DomainError> {
        self.inner.find_all().await
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        self.inner.delete(id).await
    }
}
