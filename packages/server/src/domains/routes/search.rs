//! Read side of the route domain: the searches behind both the REST API and
//! the chatbot, with a cache in front of the store. Cache keys carry today's
//! date so yesterday's entries never shadow a fresh sync.

use std::sync::Arc;

use crate::common::{DomainError, SearchDate, YearMonth};
use crate::kernel::MemoryCache;

use super::models::{MonthlyRouteStats, Route, RouteStats};
use super::store::RouteStore;

const SEARCH_LIMIT: i64 = 50;

pub struct SearchService {
    routes: Arc<dyn RouteStore>,
    cache: Arc<MemoryCache>,
}

impl SearchService {
    pub fn new(routes: Arc<dyn RouteStore>, cache: Arc<MemoryCache>) -> Self {
        Self { routes, cache }
    }

    pub async fn by_line_code(&self, code: &str) -> Result<Vec<Route>, DomainError> {
        let code = normalized(code)?;
        self.cached(&format!("routes:byCode:{code}:{}", SearchDate::today()), || {
            self.routes.find_by_line_code(&code, SEARCH_LIMIT)
        })
        .await
    }

    pub async fn by_line_name(&self, name: &str) -> Result<Vec<Route>, DomainError> {
        let name = normalized(name)?;
        self.cached(&format!("routes:byName:{name}:{}", SearchDate::today()), || {
            self.routes.find_by_line_name(&name, SEARCH_LIMIT)
        })
        .await
    }

    pub async fn by_car_number(&self, car_number: &str) -> Result<Vec<Route>, DomainError> {
        let car_number = normalized(car_number)?;
        self.cached(
            &format!("routes:byCar:{car_number}:{}", SearchDate::today()),
            || self.routes.find_by_car_number(&car_number, SEARCH_LIMIT),
        )
        .await
    }

    pub async fn by_date(&self, date: &str) -> Result<Vec<Route>, DomainError> {
        let date = SearchDate::parse(date)?.to_string();
        self.cached(&format!("routes:byDate:{date}:{date}"), || {
            self.routes.find_by_date(&date)
        })
        .await
    }

    pub async fn stats(&self, date: &str) -> Result<RouteStats, DomainError> {
        let date = SearchDate::parse(date)?.to_string();
        if let Some(hit) = self.cache.get(&format!("stats:{date}")) {
            return Ok(hit);
        }
        let stats = self.routes.stats_by_date(&date).await?;
        self.cache.set(&format!("stats:{date}"), &stats, None);
        Ok(stats)
    }

    pub async fn stats_by_month(&self, year_month: &str) -> Result<MonthlyRouteStats, DomainError> {
        let month = YearMonth::parse(year_month)?.to_string();
        self.routes.stats_by_month(&month).await
    }

    async fn cached<F, Fut>(&self, key: &str, fetch: F) -> Result<Vec<Route>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<Route>, DomainError>>,
    {
        if let Some(hit) = self.cache.get(key) {
            return Ok(hit);
        }
        let routes = fetch().await?;
        self.cache.set(key, &routes, None);
        Ok(routes)
    }
}

fn normalized(term: &str) -> Result<String, DomainError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(DomainError::Validation(
            "search term must not be empty".to_string(),
        ));
    }
    Ok(term.to_string())
}
