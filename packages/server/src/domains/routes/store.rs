//! Route persistence: the `RouteStore` trait with a Postgres implementation
//! for production and an in-memory implementation for tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::models::{MonthlyRouteStats, NewRoute, Route, RouteStats};
use crate::common::DomainError;

#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Substring match on line code, newest search date first.
    async fn find_by_line_code(&self, code: &str, limit: i64) -> Result<Vec<Route>, DomainError>;

    /// Substring match on line name, newest search date first.
    async fn find_by_line_name(&self, name: &str, limit: i64) -> Result<Vec<Route>, DomainError>;

    /// Substring match on car number, newest search date first.
    async fn find_by_car_number(
        &self,
        car_number: &str,
        limit: i64,
    ) -> Result<Vec<Route>, DomainError>;

    /// All records for one search date, ordered by line code.
    async fn find_by_date(&self, date: &str) -> Result<Vec<Route>, DomainError>;

    async fn find_recent(&self, limit: i64) -> Result<Vec<Route>, DomainError>;

    async fn stats_by_date(&self, date: &str) -> Result<RouteStats, DomainError>;

    /// Per-day totals for every search date starting with `year_month`.
    async fn stats_by_month(&self, year_month: &str) -> Result<MonthlyRouteStats, DomainError>;

    /// Insert or replace on (search_date, line_code). Returns rows written.
    async fn upsert_many(&self, routes: &[NewRoute]) -> Result<u64, DomainError>;
}

// =============================================================================
// Postgres implementation
// =============================================================================

pub struct PgRouteStore {
    pool: PgPool,
}

impl PgRouteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_containing(
        &self,
        column: &str,
        term: &str,
        limit: i64,
    ) -> Result<Vec<Route>, DomainError> {
        // `column` is one of three hardcoded names, never user input.
        let sql = format!(
            "SELECT * FROM routes WHERE {column} LIKE '%' || $1 || '%' \
             ORDER BY search_date DESC, line_code ASC LIMIT $2"
        );
        let routes = sqlx::query_as::<_, Route>(&sql)
            .bind(term)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(routes)
    }
}

#[async_trait]
impl RouteStore for PgRouteStore {
    async fn find_by_line_code(&self, code: &str, limit: i64) -> Result<Vec<Route>, DomainError> {
        self.find_containing("line_code", code, limit).await
    }

    async fn find_by_line_name(&self, name: &str, limit: i64) -> Result<Vec<Route>, DomainError> {
        self.find_containing("line_name", name, limit).await
    }

    async fn find_by_car_number(
        &self,
        car_number: &str,
        limit: i64,
    ) -> Result<Vec<Route>, DomainError> {
        self.find_containing("car_number", car_number, limit).await
    }

    async fn find_by_date(&self, date: &str) -> Result<Vec<Route>, DomainError> {
        let routes = sqlx::query_as::<_, Route>(
            "SELECT * FROM routes WHERE search_date = $1 ORDER BY line_code ASC",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(routes)
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<Route>, DomainError> {
        let routes = sqlx::query_as::<_, Route>(
            "SELECT * FROM routes ORDER BY search_date DESC, line_code ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(routes)
    }

    async fn stats_by_date(&self, date: &str) -> Result<RouteStats, DomainError> {
        let stats = sqlx::query_as::<_, RouteStats>(
            r#"
            SELECT COUNT(*)                       AS total_routes,
                   COALESCE(SUM(count), 0)        AS total_count,
                   COALESCE(SUM(quantity), 0)     AS total_quantity,
                   COALESCE(SUM(section_fare), 0) AS total_section_fare,
                   COALESCE(SUM(total_fare), 0)   AS total_fare
            FROM routes
            WHERE search_date = $1
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn stats_by_month(&self, year_month: &str) -> Result<MonthlyRouteStats, DomainError> {
        #[derive(sqlx::FromRow)]
        struct DayRow {
            search_date: String,
            #[sqlx(flatten)]
            stats: RouteStats,
        }

        let rows = sqlx::query_as::<_, DayRow>(
            r#"
            SELECT search_date,
                   COUNT(*)                       AS total_routes,
                   COALESCE(SUM(count), 0)        AS total_count,
                   COALESCE(SUM(quantity), 0)     AS total_quantity,
                   COALESCE(SUM(section_fare), 0) AS total_section_fare,
                   COALESCE(SUM(total_fare), 0)   AS total_fare
            FROM routes
            WHERE search_date LIKE $1 || '%'
            GROUP BY search_date
            ORDER BY search_date ASC
            "#,
        )
        .bind(year_month)
        .fetch_all(&self.pool)
        .await?;

        let mut monthly = MonthlyRouteStats::default();
        for row in rows {
            monthly.days.insert(row.search_date, row.stats);
        }
        Ok(monthly)
    }

    async fn upsert_many(&self, routes: &[NewRoute]) -> Result<u64, DomainError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;
        for route in routes {
            let result = sqlx::query(
                r#"
                INSERT INTO routes
                    (search_date, line_code, line_name, car_code, car_number,
                     count, quantity, section_fare, total_fare)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (search_date, line_code) DO UPDATE SET
                    line_name = EXCLUDED.line_name,
                    car_code = EXCLUDED.car_code,
                    car_number = EXCLUDED.car_number,
                    count = EXCLUDED.count,
                    quantity = EXCLUDED.quantity,
                    section_fare = EXCLUDED.section_fare,
                    total_fare = EXCLUDED.total_fare
                "#,
            )
            .bind(&route.search_date)
            .bind(&route.line_code)
            .bind(&route.line_name)
            .bind(&route.car_code)
            .bind(&route.car_number)
            .bind(route.count)
            .bind(route.quantity)
            .bind(route.section_fare)
            .bind(route.total_fare)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }
}

// =============================================================================
// In-memory implementation (tests, embedding)
// =============================================================================

#[derive(Default)]
pub struct MemoryRouteStore {
    routes: Mutex<Vec<Route>>,
    next_id: AtomicI64,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, predicate: impl Fn(&Route) -> bool, limit: i64) -> Vec<Route> {
        let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let mut hits: Vec<Route> = routes.iter().filter(|r| predicate(r)).cloned().collect();
        hits.sort_by(|a, b| {
            b.search_date
                .cmp(&a.search_date)
                .then(a.line_code.cmp(&b.line_code))
        });
        hits.truncate(limit as usize);
        hits
    }

    fn stats_of(routes: &[&Route]) -> RouteStats {
        RouteStats {
            total_routes: routes.len() as i64,
            total_count: routes.iter().map(|r| r.count as i64).sum(),
            total_quantity: routes.iter().map(|r| r.quantity as i64).sum(),
            total_section_fare: routes.iter().map(|r| r.section_fare).sum(),
            total_fare: routes.iter().map(|r| r.total_fare).sum(),
        }
    }
}

#[async_trait]
impl RouteStore for MemoryRouteStore {
    async fn find_by_line_code(&self, code: &str, limit: i64) -> Result<Vec<Route>, DomainError> {
        let code = code.to_string();
        Ok(self.matching(move |r| r.line_code.contains(&code), limit))
    }

    async fn find_by_line_name(&self, name: &str, limit: i64) -> Result<Vec<Route>, DomainError> {
        let name = name.to_string();
        Ok(self.matching(
            move |r| r.line_name.as_deref().is_some_and(|n| n.contains(&name)),
            limit,
        ))
    }

    async fn find_by_car_number(
        &self,
        car_number: &str,
        limit: i64,
    ) -> Result<Vec<Route>, DomainError> {
        let car_number = car_number.to_string();
        Ok(self.matching(
            move |r| {
                r.car_number
                    .as_deref()
                    .is_some_and(|n| n.contains(&car_number))
            },
            limit,
        ))
    }

    async fn find_by_date(&self, date: &str) -> Result<Vec<Route>, DomainError> {
        let date = date.to_string();
        Ok(self.matching(move |r| r.search_date == date, i64::MAX))
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<Route>, DomainError> {
        Ok(self.matching(|_| true, limit))
    }

    async fn stats_by_date(&self, date: &str) -> Result<RouteStats, DomainError> {
        let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let day: Vec<&Route> = routes.iter().filter(|r| r.search_date == date).collect();
        Ok(Self::stats_of(&day))
    }

    async fn stats_by_month(&self, year_month: &str) -> Result<MonthlyRouteStats, DomainError> {
        let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let mut monthly = MonthlyRouteStats::default();
        let mut dates: Vec<String> = routes
            .iter()
            .filter(|r| r.search_date.starts_with(year_month))
            .map(|r| r.search_date.clone())
            .collect();
        dates.sort();
        dates.dedup();
        for date in dates {
            let day: Vec<&Route> = routes.iter().filter(|r| r.search_date == date).collect();
            monthly.days.insert(date, Self::stats_of(&day));
        }
        Ok(monthly)
    }

    async fn upsert_many(&self, new_routes: &[NewRoute]) -> Result<u64, DomainError> {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        for new_route in new_routes {
            let existing = routes.iter_mut().find(|r| {
                r.search_date == new_route.search_date && r.line_code == new_route.line_code
            });
            match existing {
                Some(route) => {
                    route.line_name = new_route.line_name.clone();
                    route.car_code = new_route.car_code.clone();
                    route.car_number = new_route.car_number.clone();
                    route.count = new_route.count;
                    route.quantity = new_route.quantity;
                    route.section_fare = new_route.section_fare;
                    route.total_fare = new_route.total_fare;
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                    routes.push(Route {
                        id,
                        search_date: new_route.search_date.clone(),
                        line_code: new_route.line_code.clone(),
                        line_name: new_route.line_name.clone(),
                        car_code: new_route.car_code.clone(),
                        car_number: new_route.car_number.clone(),
                        count: new_route.count,
                        quantity: new_route.quantity,
                        section_fare: new_route.section_fare,
                        total_fare: new_route.total_fare,
                        created_at: Utc::now(),
                    });
                }
            }
        }
        Ok(new_routes.len() as u64)
    }
}
