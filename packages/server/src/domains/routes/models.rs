use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Route - one scraped dispatch record: a line (route) with its assigned car
/// and fares for a given search date. Natural key: (search_date, line_code).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: i64,
    pub search_date: String,
    pub line_code: String,
    pub line_name: Option<String>,
    pub car_code: Option<String>,
    pub car_number: Option<String>,
    pub count: i32,
    pub quantity: i32,
    pub section_fare: i64,
    pub total_fare: i64,
    pub created_at: DateTime<Utc>,
}

/// A record as produced by the crawler, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoute {
    pub search_date: String,
    pub line_code: String,
    pub line_name: Option<String>,
    pub car_code: Option<String>,
    pub car_number: Option<String>,
    pub count: i32,
    pub quantity: i32,
    pub section_fare: i64,
    pub total_fare: i64,
}

/// Aggregate totals for one search date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub total_routes: i64,
    pub total_count: i64,
    pub total_quantity: i64,
    pub total_section_fare: i64,
    pub total_fare: i64,
}

/// Per-day totals for a whole month, keyed by `YYYYMMDD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyRouteStats {
    pub days: BTreeMap<String, RouteStats>,
}
