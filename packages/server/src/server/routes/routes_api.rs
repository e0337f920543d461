//! Public route search and stats endpoints. Searches answer with a bare
//! JSON array of routes; stats answer with a bare object.

use axum::extract::{Extension, Path};
use axum::Json;

use crate::common::DomainError;
use crate::domains::routes::{MonthlyRouteStats, Route, RouteStats};
use crate::server::app::AppState;

pub async fn routes_by_code_handler(
    Extension(state): Extension<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<Route>>, DomainError> {
    Ok(Json(state.search.by_line_code(&code).await?))
}

pub async fn routes_by_name_handler(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Route>>, DomainError> {
    Ok(Json(state.search.by_line_name(&name).await?))
}

pub async fn routes_by_car_handler(
    Extension(state): Extension<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Vec<Route>>, DomainError> {
    Ok(Json(state.search.by_car_number(&number).await?))
}

pub async fn routes_by_date_handler(
    Extension(state): Extension<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Route>>, DomainError> {
    Ok(Json(state.search.by_date(&date).await?))
}

pub async fn stats_handler(
    Extension(state): Extension<AppState>,
    Path(date): Path<String>,
) -> Result<Json<RouteStats>, DomainError> {
    Ok(Json(state.search.stats(&date).await?))
}

pub async fn monthly_stats_handler(
    Extension(state): Extension<AppState>,
    Path(year_month): Path<String>,
) -> Result<Json<MonthlyRouteStats>, DomainError> {
    Ok(Json(state.search.stats_by_month(&year_month).await?))
}
