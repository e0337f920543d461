//! Admin endpoints for the migration runner. All of these sit behind the
//! admin bearer-token middleware.

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::DomainError;
use crate::domains::migration::MigrationJobDto;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMigrationRequest {
    pub start_date: String,
    pub end_date: String,
}

pub async fn start_migration_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<StartMigrationRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let job = state
        .runner
        .start(&request.start_date, &request.end_date)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": MigrationJobDto::from(&job) })),
    ))
}

pub async fn list_migrations_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, DomainError> {
    let jobs = state.runner.get_all_jobs().await?;
    let dtos: Vec<MigrationJobDto> = jobs.iter().map(MigrationJobDto::from).collect();
    Ok(Json(json!({ "success": true, "data": dtos })))
}

pub async fn active_migration_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, DomainError> {
    let job = state.runner.get_active_job().await?;
    Ok(Json(json!({
        "success": true,
        "data": job.as_ref().map(MigrationJobDto::from),
    })))
}

pub async fn get_migration_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, DomainError> {
    let job = state.runner.get_job(id).await?;
    Ok(Json(
        json!({ "success": true, "data": MigrationJobDto::from(&job) }),
    ))
}

pub async fn cancel_migration_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, DomainError> {
    let job = state.runner.cancel(id).await?;
    Ok(Json(
        json!({ "success": true, "data": MigrationJobDto::from(&job) }),
    ))
}
