//! Manual sync trigger, guarded by the optional API key middleware.

use axum::extract::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::DomainError;
use crate::server::app::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    /// Defaults to the date the dispatch board currently shows.
    pub date: Option<String>,
}

pub async fn sync_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<SyncRequest>>,
) -> Result<Json<Value>, DomainError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let result = state.sync.execute(request.date.as_deref()).await?;
    Ok(Json(json!({
        "success": true,
        "count": result.count,
        "date": result.date,
    })))
}
