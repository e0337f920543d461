use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Domain error taxonomy. Every service operation surfaces one of these;
/// the HTTP layer maps them to status codes via `IntoResponse`.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed input (bad date string, empty field, bad credentials).
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    /// A second migration start while one is active.
    #[error("{0}")]
    Conflict(String),

    /// Cancel requested on an already-terminal job.
    #[error("job is not active")]
    NotActive,

    #[error("crawling failed: {0}")]
    Crawling(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    fn status(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) | DomainError::NotActive => StatusCode::CONFLICT,
            DomainError::Crawling(_) => StatusCode::BAD_GATEWAY,
            DomainError::Database(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}
