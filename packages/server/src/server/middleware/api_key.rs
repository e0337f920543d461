//! Shared-secret guard for the manual sync endpoint. With no key configured
//! the endpoint is open, which is the development default.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub async fn api_key_middleware(
    expected: Option<String>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(expected) = expected {
        let provided = request
            .headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "Unauthorized: Invalid API key" })),
            )
                .into_response();
        }
    }
    next.run(request).await
}
