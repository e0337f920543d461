//! Admin login and profile endpoints.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::common::DomainError;
use crate::domains::auth::{AdminClaims, AdminDto, LoginRequest};
use crate::server::app::AppState;

/// Bad credentials are a 401 here, not the usual 400 a validation error
/// maps to elsewhere.
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match state.auth.login(&request.email, &request.password).await {
        Ok(response) => Json(json!({ "success": true, "data": response })).into_response(),
        Err(DomainError::Validation(message)) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": message })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Who the presented token belongs to. The middleware already verified it.
pub async fn me_handler(Extension(claims): Extension<AdminClaims>) -> Json<serde_json::Value> {
    let admin = AdminDto {
        id: claims.sub,
        email: claims.email,
        name: claims.name,
    };
    Json(json!({ "success": true, "data": admin }))
}
