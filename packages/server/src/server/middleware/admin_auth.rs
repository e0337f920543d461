//! Bearer-token guard for the admin API surface.
//!
//! Unlike a public-access middleware this one rejects outright: every route
//! behind it requires a valid admin token. Verified claims land in request
//! extensions for handlers that want the caller's identity.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

use crate::domains::auth::JwtService;

pub async fn admin_auth_middleware(
    jwt: Arc<JwtService>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return unauthorized("Unauthorized: Missing token");
    };
    let Some(claims) = jwt.verify(&token) else {
        return unauthorized("Unauthorized: Invalid token");
    };

    debug!(admin_id = claims.sub, "admin request authenticated");
    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// Accepts both "Bearer <token>" and a raw token.
fn bearer_token(request: &Request<Body>) -> Option<String> {
    let header = request.headers().get("authorization")?.to_str().ok()?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header).to_string())
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let with_bearer = Request::builder()
            .header("authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&with_bearer).as_deref(), Some("abc.def.ghi"));

        let raw = Request::builder()
            .header("authorization", "abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&raw).as_deref(), Some("abc.def.ghi"));

        let missing = Request::builder().body(Body::empty()).unwrap();
        assert!(bearer_token(&missing).is_none());
    }
}
