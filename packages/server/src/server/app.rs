//! Application setup and router wiring.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::{AuthService, JwtService};
use crate::domains::migration::MigrationRunner;
use crate::domains::routes::{SearchService, SyncService};
use crate::server::middleware::{admin_auth_middleware, api_key_middleware};
use crate::server::routes::{
    active_migration_handler, cancel_migration_handler, get_migration_handler, health_handler,
    kakao_skill_handler, list_migrations_handler, login_handler, me_handler,
    monthly_stats_handler, routes_by_car_handler, routes_by_code_handler, routes_by_date_handler,
    routes_by_name_handler, start_migration_handler, stats_handler, sync_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Absent in embedded and test setups; health reports it as skipped.
    pub db_pool: Option<PgPool>,
    pub search: Arc<SearchService>,
    pub sync: Arc<SyncService>,
    pub auth: Arc<AuthService>,
    pub runner: Arc<MigrationRunner>,
    pub jwt: Arc<JwtService>,
}

/// Build the Axum application router.
///
/// Three surfaces with three guards: public search and chatbot routes, the
/// manual sync behind the optional API key, and the migration/admin routes
/// behind admin bearer tokens.
pub fn build_app(state: AppState, api_key: Option<String>) -> Router {
    let jwt = state.jwt.clone();
    let admin_routes = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route(
            "/api/migration",
            post(start_migration_handler).get(list_migrations_handler),
        )
        .route("/api/migration/active", get(active_migration_handler))
        .route("/api/migration/:id", get(get_migration_handler))
        .route("/api/migration/:id/cancel", post(cancel_migration_handler))
        .layer(middleware::from_fn(move |req, next| {
            admin_auth_middleware(jwt.clone(), req, next)
        }));

    let sync_routes = Router::new()
        .route("/api/sync", post(sync_handler))
        .layer(middleware::from_fn(move |req, next| {
            api_key_middleware(api_key.clone(), req, next)
        }));

    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/api/routes/code/:code", get(routes_by_code_handler))
        .route("/api/routes/name/:name", get(routes_by_name_handler))
        .route("/api/routes/car/:number", get(routes_by_car_handler))
        .route("/api/routes/date/:date", get(routes_by_date_handler))
        .route("/api/stats/month/:year_month", get(monthly_stats_handler))
        .route("/api/stats/:date", get(stats_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/kakao/skill", post(kakao_skill_handler));

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(sync_routes)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
