//! In-memory application harness. Every collaborator has a memory-backed
//! implementation, so the full router and the migration runner run in tests
//! with no database or network.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use dispatch_core::domains::auth::{
    password, AdminStore, AuthService, JwtService, MemoryAdminStore,
};
use dispatch_core::domains::migration::{
    JobStore, MemoryJobStore, MigrationJob, MigrationRunner, RunnerConfig,
};
use dispatch_core::domains::routes::{MemoryRouteStore, SearchService, SyncService};
use dispatch_core::kernel::{Crawler, MemoryCache};
use dispatch_core::server::{build_app, AppState};

pub const TEST_ADMIN_EMAIL: &str = "ops@example.com";
pub const TEST_ADMIN_PASSWORD: &str = "migrate-me-2026";

/// Fast runner config so a multi-day migration finishes within a test.
pub fn test_runner_config() -> RunnerConfig {
    RunnerConfig {
        day_delay: Duration::from_millis(2),
    }
}

pub struct TestRunner {
    pub runner: Arc<MigrationRunner>,
    pub jobs: Arc<dyn JobStore>,
    pub routes: Arc<MemoryRouteStore>,
}

pub fn test_runner(crawler: Arc<dyn Crawler>) -> TestRunner {
    test_runner_with_jobs(crawler, Arc::new(MemoryJobStore::new()))
}

pub fn test_runner_with_jobs(crawler: Arc<dyn Crawler>, jobs: Arc<dyn JobStore>) -> TestRunner {
    let routes = Arc::new(MemoryRouteStore::new());
    let runner = Arc::new(MigrationRunner::new(
        jobs.clone(),
        crawler,
        routes.clone(),
        test_runner_config(),
    ));
    TestRunner {
        runner,
        jobs,
        routes,
    }
}

/// Poll a job until it reaches a terminal status. Panics after 5 seconds.
pub async fn wait_until_terminal(runner: &MigrationRunner, id: i64) -> MigrationJob {
    for _ in 0..500 {
        let job = runner.get_job(id).await.expect("job exists");
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} never reached a terminal status");
}

/// Poll a job until its completed day counter reaches `days`.
pub async fn wait_until_days_done(runner: &MigrationRunner, id: i64, days: i32) -> MigrationJob {
    for _ in 0..500 {
        let job = runner.get_job(id).await.expect("job exists");
        if job.completed_days >= days {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} never completed {days} days");
}

pub struct TestApp {
    pub app: Router,
    pub runner: Arc<MigrationRunner>,
    pub routes: Arc<MemoryRouteStore>,
}

/// Full application over memory stores with one seeded admin.
pub async fn build_test_app(crawler: Arc<dyn Crawler>, api_key: Option<String>) -> TestApp {
    let routes = Arc::new(MemoryRouteStore::new());
    let jobs = Arc::new(MemoryJobStore::new());
    let admins = Arc::new(MemoryAdminStore::new());
    let cache = Arc::new(MemoryCache::new());
    let jwt = Arc::new(JwtService::new("test-secret"));

    admins
        .create(
            TEST_ADMIN_EMAIL,
            &password::hash_password(TEST_ADMIN_PASSWORD).unwrap(),
            "Ops",
        )
        .await
        .unwrap();

    let runner = Arc::new(MigrationRunner::new(
        jobs,
        crawler.clone(),
        routes.clone(),
        test_runner_config(),
    ));

    let state = AppState {
        db_pool: None,
        search: Arc::new(SearchService::new(routes.clone(), cache.clone())),
        sync: Arc::new(SyncService::new(crawler, routes.clone(), cache)),
        auth: Arc::new(AuthService::new(admins, jwt.clone())),
        runner: runner.clone(),
        jwt,
    };

    TestApp {
        app: build_app(state, api_key),
        runner,
        routes,
    }
}

/// One-shot GET, returning status and parsed JSON body.
pub async fn get_json(app: &Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(path).method("GET");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, request.body(Body::empty()).unwrap()).await
}

/// One-shot POST with a JSON body.
pub async fn post_json(
    app: &Router,
    path: &str,
    body: Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .uri(path)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, request.body(Body::from(body.to_string())).unwrap()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request runs");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Log in through the API and return a bearer token.
pub async fn login(app: &Router) -> String {
    let (status, body) = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "email": TEST_ADMIN_EMAIL, "password": TEST_ADMIN_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().expect("token").to_string()
}
