//! HTTP surface tests: response shapes, status codes and the three guard
//! levels (public, API key, admin token), all over memory stores.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use dispatch_core::domains::routes::RouteStore;

use common::*;

#[tokio::test]
async fn health_reports_ok_without_a_database() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    let (status, body) = get_json(&app.app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "skipped");
}

#[tokio::test]
async fn route_search_returns_bare_array() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    app.routes
        .upsert_many(&[sample_route("20260101", "101102")])
        .await
        .unwrap();

    let (status, body) = get_json(&app.app, "/api/routes/code/1011", None).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().expect("bare array");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["lineCode"], "101102");
    assert_eq!(hits[0]["totalFare"], 1_250_000);

    let (_, empty) = get_json(&app.app, "/api/routes/code/9999", None).await;
    assert_eq!(empty.as_array().map(|a| a.len()), Some(0));
}

#[tokio::test]
async fn route_search_by_car_and_name() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    app.routes
        .upsert_many(&[sample_route("20260101", "101102")])
        .await
        .unwrap();

    let (status, by_car) = get_json(&app.app, "/api/routes/car/1234", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_car.as_array().map(|a| a.len()), Some(1));

    let (status, by_name) =
        get_json(&app.app, "/api/routes/name/%EC%84%9C%EC%9A%B8", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn malformed_date_is_a_400() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    let (status, body) = get_json(&app.app, "/api/routes/date/january", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("YYYYMMDD"));
}

#[tokio::test]
async fn stats_endpoint_aggregates_a_day() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    app.routes
        .upsert_many(&[
            sample_route("20260101", "101102"),
            sample_route("20260101", "204410"),
        ])
        .await
        .unwrap();

    let (status, body) = get_json(&app.app, "/api/stats/20260101", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRoutes"], 2);
    assert_eq!(body["totalFare"], 2_500_000);
}

#[tokio::test]
async fn monthly_stats_group_by_day() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    app.routes
        .upsert_many(&[
            sample_route("20260101", "101102"),
            sample_route("20260102", "101102"),
            sample_route("20260201", "101102"),
        ])
        .await
        .unwrap();

    let (status, body) = get_json(&app.app, "/api/stats/month/202601", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"]["20260101"]["totalRoutes"], 1);
    assert!(body["days"]["20260201"].is_null());
}

#[tokio::test]
async fn kakao_help_and_search() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    app.routes
        .upsert_many(&[sample_route("20260101", "101102")])
        .await
        .unwrap();

    let (status, help) = post_json(
        &app.app,
        "/kakao/skill",
        json!({ "userRequest": { "utterance": "도움말" } }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(help["version"], "2.0");
    let text = help["template"]["outputs"][0]["simpleText"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("물류 조회 도움말"));

    let (_, found) = post_json(
        &app.app,
        "/kakao/skill",
        json!({ "userRequest": { "utterance": "노선 101102" } }),
        None,
    )
    .await;
    let text = found["template"]["outputs"][0]["simpleText"]["text"]
        .as_str()
        .unwrap();
    assert!(text.starts_with("[검색 결과 1건]"));
    assert!(text.contains("1,250,000원"));

    let (_, unknown) = post_json(
        &app.app,
        "/kakao/skill",
        json!({ "userRequest": { "utterance": "안녕하세요" } }),
        None,
    )
    .await;
    let text = unknown["template"]["outputs"][0]["simpleText"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("이해하지 못했습니다"));
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;

    let (status, body) = get_json(&app.app, "/api/migration", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized: Missing token");

    let (status, body) = get_json(&app.app, "/api/migration", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized: Invalid token");
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_401() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    let (status, body) = post_json(
        &app.app,
        "/api/auth/login",
        json!({ "email": TEST_ADMIN_EMAIL, "password": "wrong" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn me_returns_token_identity() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    let token = login(&app.app).await;

    let (status, body) = get_json(&app.app, "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], TEST_ADMIN_EMAIL);
}

#[tokio::test]
async fn migration_lifecycle_over_http() {
    let app = build_test_app(Arc::new(ScriptedCrawler::new()), None).await;
    let token = login(&app.app).await;

    let (status, created) = post_json(
        &app.app,
        "/api/migration",
        json!({ "startDate": "20260101", "endDate": "20260103" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["totalDays"], 3);
    let id = created["data"]["id"].as_i64().unwrap();

    // A competing start while active conflicts
    let (status, _) = post_json(
        &app.app,
        "/api/migration",
        json!({ "startDate": "20260110", "endDate": "20260111" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let done = wait_until_terminal(&app.runner, id).await;
    assert_eq!(done.completed_days, 3);

    let (status, fetched) = get_json(&app.app, &format!("/api/migration/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["status"], "completed");
    assert_eq!(fetched["data"]["progressPercent"], 100);

    let (status, active) = get_json(&app.app, "/api/migration/active", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(active["data"].is_null());

    // Cancelling a finished job is a conflict
    let (status, body) = post_json(
        &app.app,
        &format!("/api/migration/{id}/cancel"),
        json!({}),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "job is not active");

    let (status, missing) = get_json(&app.app, "/api/migration/999", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["success"], false);
}

#[tokio::test]
async fn sync_requires_the_api_key_when_configured() {
    let app = build_test_app(
        Arc::new(ScriptedCrawler::new()),
        Some("terminal-key".to_string()),
    )
    .await;

    let (status, _) = post_json(&app.app, "/api/sync", json!({ "date": "20260101" }), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = axum::http::Request::builder()
        .uri("/api/sync")
        .method("POST")
        .header("content-type", "application/json")
        .header("x-api-key", "terminal-key")
        .body(axum::body::Body::from(
            json!({ "date": "20260101" }).to_string(),
        ))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["date"], "20260101");
    assert_eq!(body["count"], 1);
}
