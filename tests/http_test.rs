//! The HTTP surface driven in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use marketplace_orders::config::{AppConfig, CorsConfig};
use marketplace_orders::gateway::SandboxGateway;
use marketplace_orders::http;
use marketplace_orders::lifecycle::{seed_demo, DemoData, MarketplaceSystem};
use marketplace_orders::notify::MemoryNotifier;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const CRON_SECRET: &str = "cron-test-secret";

async fn app() -> (Router, MarketplaceSystem, DemoData) {
    let config = AppConfig {
        cron_secret: Some(CRON_SECRET.into()),
        ..AppConfig::default()
    };
    let system = MarketplaceSystem::start(
        &config,
        Arc::new(SandboxGateway::new()),
        Arc::new(MemoryNotifier::new()),
    );
    let demo = seed_demo(&system).await.expect("demo data");
    let router = http::router(
        system.app_state(),
        &CorsConfig::default(),
        Duration::from_secs(5),
    );
    (router, system, demo)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

fn post_json(uri: &str, user: Option<u32>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_answers_with_the_envelope() {
    let (app, _system, _demo) = app().await;
    let (status, body) = send(&app, get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "status": "ok"}));
}

#[tokio::test]
async fn order_detail_needs_a_session() {
    let (app, _system, demo) = app().await;

    let (status, body) = send(
        &app,
        get("/api/orders/LM-2401-AB12").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("UNAUTHORIZED"));

    let (status, body) = send(
        &app,
        get("/api/orders/LM-2401-AB12")
            .header("x-user-id", demo.customer.0.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["order"]["number"], json!("LM-2401-AB12"));
    assert_eq!(body["order"]["status"], json!("processing"));
    assert_eq!(body["vendor"]["name"], json!("Lumen Goods"));
}

#[tokio::test]
async fn refund_request_over_http() {
    let (app, _system, demo) = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/orders/LM-2401-AB12/refund",
            Some(demo.customer.0),
            json!({"reason": "Arrived broken"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], json!("refund_requested"));

    let (status, body) = send(
        &app,
        post_json(
            "/api/orders/LM-2401-AB12/refund",
            Some(demo.customer.0),
            json!({"reason": "Again"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("ALREADY_REQUESTED"));

    let (status, body) = send(
        &app,
        post_json(
            "/api/orders/LM-2401-AB12/refund/approve",
            Some(demo.vendor_staff.0),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], json!("refunded"));
    assert_eq!(body["order"]["paymentStatus"], json!("refunded"));
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let (app, _system, demo) = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/orders/LM-2401-AB12/refund")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", demo.customer.0.to_string())
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn guest_lookup_hides_mismatches() {
    let (app, _system, demo) = app().await;
    let number = demo.guest_order.to_string();

    let (status, body) = send(
        &app,
        post_json(
            "/api/guest/orders",
            None,
            json!({"email": "guest@example.com", "orderNumber": number}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["number"], json!(number));

    let (status, body) = send(
        &app,
        get(&format!(
            "/api/guest/orders?email=intruder@example.com&orderNumber={number}"
        ))
        .body(Body::empty())
        .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("NOT_FOUND"));
    assert_eq!(body["error"], json!("Order not found"));
}

#[tokio::test]
async fn errors_follow_accept_language() {
    let (app, _system, _demo) = app().await;
    let (status, body) = send(
        &app,
        get("/api/tracking/LM-2401-ZZZZ")
            .header(header::ACCEPT_LANGUAGE, "es-MX,es;q=0.9,en;q=0.5")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Pedido no encontrado"));
    assert_eq!(body["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn tracking_is_public() {
    let (app, _system, _demo) = app().await;
    let (status, body) = send(
        &app,
        get("/api/tracking/LM-2401-AB12").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracking"]["orderNumber"], json!("LM-2401-AB12"));
    assert_eq!(body["tracking"]["status"], json!("processing"));
    assert_eq!(body["tracking"]["itemCount"], json!(4));
}

#[tokio::test]
async fn cron_endpoints_require_the_secret() {
    let (app, _system, _demo) = app().await;

    let (status, body) = send(
        &app,
        get("/api/cron/inventory-check").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!("UNAUTHORIZED"));

    let (status, _) = send(
        &app,
        get("/api/cron/inventory-check")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        get("/api/cron/analytics-snapshot?date=2024-01-15")
            .header(header::AUTHORIZATION, format!("Bearer {CRON_SECRET}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"], json!("analytics-snapshot"));
    assert_eq!(body["period"], json!("2024-01-15"));
    assert_eq!(body["written"], json!(2));

    let (status, body) = send(
        &app,
        get("/api/cron/analytics-snapshot?date=15-01-2024")
            .header(header::AUTHORIZATION, format!("Bearer {CRON_SECRET}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn unknown_routes_use_the_envelope() {
    let (app, _system, _demo) = app().await;
    let (status, body) = send(&app, get("/api/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "error": "Route not found", "code": "NOT_FOUND"})
    );
}
