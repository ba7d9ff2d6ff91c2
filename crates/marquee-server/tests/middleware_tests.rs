//! Integration tests for middleware
//!
//! These tests verify:
//! - Panics become a 500 envelope and the service keeps serving
//! - Requests past the deadline become a 500 envelope
//! - CORS headers are correctly set
//! - Request ids are generated and echoed

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use marquee_server::{config::CorsConfig, middleware};

fn panicking_app() -> Router {
    async fn boom() -> &'static str {
        panic!("handler exploded");
    }

    Router::new()
        .route("/boom", get(boom))
        .route("/ok", get(|| async { "ok" }))
        .layer(middleware::catch_panic_layer())
}

#[tokio::test]
async fn test_panic_becomes_internal_error() {
    let app = panicking_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    assert!(!json["error"]["message"].as_str().unwrap().contains("exploded"));

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn test_slow_request_times_out_with_envelope() {
    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(60)).await;
        "late"
    }

    let app = Router::new()
        .route("/slow", get(slow))
        .route("/ok", get(|| async { "ok" }))
        .layer(middleware::request_timeout_layer(Duration::from_secs(10)));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight_with_specific_origin() {
    let cors = CorsConfig {
        allowed_origins: vec!["https://app.example.com".to_string()],
        allow_credentials: true,
    };
    let app = Router::new()
        .route("/movies", get(|| async { "ok" }))
        .layer(middleware::cors_layer(&cors));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/movies")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://app.example.com"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
}

#[tokio::test]
async fn test_cors_rejects_unlisted_origin() {
    let cors = CorsConfig {
        allowed_origins: vec!["https://app.example.com".to_string()],
        allow_credentials: false,
    };
    let app = Router::new()
        .route("/movies", get(|| async { "ok" }))
        .layer(middleware::cors_layer(&cors));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/movies")
                .header(header::ORIGIN, "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_request_id_generated_and_preserved() {
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .layer(middleware::propagate_request_id_layer())
        .layer(middleware::set_request_id_layer());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ok")
                .header(middleware::REQUEST_ID_HEADER, "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get(middleware::REQUEST_ID_HEADER).unwrap(), "abc-123");
}
