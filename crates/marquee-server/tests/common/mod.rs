//! Shared helpers for the HTTP integration tests
//!
//! The app under test is the real router and middleware stack wired to
//! `InMemoryMovieStore`, driven with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

use marquee_server::{
    api,
    config::Config,
    features::{movies::InMemoryMovieStore, FeatureState},
    middleware::{RateLimitConfig, RateLimiter},
};

pub const CLIENT: &str = "203.0.113.7:40000";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryMovieStore>,
    pub limiter: RateLimiter,
}

impl TestApp {
    /// App with a limiter loose enough not to interfere
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig {
            rps: 1000.0,
            burst: 1000,
            ..Default::default()
        })
    }

    pub fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        let config = Config {
            rate_limit,
            ..Config::default()
        };
        let store = Arc::new(InMemoryMovieStore::new());
        let limiter = RateLimiter::new(config.rate_limit.clone());
        let state = FeatureState {
            movies: store.clone(),
            environment: config.server.environment,
        };

        Self {
            router: api::create_router(state, &limiter, &config),
            store,
            limiter,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, None)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, Some(body))).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PATCH, uri, Some(body))).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, None)).await
    }

    /// Creates a movie through the API and returns its id
    pub async fn create_movie(&self, title: &str, year: i32, genres: &[&str]) -> i64 {
        let (status, json) = self
            .post(
                "/api/v1/movies",
                serde_json::json!({
                    "title": title,
                    "year": year,
                    "runtime": "100 mins",
                    "genres": genres,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        json["data"]["id"].as_i64().unwrap()
    }
}

/// Request from [`CLIENT`], with a JSON body when given
pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    raw_request(method, uri, body.map(|b| b.to_string()))
}

pub fn raw_request(method: Method, uri: &str, body: Option<String>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let mut request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let peer: SocketAddr = CLIENT.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}
