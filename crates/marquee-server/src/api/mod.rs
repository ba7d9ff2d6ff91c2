//! Router assembly
//!
//! Layers, outermost first: panic recovery, request id, tracing span,
//! CORS, request timeout, body limit, rate limiting, then the routes.

pub mod response;

use axum::{extract::DefaultBodyLimit, Router};

use crate::config::Config;
use crate::error::AppError;
use crate::features::{self, shared::extract::MAX_BODY_BYTES, FeatureState};
use crate::middleware::{self, RateLimiter};

pub fn create_router(state: FeatureState, limiter: &RateLimiter, config: &Config) -> Router {
    Router::new()
        .nest("/api/v1", features::router(state))
        .fallback(not_found)
        .layer(limiter.layer())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::request_timeout_layer(config.server.request_timeout()))
        .layer(middleware::cors_layer(&config.cors))
        .layer(middleware::propagate_request_id_layer())
        .layer(middleware::tracing_layer())
        .layer(middleware::set_request_id_layer())
        .layer(middleware::catch_panic_layer())
}

async fn not_found() -> AppError {
    AppError::not_found()
}
