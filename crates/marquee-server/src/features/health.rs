//! Liveness endpoint

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::api::response::ApiResponse;
use crate::config::Environment;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub environment: Environment,
    pub version: &'static str,
}

pub fn health_routes() -> Router<Environment> {
    Router::new().route(
        "/health-check",
        get(health_check).fallback(|| async { AppError::MethodNotAllowed }),
    )
}

async fn health_check(State(environment): State<Environment>) -> ApiResponse<HealthStatus> {
    ApiResponse::success(HealthStatus {
        status: "available",
        environment,
        version: env!("CARGO_PKG_VERSION"),
    })
}
