//! Middleware for the Marquee server
//!
//! This module provides middleware for:
//! - CORS (Cross-Origin Resource Sharing)
//! - Request logging with tracing
//! - Panic recovery
//! - Request timeouts
//! - Rate limiting

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderName, Method},
    response::{IntoResponse, Response},
    BoxError,
};
use std::any::Any as PanicPayload;
use std::future::{ready, Ready};
use std::time::Duration;
use tower::{
    layer::util::{Identity, Stack},
    timeout::{error::Elapsed, TimeoutLayer},
    ServiceBuilder,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::CorsConfig;
use crate::error::AppError;

pub mod rate_limit;

pub use rate_limit::{RateLimitConfig, RateLimitLayer, RateLimiter};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(crate::features::movies::routes::EXPECTED_VERSION_HEADER),
        ])
        .expose_headers([header::LOCATION, HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600));

    // Credentials are only valid with an explicit origin list.
    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);

        if config.allow_credentials {
            cors = cors.allow_credentials(true);
        }
    }

    cors
}

/// Create tracing/logging layer
pub fn tracing_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
}

/// Assigns `x-request-id` to requests that lack one
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid)
}

/// Copies `x-request-id` from the request onto the response
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER))
}

/// Turns a panic inside a handler into the generic 500 envelope
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn PanicPayload + Send + 'static>) -> Response>
{
    CatchPanicLayer::custom(panic_response as fn(Box<dyn PanicPayload + Send + 'static>) -> Response)
}

/// Deadline for a whole request, answered with the standard 500 envelope
pub type RequestTimeoutLayer = ServiceBuilder<
    Stack<TimeoutLayer, Stack<HandleErrorLayer<fn(BoxError) -> Ready<AppError>, ()>, Identity>>,
>;

pub fn request_timeout_layer(timeout: Duration) -> RequestTimeoutLayer {
    ServiceBuilder::new()
        .layer(HandleErrorLayer::new(timeout_error as fn(BoxError) -> Ready<AppError>))
        .layer(TimeoutLayer::new(timeout))
}

fn timeout_error(err: BoxError) -> Ready<AppError> {
    let err = if err.is::<Elapsed>() {
        AppError::Internal("request did not complete before the deadline".to_string())
    } else {
        AppError::Internal(format!("request failed in middleware: {err}"))
    };
    ready(err)
}

fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
