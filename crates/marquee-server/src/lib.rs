//! Marquee Server Library
//!
//! HTTP server for a movie catalogue.
//!
//! # Overview
//!
//! - **API Endpoints**: create, read, partially update, delete and list movies
//!   under `/api/v1/movies`, plus `/api/v1/health-check`
//! - **Database Management**: PostgreSQL integration with SQLx
//! - **Middleware**: CORS, request logging, panic recovery and per-client rate limiting
//!
//! # Architecture
//!
//! Each feature is a vertical slice of commands (writes), queries (reads)
//! and routes. Handlers talk to storage only through the
//! [`MovieStore`](features::movies::MovieStore) trait, which has a
//! PostgreSQL implementation and an in-memory one.
//!
//! Updates use optimistic concurrency: every movie carries a `version`,
//! and a write only succeeds against the version it was read at.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use marquee_server::{api, config::Config, features, middleware::RateLimiter};
//!
//! let config = Config::default();
//! let limiter = RateLimiter::new(config.rate_limit.clone());
//! let state = features::FeatureState {
//!     movies: Arc::new(features::movies::InMemoryMovieStore::new()),
//!     environment: config.server.environment,
//! };
//! let app = api::create_router(state, &limiter, &config);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, AppResult};
