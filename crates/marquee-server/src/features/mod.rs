//! Feature modules implementing the Marquee API
//!
//! Each feature is a vertical slice:
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Entity and validation rules
//!
//! # Features
//!
//! - **movies**: The movie catalogue
//! - **health**: Liveness check
//! - **shared**: Validation, pagination and request extraction used by every slice

pub mod health;
pub mod movies;
pub mod shared;

use axum::Router;

use crate::config::Environment;
use movies::SharedMovieStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub movies: SharedMovieStore,
    pub environment: Environment,
}

/// Creates the API router with all feature routes mounted
///
/// - `/health-check` - Liveness
/// - `/movies` - Movie catalogue
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .merge(health::health_routes().with_state(state.environment))
        .nest("/movies", movies::movies_routes().with_state(state.movies))
}
