//! Movie catalogue feature

pub mod commands;
pub mod queries;
pub mod routes;
pub mod store;
pub mod types;

pub use routes::movies_routes;
pub use store::{InMemoryMovieStore, MovieStore, MovieStoreError, PgMovieStore, SharedMovieStore};
pub use types::{validate_movie, Movie, MovieError, NewMovie, Runtime, MOVIE_SORT_SAFE_LIST};
