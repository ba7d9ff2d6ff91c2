//! Movie persistence
//!
//! [`MovieStore`] is the seam between handlers and storage. Updates are
//! optimistic: a write only lands when the caller's `version` still matches
//! the stored one, and the store never retries or merges on conflict.

mod memory;
mod postgres;
mod text;

pub use memory::InMemoryMovieStore;
pub use postgres::PgMovieStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::types::{Movie, NewMovie};
use crate::features::shared::{Filters, Paginated, UnsafeSortColumn};

#[derive(Debug, thiserror::Error)]
pub enum MovieStoreError {
    #[error("record not found")]
    NotFound,
    /// The row was changed or removed since the caller read it
    #[error("edit conflict")]
    EditConflict,
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    UnsafeSortColumn(#[from] UnsafeSortColumn),
}

pub type StoreResult<T> = Result<T, MovieStoreError>;

#[async_trait]
pub trait MovieStore: Send + Sync + 'static {
    /// Stores a new movie and returns it with id, created_at and version 1
    async fn insert(&self, movie: &NewMovie) -> StoreResult<Movie>;

    async fn get(&self, id: i64) -> StoreResult<Movie>;

    /// Writes `movie` if its `version` is still current, returning the new version
    async fn update(&self, movie: &Movie) -> StoreResult<i32>;

    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Movies matching `title` (full text) and containing every genre in
    /// `genres`, ordered and paged by `filters`
    ///
    /// An empty `title` or `genres` matches everything, while a non-empty
    /// `title` with no searchable words matches nothing. Ties on the sort
    /// column are broken by ascending id.
    async fn list(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> StoreResult<Paginated<Movie>>;
}

pub type SharedMovieStore = Arc<dyn MovieStore>;
