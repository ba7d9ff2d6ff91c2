use crate::features::movies::store::MovieStore;
use crate::features::movies::types::{Movie, MovieError};

#[derive(Debug, Clone, Copy)]
pub struct GetMovieQuery {
    pub id: i64,
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn MovieStore, query: GetMovieQuery) -> Result<Movie, MovieError> {
    Ok(store.get(query.id).await?)
}
