use serde::Serialize;

use crate::features::movies::store::MovieStore;
use crate::features::movies::types::MovieError;

#[derive(Debug, Clone, Copy)]
pub struct DeleteMovieCommand {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteMovieResponse {
    pub id: i64,
    pub deleted: bool,
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn MovieStore,
    command: DeleteMovieCommand,
) -> Result<DeleteMovieResponse, MovieError> {
    store.delete(command.id).await?;

    tracing::info!(movie_id = command.id, "Movie deleted");
    Ok(DeleteMovieResponse {
        id: command.id,
        deleted: true,
    })
}
