//! Partial update of a movie
//!
//! Reads the current row, applies only the fields present in the body,
//! validates the result and writes it back conditioned on the version that
//! was read. A concurrent writer that got there first turns this into an
//! edit conflict; the client is expected to re-read and retry.

use serde::Deserialize;

use crate::features::movies::store::{MovieStore, MovieStoreError};
use crate::features::movies::types::{validate_movie, Movie, MovieError, Runtime};
use crate::features::shared::Validator;

/// Body of `PATCH /movies/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovieCommand {
    #[serde(skip)]
    pub id: i64,
    /// Raw `X-Expected-Version` header; anything but the current version conflicts
    #[serde(skip)]
    pub expected_version: Option<String>,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl UpdateMovieCommand {
    /// Copies the provided fields onto `movie`
    pub fn apply(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = self.genres {
            movie.genres = genres;
        }
    }
}

#[tracing::instrument(skip(store, command), fields(id = command.id))]
pub async fn handle(store: &dyn MovieStore, command: UpdateMovieCommand) -> Result<Movie, MovieError> {
    let mut movie = store.get(command.id).await?;

    if let Some(expected) = command.expected_version.as_deref() {
        if expected.trim() != movie.version.to_string() {
            tracing::debug!(expected, current = movie.version, "Expected version is stale");
            return Err(MovieStoreError::EditConflict.into());
        }
    }

    command.apply(&mut movie);

    let mut v = Validator::new();
    validate_movie(&mut v, &movie);
    v.finish()?;

    movie.version = store.update(&movie).await?;

    tracing::info!(movie_id = movie.id, version = movie.version, "Movie updated");
    Ok(movie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::movies::store::InMemoryMovieStore;
    use crate::features::movies::types::NewMovie;

    async fn seeded() -> (InMemoryMovieStore, Movie) {
        let store = InMemoryMovieStore::new();
        let movie = store
            .insert(&NewMovie {
                title: "Moana".to_string(),
                year: 2016,
                runtime: Runtime(107),
                genres: vec!["animation".to_string()],
            })
            .await
            .unwrap();
        (store, movie)
    }

    #[tokio::test]
    async fn test_only_present_fields_change() {
        let (store, movie) = seeded().await;
        let cmd = UpdateMovieCommand {
            id: movie.id,
            year: Some(2017),
            ..Default::default()
        };

        let updated = handle(&store, cmd).await.unwrap();
        assert_eq!(updated.year, 2017);
        assert_eq!(updated.title, "Moana");
        assert_eq!(updated.runtime, Runtime(107));
        assert_eq!(updated.version, 2);
        assert_eq!(store.get(movie.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_stale_expected_version_conflicts() {
        let (store, movie) = seeded().await;
        let cmd = UpdateMovieCommand {
            id: movie.id,
            expected_version: Some("7".to_string()),
            title: Some("Other".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            handle(&store, cmd).await,
            Err(MovieError::Store(MovieStoreError::EditConflict))
        ));
        assert_eq!(store.get(movie.id).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_matching_expected_version_updates() {
        let (store, movie) = seeded().await;
        let cmd = UpdateMovieCommand {
            id: movie.id,
            expected_version: Some("1".to_string()),
            title: Some("Moana 2".to_string()),
            ..Default::default()
        };

        assert_eq!(handle(&store, cmd).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_invalid_result_is_not_written() {
        let (store, movie) = seeded().await;
        let cmd = UpdateMovieCommand {
            id: movie.id,
            genres: Some(vec![]),
            ..Default::default()
        };

        assert!(matches!(handle(&store, cmd).await, Err(MovieError::Validation(_))));
        assert_eq!(store.get(movie.id).await.unwrap(), movie);
    }

    #[tokio::test]
    async fn test_missing_movie_is_not_found() {
        let (store, _) = seeded().await;
        let cmd = UpdateMovieCommand {
            id: 42,
            title: Some("x".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            handle(&store, cmd).await,
            Err(MovieError::Store(MovieStoreError::NotFound))
        ));
    }
}
