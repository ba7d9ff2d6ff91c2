//! Create movie command

use serde::Deserialize;

use crate::features::movies::store::MovieStore;
use crate::features::movies::types::{Movie, MovieError, NewMovie, Runtime};
use crate::features::shared::Validator;

/// Body of `POST /movies`
///
/// Absent fields decode to zero values and are reported by validation as
/// "must be provided".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMovieCommand {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

impl CreateMovieCommand {
    pub fn validate(&self) -> Result<NewMovie, MovieError> {
        let mut v = Validator::new();
        v.check(self.genres.is_some(), "genres", "must be provided");

        let movie = NewMovie {
            title: self.title.clone(),
            year: self.year,
            runtime: self.runtime,
            genres: self.genres.clone().unwrap_or_default(),
        };
        movie.validate(&mut v);
        v.finish()?;

        Ok(movie)
    }
}

#[tracing::instrument(skip(store, command), fields(title = %command.title))]
pub async fn handle(store: &dyn MovieStore, command: CreateMovieCommand) -> Result<Movie, MovieError> {
    let movie = command.validate()?;
    let created = store.insert(&movie).await?;

    tracing::info!(movie_id = created.id, "Movie created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::movies::store::InMemoryMovieStore;

    fn command() -> CreateMovieCommand {
        CreateMovieCommand {
            title: "Black Panther".to_string(),
            year: 2018,
            runtime: Runtime(134),
            genres: Some(vec!["action".to_string(), "adventure".to_string()]),
        }
    }

    #[test]
    fn test_missing_genres_must_be_provided() {
        let cmd = CreateMovieCommand {
            genres: None,
            ..command()
        };
        match cmd.validate() {
            Err(MovieError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "genres");
                assert_eq!(errors[0].message, "must be provided");
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<CreateMovieCommand>(
            r#"{"title": "x", "rating": 5}"#,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_handle_creates_version_one() {
        let store = InMemoryMovieStore::new();
        let movie = handle(&store, command()).await.unwrap();

        assert_eq!(movie.version, 1);
        assert_eq!(movie.title, "Black Panther");
        assert!(movie.id >= 1);
    }

    #[tokio::test]
    async fn test_handle_invalid_does_not_insert() {
        let store = InMemoryMovieStore::new();
        let cmd = CreateMovieCommand {
            year: 1500,
            ..command()
        };

        assert!(matches!(handle(&store, cmd).await, Err(MovieError::Validation(_))));
        assert!(matches!(
            store.get(1).await,
            Err(crate::features::movies::store::MovieStoreError::NotFound)
        ));
    }
}
