//! PostgreSQL-backed [`MovieStore`]

use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;

use super::{MovieStore, MovieStoreError, StoreResult};
use crate::features::movies::types::{Movie, NewMovie};
use crate::features::shared::{Filters, Metadata, Paginated};

#[derive(Debug, Clone)]
pub struct PgMovieStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgMovieStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

}

/// Runs one database call under `deadline`
async fn bounded<T, F>(deadline: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result.map_err(MovieStoreError::from),
        Err(_) => Err(MovieStoreError::Timeout(deadline)),
    }
}

#[derive(sqlx::FromRow)]
struct MovieListRow {
    total_records: i64,
    #[sqlx(flatten)]
    movie: Movie,
}

#[async_trait]
impl MovieStore for PgMovieStore {
    #[tracing::instrument(skip(self, movie), fields(title = %movie.title))]
    async fn insert(&self, movie: &NewMovie) -> StoreResult<Movie> {
        let query = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, year, runtime, genres)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, title, year, runtime, genres, version
            "#,
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime)
        .bind(&movie.genres);

        bounded(self.query_timeout, query.fetch_one(&self.pool)).await
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: i64) -> StoreResult<Movie> {
        if id < 1 {
            return Err(MovieStoreError::NotFound);
        }

        let query = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, created_at, title, year, runtime, genres, version
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id);

        bounded(self.query_timeout, query.fetch_optional(&self.pool))
            .await?
            .ok_or(MovieStoreError::NotFound)
    }

    #[tracing::instrument(skip(self, movie), fields(id = movie.id, version = movie.version))]
    async fn update(&self, movie: &Movie) -> StoreResult<i32> {
        let query = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE movies
            SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING version
            "#,
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime)
        .bind(&movie.genres)
        .bind(movie.id)
        .bind(movie.version);

        bounded(self.query_timeout, query.fetch_optional(&self.pool))
            .await?
            .ok_or(MovieStoreError::EditConflict)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i64) -> StoreResult<()> {
        if id < 1 {
            return Err(MovieStoreError::NotFound);
        }

        let query = sqlx::query("DELETE FROM movies WHERE id = $1").bind(id);
        let result = bounded(self.query_timeout, query.execute(&self.pool)).await?;

        if result.rows_affected() == 0 {
            return Err(MovieStoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, filters), fields(sort = %filters.sort, page = filters.page))]
    async fn list(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> StoreResult<Paginated<Movie>> {
        let column = match filters.sort_column() {
            Ok(column) => column,
            Err(e) => {
                tracing::error!(sort = %e.0, "Sort column outside the allow-list reached the store");
                return Err(e.into());
            },
        };

        // Only allow-list names are ever interpolated here.
        let sql = format!(
            r#"
            SELECT count(*) OVER() AS total_records,
                   id, created_at, title, year, runtime, genres, version
            FROM movies
            WHERE (to_tsvector('english', title) @@ plainto_tsquery('english', $1) OR $1 = '')
              AND (genres @> $2 OR $2 = '{{}}')
            ORDER BY {column} {direction}, id ASC
            LIMIT $3 OFFSET $4
            "#,
            direction = filters.sort_direction().as_sql(),
        );

        let query = sqlx::query_as::<_, MovieListRow>(&sql)
            .bind(title)
            .bind(genres)
            .bind(filters.limit())
            .bind(filters.offset());

        let rows = bounded(self.query_timeout, query.fetch_all(&self.pool)).await?;

        // Past the last page there are no rows to carry the count.
        let total = rows.first().map_or(0, |row| row.total_records);
        let movies = rows.into_iter().map(|row| row.movie).collect();

        Ok(Paginated::new(
            movies,
            Metadata::calculate(total, filters.page, filters.page_size),
        ))
    }
}
