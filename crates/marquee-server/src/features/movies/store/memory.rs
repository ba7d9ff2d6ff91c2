//! In-process [`MovieStore`]
//!
//! Holds every movie behind one mutex. Used by the HTTP tests and for
//! running the server without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{text, MovieStore, MovieStoreError, StoreResult};
use crate::features::movies::types::{Movie, NewMovie};
use crate::features::shared::{Filters, Metadata, Paginated, SortDirection, UnsafeSortColumn};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    movies: BTreeMap<i64, Movie>,
}

#[derive(Debug, Default)]
pub struct InMemoryMovieStore {
    state: Mutex<State>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave a half-written movie.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, Copy)]
enum SortKey {
    Id,
    Title,
    Year,
    Runtime,
}

impl SortKey {
    fn parse(column: &str) -> Result<Self, UnsafeSortColumn> {
        match column {
            "id" => Ok(SortKey::Id),
            "title" => Ok(SortKey::Title),
            "year" => Ok(SortKey::Year),
            "runtime" => Ok(SortKey::Runtime),
            other => Err(UnsafeSortColumn(other.to_string())),
        }
    }

    fn compare(self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Year => a.year.cmp(&b.year),
            SortKey::Runtime => a.runtime.cmp(&b.runtime),
        }
    }
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn insert(&self, movie: &NewMovie) -> StoreResult<Movie> {
        let mut state = self.lock();
        state.next_id += 1;

        let stored = Movie {
            id: state.next_id,
            created_at: Utc::now(),
            title: movie.title.clone(),
            year: movie.year,
            runtime: movie.runtime,
            genres: movie.genres.clone(),
            version: 1,
        };
        state.movies.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: i64) -> StoreResult<Movie> {
        if id < 1 {
            return Err(MovieStoreError::NotFound);
        }
        self.lock().movies.get(&id).cloned().ok_or(MovieStoreError::NotFound)
    }

    async fn update(&self, movie: &Movie) -> StoreResult<i32> {
        let mut state = self.lock();
        let stored = state
            .movies
            .get_mut(&movie.id)
            .filter(|stored| stored.version == movie.version)
            .ok_or(MovieStoreError::EditConflict)?;

        stored.title = movie.title.clone();
        stored.year = movie.year;
        stored.runtime = movie.runtime;
        stored.genres = movie.genres.clone();
        stored.version += 1;
        Ok(stored.version)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        if id < 1 {
            return Err(MovieStoreError::NotFound);
        }
        self.lock()
            .movies
            .remove(&id)
            .map(|_| ())
            .ok_or(MovieStoreError::NotFound)
    }

    async fn list(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> StoreResult<Paginated<Movie>> {
        let key = match filters.sort_column().and_then(SortKey::parse) {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(sort = %e.0, "Sort column outside the allow-list reached the store");
                return Err(e.into());
            },
        };
        let direction = filters.sort_direction();

        let mut matched: Vec<Movie> = self
            .lock()
            .movies
            .values()
            .filter(|movie| text::matches(&movie.title, title))
            .filter(|movie| genres.iter().all(|g| movie.genres.contains(g)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let by_column = match direction {
                SortDirection::Asc => key.compare(a, b),
                SortDirection::Desc => key.compare(b, a),
            };
            by_column.then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len() as i64;
        let page: Vec<Movie> = matched
            .into_iter()
            .skip(filters.offset().max(0) as usize)
            .take(filters.limit().max(0) as usize)
            .collect();

        if page.is_empty() {
            return Ok(Paginated::empty());
        }
        Ok(Paginated::new(
            page,
            Metadata::calculate(total, filters.page, filters.page_size),
        ))
    }
}
