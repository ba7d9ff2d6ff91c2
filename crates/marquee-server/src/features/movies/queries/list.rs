//! Filtered, sorted, paged movie listing

use serde::Serialize;

use crate::features::movies::store::MovieStore;
use crate::features::movies::types::{Movie, MovieError, MOVIE_SORT_SAFE_LIST};
use crate::features::shared::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::features::shared::{Filters, Metadata, Paginated, Validator};

/// Query string of `GET /movies`
///
/// Numbers arrive as raw text so a non-numeric value becomes a field error
/// rather than a rejected request.
#[derive(Debug, Clone, Default)]
pub struct ListMoviesQuery {
    pub title: Option<String>,
    /// Comma separated; a movie must carry all of them
    pub genres: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListMoviesMeta {
    pub pagination: Metadata,
}

/// Validated form of [`ListMoviesQuery`]
#[derive(Debug, Clone, PartialEq)]
pub struct MovieListRequest {
    pub title: String,
    pub genres: Vec<String>,
    pub filters: Filters,
}

fn read_int(v: &mut Validator, raw: Option<&str>, field: &str, default: i64) -> i64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            v.add_error(field, "must be an integer value");
            default
        }),
    }
}

fn read_csv(raw: Option<&str>) -> Vec<String> {
    match raw.filter(|s| !s.is_empty()) {
        None => Vec::new(),
        Some(s) => s.split(',').map(|g| g.trim().to_string()).collect(),
    }
}

impl ListMoviesQuery {
    /// Builds the query from decoded `key=value` pairs
    ///
    /// The first value of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "title" => &mut query.title,
                "genres" => &mut query.genres,
                "page" => &mut query.page,
                "page_size" => &mut query.page_size,
                "sort" => &mut query.sort,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    pub fn validate(&self) -> Result<MovieListRequest, MovieError> {
        let mut v = Validator::new();

        let page = read_int(&mut v, self.page.as_deref(), "page", DEFAULT_PAGE);
        let page_size = read_int(&mut v, self.page_size.as_deref(), "page_size", DEFAULT_PAGE_SIZE);
        let sort = self
            .sort
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("id");

        let filters = Filters::new(page, page_size, sort, MOVIE_SORT_SAFE_LIST);
        filters.validate(&mut v);
        v.finish()?;

        Ok(MovieListRequest {
            title: self.title.as_deref().map(str::trim).unwrap_or_default().to_string(),
            genres: read_csv(self.genres.as_deref()),
            filters,
        })
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn MovieStore,
    query: ListMoviesQuery,
) -> Result<Paginated<Movie>, MovieError> {
    let request = query.validate()?;
    let page = store
        .list(&request.title, &request.genres, &request.filters)
        .await?;

    tracing::debug!(
        returned = page.items.len(),
        total = page.metadata.total_records,
        "Movies listed"
    );
    Ok(page)
}
