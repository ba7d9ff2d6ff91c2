//! Movie API routes
//!
//! - `POST /api/v1/movies` - Create a movie
//! - `GET /api/v1/movies` - List movies (`title`, `genres`, `page`, `page_size`, `sort`)
//! - `GET /api/v1/movies/:id` - Get a movie
//! - `PATCH /api/v1/movies/:id` - Partially update a movie
//! - `DELETE /api/v1/movies/:id` - Delete a movie

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::commands::{self, CreateMovieCommand, DeleteMovieCommand, UpdateMovieCommand};
use super::queries::{self, GetMovieQuery, ListMoviesMeta, ListMoviesQuery};
use super::store::SharedMovieStore;
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::features::shared::{JsonBody, QueryParams};

/// Header carrying the version a client expects to overwrite
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

pub fn movies_routes() -> Router<SharedMovieStore> {
    Router::new()
        .route(
            "/",
            post(create_movie).get(list_movies).fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_movie)
                .patch(update_movie)
                .delete(delete_movie)
                .fallback(method_not_allowed),
        )
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Ids that are not positive integers name no movie
fn parse_id(raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => {
            tracing::debug!(id = raw, "Rejected movie id");
            Err(AppError::not_found())
        },
    }
}

/// Movie id from the path, checked before any request body is read
///
/// A malformed id is a 404 even when the body is malformed too.
#[derive(Debug, Clone, Copy)]
struct MovieId(i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MovieId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found())?;
        parse_id(&raw).map(MovieId)
    }
}

#[tracing::instrument(skip(store, command))]
async fn create_movie(
    State(store): State<SharedMovieStore>,
    JsonBody(command): JsonBody<CreateMovieCommand>,
) -> AppResult<Response> {
    let movie = commands::create::handle(store.as_ref(), command).await?;

    let location = format!("/api/v1/movies/{}", movie.id);
    let mut response = ApiResponse::created(movie).into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

#[tracing::instrument(skip(store))]
async fn list_movies(
    State(store): State<SharedMovieStore>,
    QueryParams(pairs): QueryParams<Vec<(String, String)>>,
) -> AppResult<Response> {
    let query = ListMoviesQuery::from_pairs(pairs);
    let page = queries::list::handle(store.as_ref(), query).await?;

    let meta = ListMoviesMeta {
        pagination: page.metadata,
    };
    Ok(ApiResponse::success_with_meta(page.items, meta).into_response())
}

#[tracing::instrument(skip(store))]
async fn get_movie(
    State(store): State<SharedMovieStore>,
    MovieId(id): MovieId,
) -> AppResult<Response> {
    let movie = queries::get::handle(store.as_ref(), GetMovieQuery { id }).await?;

    Ok(ApiResponse::success(movie).into_response())
}

#[tracing::instrument(skip(store, headers, command))]
async fn update_movie(
    State(store): State<SharedMovieStore>,
    MovieId(id): MovieId,
    headers: HeaderMap,
    JsonBody(mut command): JsonBody<UpdateMovieCommand>,
) -> AppResult<Response> {
    command.id = id;
    command.expected_version = headers
        .get(EXPECTED_VERSION_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let movie = commands::update::handle(store.as_ref(), command).await?;

    Ok(ApiResponse::success(movie).into_response())
}

#[tracing::instrument(skip(store))]
async fn delete_movie(
    State(store): State<SharedMovieStore>,
    MovieId(id): MovieId,
) -> AppResult<Response> {
    let response = commands::delete::handle(store.as_ref(), DeleteMovieCommand { id }).await?;

    Ok(ApiResponse::success(response).into_response())
}
