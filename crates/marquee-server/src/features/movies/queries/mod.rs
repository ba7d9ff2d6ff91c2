pub mod get;
pub mod list;

pub use get::GetMovieQuery;
pub use list::{ListMoviesMeta, ListMoviesQuery};
