//! Movie entity and its field rules

use chrono::{DateTime, Datelike, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::store::MovieStoreError;
use crate::features::shared::validation::unique;
use crate::features::shared::{FieldError, Validator};

/// Columns a movie list may be ordered by
pub const MOVIE_SORT_SAFE_LIST: &[&str] =
    &["id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime"];

pub const MAX_TITLE_BYTES: usize = 500;
pub const MIN_YEAR: i32 = 1888;
pub const MAX_GENRES: usize = 5;

/// Raised when a runtime is not of the form `"<N> mins"`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid runtime format")]
pub struct RuntimeFormatError;

/// Running time in minutes, written on the wire as `"<N> mins"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, sqlx::Type)]
#[sqlx(transparent)]
pub struct Runtime(pub i32);

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl FromStr for Runtime {
    type Err = RuntimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(minutes), Some("mins"), None) => {
                minutes.parse::<i32>().map(Runtime).map_err(|_| RuntimeFormatError)
            },
            _ => Err(RuntimeFormatError),
        }
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Other(de::IgnoredAny),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
            Raw::Other(_) => Err(de::Error::custom(RuntimeFormatError)),
        }
    }
}

/// A stored movie
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

/// Client-supplied fields of a movie that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
}

impl NewMovie {
    pub fn validate(&self, v: &mut Validator) {
        validate_fields(v, &self.title, self.year, self.runtime, &self.genres);
    }
}

/// Records every rule the movie breaks into `v`
pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    validate_fields(v, &movie.title, movie.year, movie.runtime, &movie.genres);
}

fn validate_fields(v: &mut Validator, title: &str, year: i32, runtime: Runtime, genres: &[String]) {
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(
        title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(year != 0, "year", "must be provided");
    v.check(year >= MIN_YEAR, "year", "must be greater than 1888");
    v.check(year <= Utc::now().year(), "year", "must not be in the future");

    v.check(runtime.0 != 0, "runtime", "must be provided");
    v.check(runtime.0 > 0, "runtime", "must be a positive integer");

    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(genres.len() <= MAX_GENRES, "genres", "must not contain more than 5 genres");
    v.check(unique(genres), "genres", "must not contain duplicate values");
    v.check(
        genres.iter().all(|g| !g.is_empty()),
        "genres",
        "must not contain empty values",
    );
}

/// Failure of a movie command or query
#[derive(Debug, thiserror::Error)]
pub enum MovieError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Store(#[from] MovieStoreError),
}

impl From<Vec<FieldError>> for MovieError {
    fn from(errors: Vec<FieldError>) -> Self {
        MovieError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewMovie {
        NewMovie {
            title: "Moana".to_string(),
            year: 2016,
            runtime: Runtime(107),
            genres: vec!["animation".to_string(), "adventure".to_string()],
        }
    }

    fn errors_of(movie: &NewMovie) -> Vec<FieldError> {
        let mut v = Validator::new();
        movie.validate(&mut v);
        v.into_errors()
    }

    fn message_for<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
        errors.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }

    #[test]
    fn test_runtime_serializes_with_unit() {
        assert_eq!(serde_json::to_string(&Runtime(102)).unwrap(), "\"102 mins\"");
    }

    #[test]
    fn test_runtime_deserialize() {
        let runtime: Runtime = serde_json::from_str("\"102 mins\"").unwrap();
        assert_eq!(runtime, Runtime(102));
    }

    #[test]
    fn test_runtime_rejects_other_shapes() {
        for input in ["102", "\"102\"", "\"102 min\"", "\"abc mins\"", "\"1 2 mins\"", "null"] {
            let err = serde_json::from_str::<Runtime>(input).unwrap_err();
            assert!(
                err.to_string().contains("invalid runtime format"),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn test_valid_movie_passes() {
        assert!(errors_of(&valid()).is_empty());
    }

    #[test]
    fn test_zero_values_report_must_be_provided() {
        let movie = NewMovie {
            title: String::new(),
            year: 0,
            runtime: Runtime(0),
            genres: vec![],
        };
        let errors = errors_of(&movie);

        assert_eq!(message_for(&errors, "title"), Some("must be provided"));
        assert_eq!(message_for(&errors, "year"), Some("must be provided"));
        assert_eq!(message_for(&errors, "runtime"), Some("must be provided"));
        assert_eq!(message_for(&errors, "genres"), Some("must contain at least 1 genre"));
    }

    #[test]
    fn test_title_length_is_measured_in_bytes() {
        let mut movie = valid();
        movie.title = "é".repeat(251);
        let errors = errors_of(&movie);
        assert_eq!(
            message_for(&errors, "title"),
            Some("must not be more than 500 bytes long")
        );
    }

    #[test]
    fn test_year_bounds() {
        let mut movie = valid();
        movie.year = 1887;
        assert_eq!(message_for(&errors_of(&movie), "year"), Some("must be greater than 1888"));

        movie.year = Utc::now().year() + 1;
        assert_eq!(message_for(&errors_of(&movie), "year"), Some("must not be in the future"));

        movie.year = MIN_YEAR;
        assert!(errors_of(&movie).is_empty());
    }

    #[test]
    fn test_negative_runtime() {
        let mut movie = valid();
        movie.runtime = Runtime(-5);
        assert_eq!(
            message_for(&errors_of(&movie), "runtime"),
            Some("must be a positive integer")
        );
    }

    #[test]
    fn test_genre_rules() {
        let mut movie = valid();
        movie.genres = (0..6).map(|i| format!("g{i}")).collect();
        assert_eq!(
            message_for(&errors_of(&movie), "genres"),
            Some("must not contain more than 5 genres")
        );

        movie.genres = vec!["drama".into(), "drama".into()];
        assert_eq!(
            message_for(&errors_of(&movie), "genres"),
            Some("must not contain duplicate values")
        );

        movie.genres = vec!["drama".into(), String::new()];
        assert_eq!(
            message_for(&errors_of(&movie), "genres"),
            Some("must not contain empty values")
        );
    }
}
