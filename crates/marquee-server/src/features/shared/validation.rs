//! Field-level input validation
//!
//! A [`Validator`] collects `(field, message)` failures for a single request.
//! Only the first failure recorded for a given field is kept, so rules can be
//! listed from the most basic ("must be provided") to the most specific and
//! the client sees the most relevant message.
//!
//! # Examples
//!
//! ```rust
//! use marquee_server::features::shared::validation::Validator;
//!
//! let mut v = Validator::new();
//! let title = "";
//! v.check(!title.is_empty(), "title", "must be provided");
//! v.check(title.len() <= 500, "title", "must not be more than 500 bytes long");
//! assert!(!v.is_valid());
//! assert_eq!(v.errors()[0].message, "must be provided");
//! ```

use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered collection of field failures, first error per field wins
///
/// Not shared between requests; create one per validation pass.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no rule has failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a failure for `field` unless one is already recorded
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.errors.iter().any(|e| e.field == field) {
            return;
        }
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record `message` for `field` when `ok` is false
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// `Ok(())` when valid, otherwise the recorded failures
    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// True when `value` is one of `permitted`
pub fn permitted_value<T, U>(value: T, permitted: &[U]) -> bool
where
    U: PartialEq<T>,
{
    permitted.iter().any(|p| *p == value)
}

/// True when `values` contains no duplicates
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}
