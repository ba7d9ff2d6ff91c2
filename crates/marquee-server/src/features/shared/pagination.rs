//! Paging and sorting for list queries
//!
//! [`Filters`] carries the page, page size and sort key requested by a
//! client together with the allow-list of sortable columns supplied by the
//! calling code. Everything here is pure; the store turns the results into
//! `ORDER BY`/`LIMIT`/`OFFSET` clauses.
//!
//! # Examples
//!
//! ```rust
//! use marquee_server::features::shared::pagination::{Filters, Metadata, SortDirection};
//!
//! const SORTABLE: &[&str] = &["id", "year", "-id", "-year"];
//!
//! let filters = Filters::new(2, 20, "-year", SORTABLE);
//! assert_eq!(filters.sort_column().unwrap(), "year");
//! assert_eq!(filters.sort_direction(), SortDirection::Desc);
//! assert_eq!(filters.offset(), 20);
//!
//! let meta = Metadata::calculate(95, filters.page, filters.page_size);
//! assert_eq!(meta.last_page, 5);
//! ```

use serde::{Deserialize, Serialize};

use super::validation::{permitted_value, Validator};

/// Highest page number a client may request
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// A sort key outside the allow-list reached the store
///
/// Handlers validate `sort` against the same list before calling the store,
/// so this only happens when that validation was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sort key '{0}' is not in the sort allow-list")]
pub struct UnsafeSortColumn(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Paging and sort request for a list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    /// Column name, optionally prefixed with `-` for descending order
    pub sort: String,
    /// Accepted values for `sort`; always code-supplied
    pub sort_safe_list: &'static [&'static str],
}

impl Filters {
    pub fn new(
        page: i64,
        page_size: i64,
        sort: impl Into<String>,
        sort_safe_list: &'static [&'static str],
    ) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safe_list,
        }
    }

    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(self.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");
        v.check(
            permitted_value(self.sort.as_str(), self.sort_safe_list),
            "sort",
            "invalid sort value",
        );
    }

    /// Column to order by, taken from the allow-list entry matching `sort`
    ///
    /// The returned name is the allow-list's own `'static` string, never
    /// the client-supplied text.
    pub fn sort_column(&self) -> Result<&'static str, UnsafeSortColumn> {
        self.sort_safe_list
            .iter()
            .copied()
            .find(|safe| *safe == self.sort)
            .map(|safe| safe.trim_start_matches('-'))
            .ok_or_else(|| UnsafeSortColumn(self.sort.clone()))
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Paging information returned alongside a page of results
///
/// All fields are zero when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

/// One page of results plus its [`Metadata`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub metadata: Metadata,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, metadata: Metadata) -> Self {
        Self { items, metadata }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Metadata::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[&str] = &["id", "title", "year", "-id", "-title", "-year"];

    #[test]
    fn test_sort_column_strips_prefix() {
        assert_eq!(Filters::new(1, 20, "year", SORTABLE).sort_column(), Ok("year"));
        assert_eq!(Filters::new(1, 20, "-title", SORTABLE).sort_column(), Ok("title"));
    }

    #[test]
    fn test_sort_column_rejects_unlisted_key() {
        let filters = Filters::new(1, 20, "year; DROP TABLE movies", SORTABLE);
        assert_eq!(
            filters.sort_column(),
            Err(UnsafeSortColumn("year; DROP TABLE movies".to_string()))
        );

        // the descending form has to be listed on its own
        let filters = Filters::new(1, 20, "-runtime", &["runtime"]);
        assert!(filters.sort_column().is_err());
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(Filters::new(1, 20, "id", SORTABLE).sort_direction(), SortDirection::Asc);
        assert_eq!(Filters::new(1, 20, "-id", SORTABLE).sort_direction(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_limit_and_offset() {
        let filters = Filters::new(3, 25, "id", SORTABLE);
        assert_eq!(filters.limit(), 25);
        assert_eq!(filters.offset(), 50);
        assert_eq!(Filters::new(1, 10, "id", SORTABLE).offset(), 0);
    }

    #[test]
    fn test_validate_bounds() {
        let mut v = Validator::new();
        Filters::new(0, 101, "rating", SORTABLE).validate(&mut v);
        let errors = v.into_errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "page");
        assert_eq!(errors[0].message, "must be greater than zero");
        assert_eq!(errors[1].field, "page_size");
        assert_eq!(errors[1].message, "must be a maximum of 100");
        assert_eq!(errors[2].field, "sort");

        let mut v = Validator::new();
        Filters::new(MAX_PAGE + 1, 0, "id", SORTABLE).validate(&mut v);
        assert_eq!(v.errors()[0].message, "must be a maximum of 10 million");
        assert_eq!(v.errors()[1].message, "must be greater than zero");

        let mut v = Validator::new();
        Filters::new(MAX_PAGE, MAX_PAGE_SIZE, "-year", SORTABLE).validate(&mut v);
        assert!(v.is_valid());
    }

    #[test]
    fn test_metadata_empty_result() {
        assert_eq!(Metadata::calculate(0, 1, 20), Metadata::default());
    }

    #[test]
    fn test_metadata_rounds_last_page_up() {
        assert_eq!(
            Metadata::calculate(95, 2, 20),
            Metadata {
                current_page: 2,
                page_size: 20,
                first_page: 1,
                last_page: 5,
                total_records: 95,
            }
        );
        assert_eq!(Metadata::calculate(100, 1, 20).last_page, 5);
        assert_eq!(Metadata::calculate(1, 1, 100).last_page, 1);
    }
}
