//! Shared utilities for feature modules
//!
//! - **pagination**: filters, sort resolution and page metadata
//! - **validation**: the per-request [`Validator`]
//! - **extract**: JSON body and query extractors with enveloped rejections

pub mod extract;
pub mod pagination;
pub mod validation;

// Re-export commonly used types
pub use extract::{JsonBody, QueryParams};
pub use pagination::{Filters, Metadata, Paginated, SortDirection, UnsafeSortColumn};
pub use validation::{FieldError, Validator};
