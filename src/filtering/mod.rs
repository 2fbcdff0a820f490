//! # Filtering, sorting and page parameters
//!
//! Turns ad-hoc query parameters into a typed [`Filter`] following the json-server
//! conventions, and reads the sort and pagination parameters that travel alongside them.
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Equality, repeated for set membership
//! GET /users?name=tom&name=jerry          // {"name": {"in": ["tom", "jerry"]}}
//!
//! // Ranges keep only the tightest bound
//! GET /users?age_gt=10&age_gt=18           // {"age": {"gt": 18}}
//! GET /users?born_at_lte=1990-01-01T12:00:00
//!
//! // Exclusion and pattern match
//! GET /users?role_ne=guest&email_like=company
//!
//! // Identifiers address the storage key
//! GET /users?id=58db2700cf2f6715b00021a7   // {"_id": {"eq": ObjectId(..)}}
//!
//! // Sorting and paging
//! GET /users?_sort=-created_at&_page=2&_limit=50
//! ```
//!
//! ## Main Components
//!
//! - [`parse_filter`] and [`FilterBuilder`]: parameters to filter expression
//! - [`parse_sort`] / [`parse_sort_multiple`]: sort parameters
//! - [`parse_pagination`]: page and limit parameters
//! - [`select_statement`]: `SeaORM` rendering of a filter for SQL storage

pub mod builder;
pub mod conditions;
pub mod operator;
pub mod pagination;
pub mod query_parser;
pub mod sort;

// Re-export commonly used items
pub use builder::{FieldFilter, Filter, FilterBuilder};
pub use conditions::{order_by, select_statement};
pub use operator::{Keyword, Operand, Operator, Predicate};
pub use pagination::{PageRequest, parse_pagination};
pub use query_parser::{Converter, QueryParams, build_filter, coerce_value, parse_filter};
pub use sort::{SortOrder, parse_sort, parse_sort_multiple};
