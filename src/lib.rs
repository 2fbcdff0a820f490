//! # querycrate
//!
//! Query parameters in, filter expressions and pagination metadata out.
//!
//! - [`filtering`]: json-server style parameters (`age_gte=18`, `name_like=jo`) parsed
//!   into a typed [`Filter`], plus sort and page parameters
//! - [`pagination`]: marker (range-based) and offset pagination
//! - [`value`]: the scalar values a filter carries and how they order
//!
//! Storage stays with the caller. A marker listing only needs an [`Executor`] that runs
//! a filter with a sort field and a limit; SQL stores can build that query with
//! [`filtering::select_statement`].
//!
//! ```rust,ignore
//! use querycrate::{Marker, Paginator, QueryConfig, QueryParams, parse_filter, parse_pagination};
//!
//! let config = QueryConfig::default();
//! let params = QueryParams::parse("name=tom&name=jerry&age_gt=10&_page=2&_limit=20");
//!
//! let filter = parse_filter(&params, &config, &[]);
//! let request = parse_pagination(&params, &config);
//! let rows = store.find(&filter, request.skip, request.limit)?;
//! let pager = Paginator::new(request.skip as i64, request.limit as i64, store.count(&filter)? as i64);
//! ```

pub mod config;
pub mod errors;
pub mod filtering;
pub mod pagination;
pub mod value;

pub use config::QueryConfig;
pub use errors::QueryError;
pub use filtering::{
    Filter, FilterBuilder, Operator, QueryParams, SortOrder, parse_filter, parse_pagination, parse_sort,
    parse_sort_multiple,
};
pub use pagination::{
    AsyncExecutor, ByKey, Direction, Executor, FieldAccessor, Marker, MarkerPage, PageInfo, PageItem,
    Paginator,
};
pub use value::{Class, ObjectId, Value};

pub use serde_with;
