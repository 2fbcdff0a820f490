//! # Pagination
//!
//! Two strategies over an ordered result set:
//!
//! - [`Marker`]: range-based paging relative to a boundary value
//! - [`Paginator`]: classic page/skip/limit arithmetic with a windowed page list for
//!   pager widgets and a `Content-Range` header

pub mod marker;
pub mod offset;

pub use marker::{AsyncExecutor, ByKey, Direction, Executor, FieldAccessor, Marker, MarkerPage};
pub use offset::{PageInfo, PageItem, Paginator};
