//! Range-based ("marker") pagination.
//!
//! Instead of skipping rows, each page is fetched relative to a boundary value of an
//! ordered field taken from the previous page: the next page holds the rows after the
//! last boundary, the previous page the rows before the first one. The field should be
//! unique and indexed, `_id` being the usual choice.
//!
//! ```rust,ignore
//! let direction: Direction = params.get("page").unwrap_or("first").parse()?;
//! let marker = Marker::new("_id", boundary, direction).with_config(&config);
//! let page = marker.list(&executor, &ByKey, &filter, 20)?;
//! // page.prev / page.next are the boundaries for the neighbouring pages
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::filtering::builder::Filter;
use crate::filtering::operator::Keyword;
use crate::filtering::sort::DESCENDING_PREFIX;
use crate::value::Value;

/// Which page a marker asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    First,
    Last,
    Next,
    Prev,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Next => "next",
            Self::Prev => "previous",
        }
    }

    /// Last and previous pages are read in descending order and flipped afterwards.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::Last | Self::Prev)
    }

    /// Next and previous pages are relative to a boundary value.
    #[must_use]
    pub const fn needs_boundary(self) -> bool {
        matches!(self, Self::Next | Self::Prev)
    }
}

impl FromStr for Direction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "next" => Ok(Self::Next),
            "previous" | "prev" => Ok(Self::Prev),
            _ => Err(QueryError::invalid_marker("invalid page type")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage collaborator: runs a filter sorted by one field and returns at most `limit`
/// records in that order.
///
/// `sort_field` is a field name, prefixed with `-` for descending order.
pub trait Executor {
    type Record;
    type Error: Error + Send + Sync + 'static;

    fn execute(&self, filter: &Filter, sort_field: &str, limit: u64) -> Result<Vec<Self::Record>, Self::Error>;
}

/// Async counterpart of [`Executor`] for async storage drivers.
#[async_trait]
pub trait AsyncExecutor: Sync {
    type Record: Send;
    type Error: Error + Send + Sync + 'static;

    async fn execute(
        &self,
        filter: &Filter,
        sort_field: &str,
        limit: u64,
    ) -> Result<Vec<Self::Record>, Self::Error>;
}

/// Reads the marker field's value out of a record.
pub trait FieldAccessor<R: ?Sized> {
    fn get(&self, record: &R, field: &str) -> Option<Value>;
}

impl<R: ?Sized, F> FieldAccessor<R> for F
where
    F: Fn(&R, &str) -> Option<Value>,
{
    fn get(&self, record: &R, field: &str) -> Option<Value> {
        self(record, field)
    }
}

/// Accessor for map-shaped records, looking the field up as a key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByKey;

impl FieldAccessor<BTreeMap<String, Value>> for ByKey {
    fn get(&self, record: &BTreeMap<String, Value>, field: &str) -> Option<Value> {
        record.get(field).cloned()
    }
}

impl<S: BuildHasher> FieldAccessor<HashMap<String, Value, S>> for ByKey {
    fn get(&self, record: &HashMap<String, Value, S>, field: &str) -> Option<Value> {
        record.get(field).cloned()
    }
}

impl FieldAccessor<serde_json::Map<String, serde_json::Value>> for ByKey {
    fn get(&self, record: &serde_json::Map<String, serde_json::Value>, field: &str) -> Option<Value> {
        record.get(field).and_then(|v| Value::try_from(v).ok())
    }
}

/// One page of a marker listing with the boundaries of its neighbours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPage<R> {
    pub records: Vec<R>,
    /// Boundary for the previous page (marker field of the first record)
    pub prev: Option<Value>,
    /// Boundary for the next page (marker field of the last record)
    pub next: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    field: String,
    boundary: Option<Value>,
    direction: Direction,
    slow_query_threshold: Option<Duration>,
}

impl Marker {
    #[must_use]
    pub fn new(field: impl Into<String>, boundary: Option<Value>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            boundary,
            direction,
            slow_query_threshold: QueryConfig::default().slow_query_threshold,
        }
    }

    /// Take the slow query threshold from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &QueryConfig) -> Self {
        self.slow_query_threshold = config.slow_query_threshold;
        self
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn boundary(&self) -> Option<&Value> {
        self.boundary.as_ref()
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn is_reverse(&self) -> bool {
        self.direction.is_reverse()
    }

    /// Check that the marker can drive a query.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidMarker`] when the field is empty, or when a next/previous
    /// marker carries no boundary.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.field.is_empty() {
            return Err(QueryError::invalid_marker("marker's field can't be empty"));
        }
        if self.direction.needs_boundary() && self.boundary.is_none() {
            return Err(QueryError::invalid_marker(format!(
                "marker's value can't be nil when page equals to {}",
                self.direction
            )));
        }
        Ok(())
    }

    /// Narrow `base` to the rows after (next) or before (previous) the boundary.
    /// First and last pages use `base` as is.
    #[must_use]
    pub fn query_statement(&self, base: &Filter) -> Filter {
        let keyword = match self.direction {
            Direction::Next => Keyword::Gt,
            Direction::Prev => Keyword::Lt,
            Direction::First | Direction::Last => return base.clone(),
        };
        let Some(boundary) = &self.boundary else {
            return base.clone();
        };
        base.clone()
            .and(Filter::field(self.field.clone(), keyword, boundary.clone()))
    }

    /// Sort key for the query, `-` prefixed when the page is read backwards.
    #[must_use]
    pub fn sort_field(&self) -> String {
        if self.is_reverse() {
            format!("{DESCENDING_PREFIX}{}", self.field)
        } else {
            self.field.clone()
        }
    }

    /// Boundaries of the first and last record. An empty page has neither.
    #[must_use]
    pub fn prev_next<R, A>(&self, records: &[R], accessor: &A) -> (Option<Value>, Option<Value>)
    where
        A: FieldAccessor<R> + ?Sized,
    {
        match (records.first(), records.last()) {
            (Some(first), Some(last)) => (
                accessor.get(first, &self.field),
                accessor.get(last, &self.field),
            ),
            _ => (None, None),
        }
    }

    /// Validate, query and return the page in ascending order of the marker field.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidMarker`] before touching storage, or
    /// [`QueryError::Storage`] wrapping the executor's error.
    pub fn execute<E>(&self, executor: &E, base: &Filter, limit: u64) -> Result<Vec<E::Record>, QueryError>
    where
        E: Executor + ?Sized,
    {
        self.validate()?;

        let filter = self.query_statement(base);
        let sort_field = self.sort_field();
        let started = Instant::now();
        let result = executor.execute(&filter, &sort_field, limit);
        self.check_elapsed(started.elapsed(), &sort_field, limit);

        let records = result.map_err(QueryError::storage)?;
        Ok(self.in_order(records))
    }

    /// [`execute`](Self::execute) followed by [`prev_next`](Self::prev_next).
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn list<E, A>(
        &self,
        executor: &E,
        accessor: &A,
        base: &Filter,
        limit: u64,
    ) -> Result<MarkerPage<E::Record>, QueryError>
    where
        E: Executor + ?Sized,
        A: FieldAccessor<E::Record> + ?Sized,
    {
        let records = self.execute(executor, base, limit)?;
        let (prev, next) = self.prev_next(&records, accessor);
        Ok(MarkerPage { records, prev, next })
    }

    /// Async [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn execute_async<E>(
        &self,
        executor: &E,
        base: &Filter,
        limit: u64,
    ) -> Result<Vec<E::Record>, QueryError>
    where
        E: AsyncExecutor + ?Sized,
    {
        self.validate()?;

        let filter = self.query_statement(base);
        let sort_field = self.sort_field();
        let started = Instant::now();
        let result = executor.execute(&filter, &sort_field, limit).await;
        self.check_elapsed(started.elapsed(), &sort_field, limit);

        let records = result.map_err(QueryError::storage)?;
        Ok(self.in_order(records))
    }

    /// Async [`list`](Self::list).
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn list_async<E, A>(
        &self,
        executor: &E,
        accessor: &A,
        base: &Filter,
        limit: u64,
    ) -> Result<MarkerPage<E::Record>, QueryError>
    where
        E: AsyncExecutor + ?Sized,
        A: FieldAccessor<E::Record> + ?Sized,
    {
        let records = self.execute_async(executor, base, limit).await?;
        let (prev, next) = self.prev_next(&records, accessor);
        Ok(MarkerPage { records, prev, next })
    }

    fn in_order<R>(&self, mut records: Vec<R>) -> Vec<R> {
        if self.is_reverse() {
            records.reverse();
        }
        records
    }

    fn check_elapsed(&self, elapsed: Duration, sort_field: &str, limit: u64) {
        match self.slow_query_threshold {
            Some(threshold) if elapsed > threshold => warn!(
                field = %self.field,
                direction = %self.direction,
                sort = %sort_field,
                limit,
                elapsed = ?elapsed,
                threshold = ?threshold,
                "Slow marker query"
            ),
            _ => debug!(
                field = %self.field,
                direction = %self.direction,
                elapsed = ?elapsed,
                "Marker query finished"
            ),
        }
    }
}
