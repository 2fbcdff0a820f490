//! Query parsing and pagination settings.
//!
//! Every tunable lives in [`QueryConfig`], which is handed to the parsers and to
//! [`Marker`](crate::pagination::Marker) explicitly. There is no process-wide state.
//!
//! ```rust,ignore
//! let config: QueryConfig = serde_json::from_str(r#"{"page_key": "page", "limit_key": "per_page"}"#)?;
//! ```

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use std::time::Duration;

// Shared default values
pub const DEFAULT_PAGE_KEY: &str = "_page";
pub const DEFAULT_LIMIT_KEY: &str = "_limit";
pub const DEFAULT_SORT_KEY: &str = "_sort";
pub const DEFAULT_ORDER_KEY: &str = "_order";
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const ORDER_ASCENDING: &str = "asc";
pub const ORDER_DESCENDING: &str = "desc";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DEFAULT_SLOW_QUERY_SECS: u64 = 2;

/// Settings shared by the filter, sort and pagination parsers.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Query key holding the 1-based page number.
    pub page_key: String,
    /// Query key holding the page size.
    pub limit_key: String,
    /// Query key holding the sort field(s).
    pub sort_key: String,
    /// Query key holding the sort order word.
    pub order_key: String,
    /// Page used when the page parameter is missing or not positive.
    pub default_page: u64,
    /// Page size used when the limit parameter is missing or not positive.
    pub default_limit: u64,
    /// Order word meaning ascending (matched case-insensitively).
    pub order_ascending: String,
    /// Order word meaning descending (matched case-insensitively).
    pub order_descending: String,
    /// `chrono` format used to recognise timestamp parameters, read as UTC.
    pub datetime_format: String,
    /// Storage calls slower than this are logged at `warn`. `None` disables the check.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    pub slow_query_threshold: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_key: DEFAULT_PAGE_KEY.to_string(),
            limit_key: DEFAULT_LIMIT_KEY.to_string(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
            order_key: DEFAULT_ORDER_KEY.to_string(),
            default_page: DEFAULT_PAGE,
            default_limit: DEFAULT_LIMIT,
            order_ascending: ORDER_ASCENDING.to_string(),
            order_descending: ORDER_DESCENDING.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            slow_query_threshold: Some(Duration::from_secs(DEFAULT_SLOW_QUERY_SECS)),
        }
    }
}

impl QueryConfig {
    /// Whether `key` is one of the pagination or sorting keys that never become filters.
    #[must_use]
    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.page_key || key == self.limit_key || key == self.sort_key || key == self.order_key
    }
}
