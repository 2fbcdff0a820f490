use serde::Serialize;

use super::query_parser::QueryParams;
use crate::config::QueryConfig;

/// Page window requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    /// Rows to skip before the page starts
    pub skip: u64,
    /// Page size
    pub limit: u64,
}

/// Positive integer parameter, or `None` when missing, unparsable or not positive.
fn positive(params: &QueryParams, key: &str) -> Option<u64> {
    params
        .get(key)
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|n| u64::try_from(n).ok())
        .filter(|&n| n > 0)
}

/// Read page and limit from the configured keys.
///
/// Anything that is not a positive integer falls back to the configured default, so
/// `?_page=-1&_limit=abc` is the same as no pagination parameters at all.
#[must_use]
pub fn parse_pagination(params: &QueryParams, config: &QueryConfig) -> PageRequest {
    let page = positive(params, &config.page_key).unwrap_or(config.default_page);
    let limit = positive(params, &config.limit_key).unwrap_or(config.default_limit);
    PageRequest {
        page,
        skip: page.saturating_sub(1).saturating_mul(limit),
        limit,
    }
}
