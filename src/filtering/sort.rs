use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::query_parser::QueryParams;
use crate::config::QueryConfig;

/// Prefix marking a descending sort field, e.g. `-created_at`.
pub const DESCENDING_PREFIX: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Read an order word using the configured spellings (case-insensitive).
    #[must_use]
    pub fn from_word(word: &str, config: &QueryConfig) -> Option<Self> {
        if word.eq_ignore_ascii_case(&config.order_ascending) {
            Some(Self::Asc)
        } else if word.eq_ignore_ascii_case(&config.order_descending) {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Parse a single sort field and its order.
///
/// Two forms are understood:
/// - json-server style: `?_sort=field&_order=DESC`
/// - prefixed style: `?_sort=-field`
///
/// A prefixed field is always descending. Otherwise an order word other than the
/// configured ascending/descending ones falls back to ascending. No sort parameter
/// means no sort.
#[must_use]
pub fn parse_sort(params: &QueryParams, config: &QueryConfig) -> Option<(String, SortOrder)> {
    let sort = params.get(&config.sort_key)?;
    if let Some(field) = sort.strip_prefix(DESCENDING_PREFIX) {
        return Some((field.to_string(), SortOrder::Desc));
    }
    let order = params
        .get(&config.order_key)
        .and_then(|word| SortOrder::from_word(word, config))
        .unwrap_or(SortOrder::Asc);
    Some((sort.to_string(), order))
}

/// Parse the sort parameter as a list of prefixed fields.
///
/// - no sort parameter gives an empty list
/// - a comma-separated list is split and returned as given, the order word is ignored
/// - a single field gets the `-` prefix when it has none and the order word is descending
#[must_use]
pub fn parse_sort_multiple(params: &QueryParams, config: &QueryConfig) -> Vec<String> {
    let Some(sort) = params.get(&config.sort_key) else {
        return Vec::new();
    };

    let fields: Vec<&str> = sort.split(',').collect();
    if fields.len() > 1 {
        return fields.into_iter().map(str::to_string).collect();
    }

    let descending = params
        .get(&config.order_key)
        .is_some_and(|word| word.eq_ignore_ascii_case(&config.order_descending));
    if descending && !sort.starts_with(DESCENDING_PREFIX) {
        vec![format!("{DESCENDING_PREFIX}{sort}")]
    } else {
        vec![sort.to_string()]
    }
}
