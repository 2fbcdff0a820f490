use chrono::NaiveDateTime;
use std::borrow::Cow;
use tracing::trace;
use url::form_urlencoded;

use super::builder::{Filter, FilterBuilder};
use super::operator::Operator;
use crate::config::QueryConfig;
use crate::value::{ObjectId, Value};

/// Caller-supplied conversion tried after the built-in ones: `(field, raw) -> value`.
pub type Converter<'a> = &'a dyn Fn(&str, &str) -> Option<Value>;

/// Raw request parameters in arrival order. A key may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string (without the leading `?`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First non-empty value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).find(|v| !v.is_empty())
    }

    /// Every value for `key`, in arrival order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Boolean spellings accepted in query strings.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Turn a raw parameter into the most specific [`Value`] it reads as.
///
/// First match wins: identifier, integer, float, boolean, timestamp in
/// `config.datetime_format` (read as UTC), each converter in order, then plain text.
/// Since integers come before booleans, `"1"` and `"0"` are always numbers.
#[must_use]
pub fn coerce_value(field: &str, raw: &str, config: &QueryConfig, converters: &[Converter<'_>]) -> Value {
    if ObjectId::is_valid_hex(raw)
        && let Ok(id) = raw.parse::<ObjectId>()
    {
        return Value::Identifier(id);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    if let Some(b) = parse_bool(raw) {
        return Value::Bool(b);
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(raw, &config.datetime_format) {
        return Value::Timestamp(date.and_utc());
    }
    converters
        .iter()
        .find_map(|convert| convert(field, raw))
        .unwrap_or_else(|| Value::Text(raw.to_string()))
}

/// Identifier lookups address the storage key: `id` becomes `_id` and every `.id` in a
/// nested path becomes `._id`. Other values keep the field name untouched.
fn storage_field<'a>(field: &'a str, value: &Value) -> Cow<'a, str> {
    if !matches!(value, Value::Identifier(_)) {
        return Cow::Borrowed(field);
    }
    if field == "id" {
        Cow::Borrowed("_id")
    } else if field.contains(".id") {
        Cow::Owned(field.replace(".id", "._id"))
    } else {
        Cow::Borrowed(field)
    }
}

/// Scan every non-reserved parameter into a [`FilterBuilder`].
///
/// Parameter names follow the json-server conventions:
/// - `field=value` for equality, repeated for set membership
/// - `field_gt`, `field_gte`, `field_lt`, `field_lte` for ranges
/// - `field_ne` to exclude a value
/// - `field_like` for a pattern match
/// - `.` to reach nested properties (`user.name=jack`)
#[must_use]
pub fn build_filter(params: &QueryParams, config: &QueryConfig, converters: &[Converter<'_>]) -> FilterBuilder {
    let mut builder = FilterBuilder::new();
    for (key, raw) in params.iter() {
        if config.is_reserved(key) {
            continue;
        }
        let (field, op) = Operator::split_key(key);
        let value = coerce_value(field, raw, config, converters);
        let field = storage_field(field, &value);
        trace!(field = %field, operator = %op, value = %value, "Adding filter value");
        builder.push(field.into_owned(), op, value);
    }
    builder
}

/// Parse request parameters straight into a rendered [`Filter`].
///
/// ```rust,ignore
/// let params = QueryParams::parse("name=tom&name=jerry&age_gt=10&_page=2");
/// let filter = parse_filter(&params, &QueryConfig::default(), &[]);
/// // {"age": {"gt": 10}, "name": {"in": ["tom", "jerry"]}}
/// ```
#[must_use]
pub fn parse_filter(params: &QueryParams, config: &QueryConfig, converters: &[Converter<'_>]) -> Filter {
    build_filter(params, config, converters).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::operator::{Keyword, Operand};
    use chrono::{TimeZone, Utc};

    fn coerce(raw: &str) -> Value {
        coerce_value("field", raw, &QueryConfig::default(), &[])
    }

    #[test]
    fn test_query_params_parse() {
        let params = QueryParams::parse("?name=tom&name=jerry&empty=&msg=hello%20world&plus=a+b");
        assert_eq!(params.len(), 5);
        assert_eq!(params.get("name"), Some("tom"));
        assert_eq!(params.get_all("name").collect::<Vec<_>>(), ["tom", "jerry"]);
        assert_eq!(params.get("empty"), None, "empty values are treated as missing");
        assert_eq!(params.get("msg"), Some("hello world"));
        assert_eq!(params.get("plus"), Some("a b"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_query_params_get_skips_empty_values() {
        let params: QueryParams = [("_sort", ""), ("_sort", "name")].into_iter().collect();
        assert_eq!(params.get("_sort"), Some("name"));
    }

    #[test]
    fn test_coerce_order() {
        let id: ObjectId = "58db2700cf2f6715b00021a7".parse().unwrap();
        assert_eq!(coerce("58db2700cf2f6715b00021a7"), Value::Identifier(id));
        assert_eq!(coerce("10"), Value::Int(10));
        assert_eq!(coerce("-3"), Value::Int(-3));
        assert_eq!(coerce("1.5"), Value::Float(1.5));
        assert_eq!(coerce("true"), Value::Bool(true));
        assert_eq!(coerce("F"), Value::Bool(false));
        assert_eq!(
            coerce("2017-04-11T15:31:44"),
            Value::Timestamp(Utc.with_ymd_and_hms(2017, 4, 11, 15, 31, 44).unwrap())
        );
        assert_eq!(coerce("mary"), Value::Text("mary".into()));
        assert_eq!(coerce("yes"), Value::Text("yes".into()));
    }

    #[test]
    fn test_numeric_strings_are_never_booleans() {
        assert_eq!(coerce("1"), Value::Int(1));
        assert_eq!(coerce("0"), Value::Int(0));
    }

    #[test]
    fn test_all_boolean_spellings() {
        for raw in ["t", "T", "TRUE", "true", "True"] {
            assert_eq!(coerce(raw), Value::Bool(true), "{raw} should be true");
        }
        for raw in ["f", "F", "FALSE", "false", "False"] {
            assert_eq!(coerce(raw), Value::Bool(false), "{raw} should be false");
        }
        assert_eq!(coerce("tRUE"), Value::Text("tRUE".into()));
    }

    #[test]
    fn test_custom_datetime_format() {
        let config = QueryConfig {
            datetime_format: "%Y/%m/%d %H:%M".to_string(),
            ..QueryConfig::default()
        };
        assert_eq!(
            coerce_value("born_at", "1990/01/01 12:00", &config, &[]),
            Value::Timestamp(Utc.with_ymd_and_hms(1990, 1, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            coerce_value("born_at", "1990-01-01T12:00:00", &config, &[]),
            Value::Text("1990-01-01T12:00:00".into())
        );
    }

    #[test]
    fn test_converters_run_in_order_after_builtins() {
        let upper = |field: &str, raw: &str| (field == "code").then(|| Value::Text(raw.to_uppercase()));
        let never = |_: &str, _: &str| -> Option<Value> { None };
        let shadowed = |_: &str, _: &str| Some(Value::Text("shadowed".into()));
        let converters: [Converter<'_>; 3] = [&never, &upper, &shadowed];
        let config = QueryConfig::default();

        assert_eq!(coerce_value("code", "ab", &config, &converters), Value::Text("AB".into()));
        assert_eq!(
            coerce_value("other", "ab", &config, &converters),
            Value::Text("shadowed".into())
        );
        assert_eq!(
            coerce_value("code", "12", &config, &converters),
            Value::Int(12),
            "built-in coercions win over converters"
        );
    }

    #[test]
    fn test_id_rewrite_requires_identifier() {
        let config = QueryConfig::default();
        let params = QueryParams::parse("id=58db2700cf2f6715b00021a7&user.id=58db2700cf2f6715b00021a7");
        let filter = parse_filter(&params, &config, &[]);
        assert!(filter.get("_id").is_some());
        assert!(filter.get("user._id").is_some());
        assert!(filter.get("id").is_none());

        let params = QueryParams::parse("id=42&user.id=abc");
        let filter = parse_filter(&params, &config, &[]);
        assert_eq!(
            filter.get("id").and_then(|f| f.get(&Keyword::Eq)),
            Some(&Operand::Single(Value::Int(42)))
        );
        assert!(filter.get("user.id").is_some());
        assert!(filter.get("_id").is_none());
    }

    #[test]
    fn test_reserved_keys_are_skipped() {
        let params = QueryParams::parse("_page=2&_limit=10&_sort=name&_order=desc&name=jack");
        let builder = build_filter(&params, &QueryConfig::default(), &[]);
        let filter = builder.render();
        assert!(filter.get("_page").is_none());
        assert!(filter.get("_sort").is_none());
        assert!(filter.get("name").is_some());
    }

    #[test]
    fn test_custom_reserved_keys() {
        let config = QueryConfig {
            page_key: "page".to_string(),
            ..QueryConfig::default()
        };
        let params = QueryParams::parse("page=2&_page=3");
        let filter = parse_filter(&params, &config, &[]);
        assert!(filter.get("page").is_none());
        assert!(filter.get("_page").is_some(), "only configured keys are reserved");
    }

    #[test]
    fn test_nan_drops_range_bound() {
        let query = (0..200)
            .map(|i| if i % 7 == 0 { "x_gt=NaN".to_string() } else { format!("x_gt={}", (i * 37) % 101) })
            .collect::<Vec<_>>()
            .join("&");
        let filter = parse_filter(&QueryParams::parse(&query), &QueryConfig::default(), &[]);
        assert!(filter.get("x").is_none(), "a NaN bound must not loosen the range: {filter:?}");

        let query = (0..200)
            .filter(|i| i % 7 != 0)
            .map(|i| format!("x_gt={}", (i * 37) % 101))
            .collect::<Vec<_>>()
            .join("&");
        let filter = parse_filter(&QueryParams::parse(&query), &QueryConfig::default(), &[]);
        assert_eq!(
            filter.get("x").and_then(|f| f.get(&Keyword::Gt)),
            Some(&Operand::Single(Value::Int(100)))
        );
    }

    #[test]
    fn test_hex_values_are_identifiers_on_any_field() {
        let id: ObjectId = "deadbeefdeadbeefdeadbeef".parse().unwrap();
        let params = QueryParams::parse("hash=deadbeefdeadbeefdeadbeef");
        let filter = parse_filter(&params, &QueryConfig::default(), &[]);
        assert_eq!(
            filter.get("hash").and_then(|f| f.get(&Keyword::Eq)),
            Some(&Operand::Single(Value::Identifier(id))),
            "identifier coercion is not limited to id fields"
        );
        assert!(filter.get("_id").is_none(), "only id fields are renamed");
    }

    #[test]
    fn test_suffix_on_identifier_field() {
        let params = QueryParams::parse("id_ne=58db2700cf2f6715b00021a7");
        let filter = parse_filter(&params, &QueryConfig::default(), &[]);
        assert!(filter.get("_id").unwrap().contains_key(&Keyword::Ne));
    }
}
