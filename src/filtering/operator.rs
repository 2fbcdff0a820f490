use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::value::{self, Value};

/// How a query parameter constrains its field.
///
/// The derive order of the variants is the order in which a field's operators are
/// merged when the filter is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// Equality (single value) or set membership (several values)
    Eq,
    /// Inequality (single value) or set exclusion (several values)
    Ne,
    /// Greater than the largest value given
    Gt,
    /// Greater than or equal to the largest value given
    Gte,
    /// Less than the smallest value given
    Lt,
    /// Less than or equal to the smallest value given
    Lte,
    /// Pattern match on the first value given
    Like,
}

/// Suffix table checked against parameter names, e.g. `age_gte=18`.
const SUFFIXES: [(&str, Operator); 6] = [
    ("_gt", Operator::Gt),
    ("_gte", Operator::Gte),
    ("_lt", Operator::Lt),
    ("_lte", Operator::Lte),
    ("_ne", Operator::Ne),
    ("_like", Operator::Like),
];

impl Operator {
    /// Parse operator from field name suffix (e.g. `"_gte"`).
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        SUFFIXES
            .iter()
            .find(|(s, _)| *s == suffix)
            .map(|&(_, op)| op)
    }

    /// Get the suffix for this operator. Equality has none.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Eq => "",
            Self::Ne => "_ne",
            Self::Gt => "_gt",
            Self::Gte => "_gte",
            Self::Lt => "_lt",
            Self::Lte => "_lte",
            Self::Like => "_like",
        }
    }

    /// Split a parameter name into its field and operator.
    ///
    /// The suffixes are mutually exclusive (`age_gte` ends in `_gte` but not in `_gt`),
    /// so at most one can match.
    #[must_use]
    pub fn split_key(key: &str) -> (&str, Self) {
        SUFFIXES
            .iter()
            .find_map(|&(suffix, op)| key.strip_suffix(suffix).map(|field| (field, op)))
            .unwrap_or((key, Self::Eq))
    }

    /// Collapse every value accumulated for this operator into one predicate.
    ///
    /// Range operators keep only the tightest bound: `x > max(a, b)` holds exactly when
    /// `x > a` and `x > b`. A range over values of different classes has no tightest bound
    /// and renders nothing, as does an empty value list.
    #[must_use]
    pub fn render(self, values: &[Value]) -> Option<Predicate> {
        let (first, rest) = values.split_first()?;
        let predicate = match self {
            Self::Eq if rest.is_empty() => Predicate::new(Keyword::Eq, first.clone()),
            Self::Eq => Predicate::new(Keyword::In, values.to_vec()),
            Self::Ne if rest.is_empty() => Predicate::new(Keyword::Ne, first.clone()),
            Self::Ne => Predicate::new(Keyword::Nin, values.to_vec()),
            Self::Gt | Self::Gte => {
                let bound = self.tightest(values, value::max)?;
                let keyword = if self == Self::Gt { Keyword::Gt } else { Keyword::Gte };
                Predicate::new(keyword, bound)
            }
            Self::Lt | Self::Lte => {
                let bound = self.tightest(values, value::min)?;
                let keyword = if self == Self::Lt { Keyword::Lt } else { Keyword::Lte };
                Predicate::new(keyword, bound)
            }
            // only the first pattern is honoured
            Self::Like => Predicate::new(Keyword::Regex, Value::Text(first.to_string())),
        };
        Some(predicate)
    }

    fn tightest(self, values: &[Value], pick: fn(Vec<Value>) -> Option<Value>) -> Option<Value> {
        let bound = pick(values.to_vec());
        if bound.is_none() {
            debug!(
                operator = %self,
                count = values.len(),
                "Dropping range constraint over incomparable values"
            );
        }
        bound
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
        };
        f.write_str(name)
    }
}

/// Comparison keyword of a rendered predicate, as the storage layer reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Eq,
    In,
    Ne,
    Nin,
    Gt,
    Gte,
    Lt,
    Lte,
    Regex,
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Single(Value),
    Many(Vec<Value>),
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<Value>> for Operand {
    fn from(values: Vec<Value>) -> Self {
        Self::Many(values)
    }
}

/// One rendered `keyword: operand` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub keyword: Keyword,
    pub operand: Operand,
}

impl Predicate {
    #[must_use]
    pub fn new(keyword: Keyword, operand: impl Into<Operand>) -> Self {
        Self {
            keyword,
            operand: operand.into(),
        }
    }
}
