//! Filter accumulation and rendering.
//!
//! A [`FilterBuilder`] collects `(field, operator, values)` triples while a request's
//! parameters are scanned, then renders them once into a [`Filter`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use super::operator::{Keyword, Operand, Operator, Predicate};
use crate::value::Value;

/// Constraints on one field, keyed by comparison keyword. All of them must hold.
pub type FieldFilter = BTreeMap<Keyword, Operand>;

/// A conjunctive filter expression.
///
/// Serializes as `{"age": {"gt": 18, "lte": 60}}` for field constraints and as
/// `{"and": [..]}` for a conjunction of sub-filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Fields(BTreeMap<String, FieldFilter>),
    And(Vec<Filter>),
}

impl Default for Filter {
    fn default() -> Self {
        Self::Fields(BTreeMap::new())
    }
}

impl Filter {
    /// Filter that matches everything.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single-predicate filter on `field`.
    #[must_use]
    pub fn field(field: impl Into<String>, keyword: Keyword, operand: impl Into<Operand>) -> Self {
        let mut conditions = FieldFilter::new();
        conditions.insert(keyword, operand.into());
        Self::Fields(BTreeMap::from([(field.into(), conditions)]))
    }

    /// Whether this filter places no constraint at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Fields(fields) => fields.is_empty(),
            Self::And(parts) => parts.iter().all(Self::is_empty),
        }
    }

    /// Both `self` and `other` must hold. An empty side is dropped instead of being
    /// wrapped in a conjunction.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => other,
            (_, true) => self,
            _ => Self::And(vec![self, other]),
        }
    }

    /// Constraints on `field`, if this is a field filter that mentions it.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldFilter> {
        match self {
            Self::Fields(fields) => fields.get(field),
            Self::And(_) => None,
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Fields(fields) => fields.serialize(serializer),
            Self::And(parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("and", parts)?;
                map.end()
            }
        }
    }
}

/// Shallow-merge predicates into one field filter.
///
/// A keyword that appears twice keeps the later operand. The operators in this crate
/// never share a keyword, so the overwrite only matters for hand-built predicates.
#[must_use]
pub fn merge(predicates: impl IntoIterator<Item = Predicate>) -> FieldFilter {
    let mut merged = FieldFilter::new();
    for predicate in predicates {
        merged.insert(predicate.keyword, predicate.operand);
    }
    merged
}

/// Accumulates constraints for one request.
///
/// ```rust,ignore
/// let mut builder = FilterBuilder::new();
/// builder.add("name", Operator::Eq, ["tom", "jerry"]);
/// builder.add("age", Operator::Gt, [10]);
/// let filter = builder.render();
/// // {"age": {"gt": 10}, "name": {"in": ["tom", "jerry"]}}
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    fields: BTreeMap<String, BTreeMap<Operator, Vec<Value>>>,
}

impl FilterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `values` under `(field, op)`. Never fails and never checks types.
    pub fn add<V>(&mut self, field: impl Into<String>, op: Operator, values: impl IntoIterator<Item = V>)
    where
        V: Into<Value>,
    {
        self.fields
            .entry(field.into())
            .or_default()
            .entry(op)
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Append a single value.
    pub fn push(&mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) {
        self.add(field, op, [value]);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values accumulated so far under `(field, op)`.
    #[must_use]
    pub fn values(&self, field: &str, op: Operator) -> &[Value] {
        self.fields
            .get(field)
            .and_then(|ops| ops.get(&op))
            .map_or(&[], Vec::as_slice)
    }

    /// Render every field into one conjunctive filter.
    ///
    /// Operators that render nothing (no values, or an incomparable range) are left out,
    /// and a field left with no predicate at all is omitted.
    #[must_use]
    pub fn render(&self) -> Filter {
        let fields = self
            .fields
            .iter()
            .filter_map(|(field, ops)| {
                let merged = merge(ops.iter().filter_map(|(op, values)| op.render(values)));
                (!merged.is_empty()).then(|| (field.clone(), merged))
            })
            .collect();
        Filter::Fields(fields)
    }
}
