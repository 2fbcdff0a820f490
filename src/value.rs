//! # Comparable values
//!
//! [`Value`] is the closed set of scalars a filter can carry. Values that can be ordered
//! belong to exactly one [`Class`]; ordering is total inside a class and undefined across
//! classes. [`sort`], [`max`] and [`min`] work on whole batches and return `None` as soon
//! as the batch mixes classes.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Length of an [`ObjectId`] in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// A 12-byte document identifier written as 24 hexadecimal characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Lower-case hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether `s` is exactly 24 hex characters.
    #[must_use]
    pub fn is_valid_hex(s: &str) -> bool {
        s.len() == OBJECT_ID_LEN * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl FromStr for ObjectId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A scalar carried by a filter expression or read back from a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
    Identifier(ObjectId),
}

/// Comparison class of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Numeric,
    Text,
    Timestamp,
    Identifier,
}

impl Value {
    /// The comparison class, or `None` when the value cannot be ordered at all.
    ///
    /// `NaN` is unordered against every number, so it has no class.
    #[must_use]
    pub const fn class(&self) -> Option<Class> {
        match self {
            Self::Float(x) if x.is_nan() => None,
            Self::Int(_) | Self::UInt(_) | Self::Float(_) => Some(Class::Numeric),
            Self::Text(_) => Some(Class::Text),
            Self::Timestamp(_) => Some(Class::Timestamp),
            Self::Identifier(_) => Some(Class::Identifier),
            Self::Bool(_) => None,
        }
    }

    #[must_use]
    pub const fn is_comparable(&self) -> bool {
        self.class().is_some()
    }

    /// Numeric value as `f64`, read back from its decimal form.
    fn numeric(&self) -> Option<f64> {
        match self {
            Self::Int(_) | Self::UInt(_) | Self::Float(_) => self.to_string().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Identifier(id) => write!(f, "{id}"),
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64);
impl_from_int!(UInt, u64: u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        // isize is at most 64 bits on every supported target
        Self::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Self::Identifier(v)
    }
}

impl TryFrom<&serde_json::Value> for Value {
    type Error = ();

    /// Scalars only: numbers, strings and booleans. `null`, arrays and objects have no
    /// counterpart.
    fn try_from(json: &serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_u64().map(Self::UInt))
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or(()),
            serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(())
            }
        }
    }
}

impl Class {
    /// Orders two values of this class. Values outside the class compare equal, which
    /// never happens through [`sort`] since it checks membership first.
    #[must_use]
    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match (self, a, b) {
            (Self::Numeric, _, _) => match (a.numeric(), b.numeric()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
            (Self::Text, Value::Text(x), Value::Text(y)) => x.as_bytes().cmp(y.as_bytes()),
            (Self::Timestamp, Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
            (Self::Identifier, Value::Identifier(x), Value::Identifier(y)) => {
                x.to_hex().cmp(&y.to_hex())
            }
            _ => Ordering::Equal,
        }
    }
}

/// Sorts `values` ascending when they all share one class.
///
/// Returns `None` for a batch that mixes classes or contains a value with no class.
/// An empty batch sorts to an empty batch.
#[must_use]
pub fn sort(mut values: Vec<Value>) -> Option<Vec<Value>> {
    let Some(first) = values.first() else {
        return Some(values);
    };
    let class = first.class()?;
    if values.iter().any(|v| v.class() != Some(class)) {
        return None;
    }
    values.sort_by(|a, b| class.compare(a, b));
    Some(values)
}

/// Largest value of a single-class batch.
#[must_use]
pub fn max(values: Vec<Value>) -> Option<Value> {
    sort(values)?.pop()
}

/// Smallest value of a single-class batch.
#[must_use]
pub fn min(values: Vec<Value>) -> Option<Value> {
    sort(values)?.into_iter().next()
}
