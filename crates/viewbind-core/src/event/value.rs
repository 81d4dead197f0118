use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar payload of `Value`, `Url` and `Discriminator` events
///
/// Untagged so that codec adapters can serialize it as a bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ViewValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ViewValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ViewValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ViewValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewValue::Null => write!(f, "null"),
            ViewValue::Bool(b) => write!(f, "{}", b),
            ViewValue::Int(i) => write!(f, "{}", i),
            ViewValue::Float(x) => write!(f, "{}", x),
            ViewValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<bool> for ViewValue {
    fn from(b: bool) -> Self {
        ViewValue::Bool(b)
    }
}

impl From<i64> for ViewValue {
    fn from(i: i64) -> Self {
        ViewValue::Int(i)
    }
}

impl From<f64> for ViewValue {
    fn from(x: f64) -> Self {
        ViewValue::Float(x)
    }
}

impl From<&str> for ViewValue {
    fn from(s: &str) -> Self {
        ViewValue::Text(s.to_string())
    }
}

impl From<String> for ViewValue {
    fn from(s: String) -> Self {
        ViewValue::Text(s)
    }
}

impl From<()> for ViewValue {
    fn from(_: ()) -> Self {
        ViewValue::Null
    }
}
