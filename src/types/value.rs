use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};

use super::expr::CompareOp;

/// A field value carried by a fact or an engine global.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub enum Value {
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
}

impl Value {
    /// Compare this value to another using the given operator.
    ///
    /// Returns `None` when the two values have no meaningful ordering
    /// (mixed kinds, NaN, or an ordering operator applied to booleans).
    #[must_use]
    pub fn compare(&self, op: CompareOp, other: &Value) -> Option<bool> {
        if let (Value::Bool(a), Value::Bool(b)) = (self, other) {
            return match op {
                CompareOp::Eq => Some(a == b),
                CompareOp::Neq => Some(a != b),
                _ => None,
            };
        }
        let ord = self.ordering(other)?;
        Some(match op {
            CompareOp::Eq => ord.is_eq(),
            CompareOp::Neq => ord.is_ne(),
            CompareOp::Gt => ord.is_gt(),
            CompareOp::Gte => ord.is_ge(),
            CompareOp::Lt => ord.is_lt(),
            CompareOp::Lte => ord.is_le(),
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn ordering(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_ordering() {
        let a = Value::Int(150);
        assert_eq!(a.compare(CompareOp::Gt, &Value::Int(100)), Some(true));
        assert_eq!(a.compare(CompareOp::Lte, &Value::Int(100)), Some(false));
        assert_eq!(a.compare(CompareOp::Gte, &Value::Int(150)), Some(true));
    }

    #[test]
    fn int_float_cross_type() {
        assert_eq!(
            Value::Int(10).compare(CompareOp::Eq, &Value::Float(10.0)),
            Some(true)
        );
        assert_eq!(
            Value::Float(9.5).compare(CompareOp::Lt, &Value::Int(10)),
            Some(true)
        );
    }

    #[test]
    fn bool_only_supports_equality() {
        let t = Value::Bool(true);
        assert_eq!(t.compare(CompareOp::Eq, &Value::Bool(true)), Some(true));
        assert_eq!(t.compare(CompareOp::Neq, &Value::Bool(false)), Some(true));
        assert_eq!(t.compare(CompareOp::Gt, &Value::Bool(false)), None);
    }

    #[test]
    fn mixed_kinds_are_incomparable() {
        assert_eq!(
            Value::from("10").compare(CompareOp::Eq, &Value::Int(10)),
            None
        );
    }

    #[test]
    fn nan_is_incomparable() {
        assert_eq!(
            Value::Float(f64::NAN).compare(CompareOp::Eq, &Value::Float(f64::NAN)),
            None
        );
    }

    #[test]
    fn string_display_is_quoted() {
        assert_eq!(Value::from("open").to_string(), "\"open\"");
        assert_eq!(Value::from(3_i64).to_string(), "3");
    }
}
