//! Dot-path lookup into geometry properties.

use serde_json::Value;

/// Scalar produced by a property lookup.
///
/// Only strings and numbers are useful as region identifiers; objects,
/// arrays, booleans and nulls all collapse to [`PropertyValue::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Num(f64),
    Empty,
}

impl PropertyValue {
    pub fn from_scalar(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Str(s.clone()),
            Value::Number(n) => match n.as_f64() {
                Some(num) => Self::Num(num),
                None => Self::Empty,
            },
            _ => Self::Empty,
        }
    }

    /// Canonical string form used to key data maps and element ids.
    ///
    /// Numbers drop a trailing `.0` so that a JSON id of `33` and a data
    /// key of `"33"` address the same region.
    pub fn canonical(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(n) => format_number(*n),
            Self::Empty => String::new(),
        }
    }

    /// True when the value cannot serve as an identifier. The number zero
    /// is a valid identifier; an empty string is not.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Num(_) => false,
            Self::Empty => true,
        }
    }
}

/// Formats a number the way JavaScript's `String(n)` does for the common
/// cases: integral values print without a fractional part.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Walks `record` along a `.`-separated path and returns the scalar at the
/// end of it. Every miss (absent key, non-object step, empty segment)
/// returns [`PropertyValue::Empty`] rather than an error.
pub fn resolve(record: &Value, path: &str) -> PropertyValue {
    let mut current = record;
    for segment in path.split('.') {
        if segment.is_empty() {
            return PropertyValue::Empty;
        }
        match current.get(segment) {
            Some(next) => current = next,
            None => return PropertyValue::Empty,
        }
    }
    PropertyValue::from_scalar(current)
}
