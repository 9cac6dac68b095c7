//! Caller-supplied dataset shapes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Region identifier to numeric value. Keys are the canonical string form
/// of whatever the configured identifier path resolves to.
pub type DataMap = BTreeMap<String, f64>;

/// Region identifier to descriptive record, consumed by tooltip content.
pub type Metadata = BTreeMap<String, MetaItem>;

/// One region's descriptive record.
pub type MetaItem = BTreeMap<String, MetaValue>;

/// A metadata field. Mirrors the loose JSON records these datasets ship
/// with, where numbers and strings appear side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Num(f64),
    Str(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => f.write_str(&crate::property::format_number(*n)),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
