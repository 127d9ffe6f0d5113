//! Record and field value types shared by predicates, comparators and covers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::render;

/// Identifier of a record within a dataset.
pub type RecordId = u64;

/// A set of block keys produced by a predicate.
///
/// Keys are compared as a set; the ordered representation only makes
/// iteration deterministic.
pub type Keys = BTreeSet<String>;

/// A single record, addressed by field index.
pub type Record = Vec<FieldValue>;

/// The value of one field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value was recorded.
    Missing,
    /// Free text.
    Text(String),
    /// A numeric value (prices, counts).
    Number(f64),
    /// A (latitude, longitude) pair.
    LatLong(f64, f64),
    /// A set of string elements.
    Set(BTreeSet<String>),
}

impl FieldValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Create a set value from any collection of strings.
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Set(values.into_iter().map(Into::into).collect())
    }

    /// Returns true if the value carries data.
    ///
    /// Empty strings and empty sets count as absent, as does NaN.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Missing => false,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Number(n) => !n.is_nan(),
            FieldValue::LatLong(..) => true,
            FieldValue::Set(s) => !s.is_empty(),
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Missing => "missing",
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::LatLong(..) => "lat/long",
            FieldValue::Set(_) => "set",
        }
    }

    /// Get the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical string rendering of the value.
    ///
    /// This is the key emitted by whole-field predicates, so it must be
    /// stable: sets render in sorted order and floats use the shortest
    /// round-tripping form.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Missing => "None".to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => render::float(*n),
            FieldValue::LatLong(lat, lng) => {
                format!("({}, {})", render::float(*lat), render::float(*lng))
            }
            FieldValue::Set(s) => render::set(s),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Missing
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<(f64, f64)> for FieldValue {
    fn from((lat, lng): (f64, f64)) -> Self {
        FieldValue::LatLong(lat, lng)
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(value: Option<&str>) -> Self {
        value.map(FieldValue::from).unwrap_or_default()
    }
}

/// A record together with its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedRecord {
    pub id: RecordId,
    pub fields: Record,
}

impl IdentifiedRecord {
    pub fn new(id: RecordId, fields: Record) -> Self {
        Self { id, fields }
    }
}
