// used to convert raw storage values at the boundary
use rusqlite::types::ValueRef;

// used for temporal columns in the reference table
use chrono::NaiveDateTime;

use std::fmt;

/// The closed set of scalar values a storage column can hold once it has
/// crossed the boundary into the pipeline. Conversion from SQL happens
/// exactly once, in [`ColumnValue::from_sql`], so the rest of the crate never
/// sees a raw storage type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl ColumnValue {
    /// Converts a raw storage value, using the column's declared type to
    /// disambiguate what SQLite stores as plain integers and text:
    /// BOOL integers become [`ColumnValue::Bool`], DATETIME/TIMESTAMP text
    /// becomes [`ColumnValue::Timestamp`], and DECIMAL/NUMERIC text becomes
    /// [`ColumnValue::Float`]. Anything unrecognized passes through as the
    /// storage class suggests.
    pub fn from_sql(value: ValueRef<'_>, decl_type: Option<&str>) -> ColumnValue {
        let decl = decl_type.map(|d| d.to_ascii_uppercase()).unwrap_or_default();
        match value {
            ValueRef::Null => ColumnValue::Null,
            ValueRef::Integer(i) => {
                if decl.contains("BOOL") {
                    ColumnValue::Bool(i != 0)
                } else {
                    ColumnValue::Int(i)
                }
            }
            ValueRef::Real(f) => ColumnValue::Float(f),
            ValueRef::Text(t) => {
                let s = String::from_utf8_lossy(t).into_owned();
                if decl.contains("DATETIME") || decl.contains("TIMESTAMP") {
                    match parse_timestamp(&s) {
                        Some(ts) => ColumnValue::Timestamp(ts),
                        None => ColumnValue::Text(s),
                    }
                } else if decl.contains("DECIMAL") || decl.contains("NUMERIC") {
                    match s.parse::<f64>() {
                        Ok(f) => ColumnValue::Float(f),
                        Err(_) => ColumnValue::Text(s),
                    }
                } else {
                    ColumnValue::Text(s)
                }
            }
            // no bytes variant in the document model
            ValueRef::Blob(b) => ColumnValue::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }

    /// Renders the value as its JSON-safe equivalent: timestamps become
    /// ISO-8601 strings, everything else maps to the native JSON scalar.
    /// Non-finite floats have no JSON representation and become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ColumnValue::Null => serde_json::Value::Null,
            ColumnValue::Bool(b) => serde_json::Value::Bool(*b),
            ColumnValue::Int(i) => serde_json::Value::from(*i),
            ColumnValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ColumnValue::Text(s) => serde_json::Value::String(s.clone()),
            ColumnValue::Timestamp(ts) => {
                serde_json::Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColumnValue::Null => write!(f, "null"),
            ColumnValue::Bool(b) => write!(f, "{}", b),
            ColumnValue::Int(i) => write!(f, "{}", i),
            ColumnValue::Float(x) => write!(f, "{}", x),
            ColumnValue::Text(s) => write!(f, "{}", s),
            ColumnValue::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// One fetched row: column names paired with converted values, in the order
/// the query returned them.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<(String, ColumnValue)>,
}

impl Row {
    pub fn new(columns: Vec<(String, ColumnValue)>) -> Self {
        Self { columns }
    }
    pub fn columns(&self) -> &[(String, ColumnValue)] {
        &self.columns
    }
    /// The raw text of the given column, if it holds text.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_text())
    }
}
