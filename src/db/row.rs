//! Row shapes returned by the wrapper and the value containers fed into it
//!
//! A [`Row`] can be read positionally (tuple shape) or by column name
//! (mapping shape). [`Values`] and [`Filter`] carry the bound parameters for
//! writes and WHERE clauses.

use anyhow::{Context, Result};
use rusqlite::types::{FromSql, ValueRef};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

pub use rusqlite::types::Value;

/// A single result row: column names shared across the result set plus the
/// row's values in select order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Column names in select order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in select order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a position
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column with the given name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Typed read of a named column
    ///
    /// ```
    /// use sqrl::Database;
    ///
    /// let db = Database::open_in_memory()?;
    /// let row = db.fetch_one("SELECT 42 AS answer", &[])?.unwrap();
    /// let answer: i64 = row.get_as("answer")?;
    /// assert_eq!(answer, 42);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn get_as<T: FromSql>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .with_context(|| format!("No column named {}", column))?;
        T::column_result(ValueRef::from(value))
            .with_context(|| format!("Failed to convert column {}", column))
    }

    /// Mapping shape: an ordered JSON object of column -> value
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.clone(), value_to_json(v)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.columns.iter().zip(self.values.iter()) {
            map.serialize_entry(column, &value_to_json(value))?;
        }
        map.end()
    }
}

/// Convert a SQLite value to JSON. Blobs become lowercase hex strings.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => serde_json::Value::String(to_hex(b)),
    }
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Ordered column -> value pairs for INSERT and UPDATE statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    columns: Vec<String>,
    params: Vec<Value>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column value (builder style)
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(column.into());
        self.params.push(value.into());
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<C: Into<String>, V: Into<Value>> FromIterator<(C, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut values = Values::new();
        for (column, value) in iter {
            values.push(column, value);
        }
        values
    }
}

/// A WHERE clause together with the parameters bound to its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    clause: String,
    params: Vec<Value>,
}

impl Filter {
    pub fn new(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            params: Vec::new(),
        }
    }

    /// Matches every row (`1 = 1`)
    pub fn all() -> Self {
        Self::new("1 = 1")
    }

    /// Bind the next `?` placeholder
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}

impl From<&str> for Filter {
    fn from(clause: &str) -> Self {
        Self::new(clause)
    }
}

impl From<String> for Filter {
    fn from(clause: String) -> Self {
        Self::new(clause)
    }
}
