//! Column type detection and value conversion for imported files

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::db::Value;

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid integer pattern"));
static REAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("valid real pattern"));

/// Declared type of an imported column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
        }
    }
}

/// Type of a CSV cell judged by its text
pub fn detect_csv_type(cell: &str) -> ColumnType {
    if INTEGER.is_match(cell) {
        ColumnType::Integer
    } else if REAL.is_match(cell) {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

/// Type of a JSON value judged by its kind; strings are always text
pub fn detect_json_type(value: &serde_json::Value) -> ColumnType {
    match value {
        serde_json::Value::Number(n) if n.is_i64() => ColumnType::Integer,
        serde_json::Value::Number(_) => ColumnType::Real,
        serde_json::Value::Bool(_) => ColumnType::Integer,
        _ => ColumnType::Text,
    }
}

/// Convert a CSV cell for a column of type `ty`; empty cells become NULL
///
/// Text columns keep the cell verbatim. Numeric columns fall back to text
/// when the cell does not parse.
pub fn csv_value(cell: &str, ty: ColumnType) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match ty {
        ColumnType::Integer => cell
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(cell.to_string())),
        ColumnType::Real => cell
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Real)
            .unwrap_or_else(|| Value::Text(cell.to_string())),
        ColumnType::Text => Value::Text(cell.to_string()),
    }
}

/// Convert a JSON value; arrays and objects are stored as JSON text
pub fn json_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Real).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// File name without directory or extension
pub fn extract_filename(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("No file name in {:?}", path))
}

/// Table name derived from a file: the stem with non-alphanumerics as `_`
pub fn table_name_from_path(path: &Path) -> Result<String> {
    let stem = extract_filename(path)?;
    Ok(stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_filename() -> Result<()> {
        assert_eq!(extract_filename(Path::new("hello/world.txt"))?, "world");
        assert_eq!(extract_filename(Path::new("world"))?, "world");
        assert_eq!(table_name_from_path(Path::new("data/chinook-artists.csv"))?, "chinook_artists");
        Ok(())
    }

    #[test]
    fn test_detect_csv_type() {
        assert_eq!(detect_csv_type("1"), ColumnType::Integer);
        assert_eq!(detect_csv_type("1.0"), ColumnType::Real);
        assert_eq!(detect_csv_type("1.2"), ColumnType::Real);
        assert_eq!(detect_csv_type("-1"), ColumnType::Text);
        assert_eq!(detect_csv_type("1."), ColumnType::Text);
        assert_eq!(detect_csv_type("hello world"), ColumnType::Text);
    }

    #[test]
    fn test_detect_json_type() {
        assert_eq!(detect_json_type(&json!(1)), ColumnType::Integer);
        assert_eq!(detect_json_type(&json!(u64::MAX)), ColumnType::Real);
        assert_eq!(detect_json_type(&json!(1.0)), ColumnType::Real);
        assert_eq!(detect_json_type(&json!(1.2)), ColumnType::Real);
        assert_eq!(detect_json_type(&json!("1.2")), ColumnType::Text);
        assert_eq!(detect_json_type(&json!("1")), ColumnType::Text);
        assert_eq!(detect_json_type(&json!("hello world")), ColumnType::Text);
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(csv_value("43", ColumnType::Integer), Value::Integer(43));
        assert_eq!(csv_value("0.99", ColumnType::Real), Value::Real(0.99));
        assert_eq!(csv_value("2", ColumnType::Real), Value::Real(2.0));
        assert_eq!(csv_value("AC/DC", ColumnType::Text), Value::Text("AC/DC".into()));
        assert_eq!(csv_value("", ColumnType::Text), Value::Null);
        // too large for i64, kept verbatim
        assert_eq!(
            csv_value("99999999999999999999", ColumnType::Integer),
            Value::Text("99999999999999999999".into())
        );
        assert_eq!(csv_value("n/a", ColumnType::Real), Value::Text("n/a".into()));
        assert_eq!(csv_value("NaN", ColumnType::Real), Value::Text("NaN".into()));

        assert_eq!(json_value(&json!(true)), Value::Integer(1));
        assert_eq!(json_value(&json!(u64::MAX)), Value::Real(u64::MAX as f64));
        assert_eq!(json_value(&json!([1, 2])), Value::Text("[1,2]".into()));
    }
}
