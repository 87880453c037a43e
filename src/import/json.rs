//! Tables from JSON files holding an array of objects

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

use super::{detect_json_type, json_value, ImportedTable};
use crate::db::{Database, Value};

/// Parse a JSON array of objects into columns and typed rows
///
/// Columns and their types come from the first object, in key order. Keys
/// missing from later objects load as NULL; extra keys are ignored.
pub fn read_json<R: Read>(reader: R) -> Result<ImportedTable> {
    let document: serde_json::Value =
        serde_json::from_reader(reader).context("Failed to parse json")?;

    let serde_json::Value::Array(items) = document else {
        bail!("Expected a JSON array of objects");
    };
    let Some(serde_json::Value::Object(first)) = items.first() else {
        bail!("Expected a non-empty JSON array of objects");
    };

    let columns = first
        .iter()
        .map(|(key, value)| (key.clone(), detect_json_type(value)))
        .collect::<Vec<_>>();

    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let serde_json::Value::Object(object) = item else {
            bail!("Element {} is not a JSON object", i);
        };
        let row = columns
            .iter()
            .map(|(key, _)| object.get(key).map(json_value).unwrap_or(Value::Null))
            .collect();
        rows.push(row);
    }

    Ok(ImportedTable { columns, rows })
}

impl Database {
    /// Create a table from a JSON file and return its name
    ///
    /// Naming follows [`Database::create_table_from_csv`].
    pub fn create_table_from_json(&self, path: &Path, table: Option<&str>) -> Result<String> {
        let name = super::target_table(self, path, table)?;
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open json file: {:?}", path))?;

        let data = read_json(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse json file: {:?}", path))?;
        super::load(self, &name, &data)?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ColumnType;

    #[test]
    fn test_read_json_keeps_key_order() -> Result<()> {
        let data = read_json(
            r#"[{"ArtistId": 43, "Name": "A Cor Do Som", "Score": 0.5},
                {"Name": "AC/DC", "ArtistId": 1}]"#
                .as_bytes(),
        )?;

        assert_eq!(
            data.columns,
            vec![
                ("ArtistId".to_string(), ColumnType::Integer),
                ("Name".to_string(), ColumnType::Text),
                ("Score".to_string(), ColumnType::Real),
            ]
        );
        assert_eq!(
            data.rows[1],
            vec![Value::Integer(1), Value::Text("AC/DC".into()), Value::Null]
        );
        Ok(())
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(read_json("not json".as_bytes()).is_err());
        assert!(read_json(r#"{"a": 1}"#.as_bytes()).is_err());
        assert!(read_json("[]".as_bytes()).is_err());
        assert!(read_json(r#"[{"a": 1}, 2]"#.as_bytes()).is_err());
    }
}
