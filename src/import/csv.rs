//! Tables from CSV files with a header row

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

use super::{csv_value, detect_csv_type, ColumnType, ImportedTable};
use crate::db::Database;

/// Parse CSV text into columns and typed rows
///
/// Column types come from the first data row; a header-only file yields text
/// columns and no rows.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<ImportedTable> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read csv header")?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV input has no header row");
    }

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read csv records")?;

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let ty = records
                .first()
                .and_then(|r| r.get(i))
                .map(detect_csv_type)
                .unwrap_or(ColumnType::Text);
            (name, ty)
        })
        .collect::<Vec<_>>();

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, (_, ty))| {
                    record
                        .get(i)
                        .map(|cell| csv_value(cell, *ty))
                        .unwrap_or(crate::db::Value::Null)
                })
                .collect()
        })
        .collect();

    Ok(ImportedTable { columns, rows })
}

impl Database {
    /// Create a table from a CSV file and return its name
    ///
    /// The table is named after the file (`chinook-artists.csv` becomes
    /// `chinook_artists`) unless `table` is given. Fails when the table
    /// already exists.
    pub fn create_table_from_csv(&self, path: &Path, table: Option<&str>, delimiter: u8) -> Result<String> {
        let name = super::target_table(self, path, table)?;
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open csv file: {:?}", path))?;

        let data = read_csv(file, delimiter)
            .with_context(|| format!("Failed to parse csv file: {:?}", path))?;
        super::load(self, &name, &data)?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;

    #[test]
    fn test_read_csv_types_from_first_row() -> Result<()> {
        let data = read_csv("ArtistId,Name,Rating\n1,AC/DC,4.5\n2,Accept,\n".as_bytes(), b',')?;

        assert_eq!(
            data.columns,
            vec![
                ("ArtistId".to_string(), ColumnType::Integer),
                ("Name".to_string(), ColumnType::Text),
                ("Rating".to_string(), ColumnType::Real),
            ]
        );
        assert_eq!(data.rows[1], vec![Value::Integer(2), Value::Text("Accept".into()), Value::Null]);
        Ok(())
    }

    #[test]
    fn test_text_column_keeps_digit_cells_verbatim() -> Result<()> {
        let data = read_csv("code,zip\nA,ABC12\nB,02134\nC,1.50\n".as_bytes(), b',')?;

        assert_eq!(data.columns[1], ("zip".to_string(), ColumnType::Text));
        let zips: Vec<&Value> = data.rows.iter().map(|r| &r[1]).collect();
        assert_eq!(
            zips,
            [
                &Value::Text("ABC12".into()),
                &Value::Text("02134".into()),
                &Value::Text("1.50".into()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_numeric_column_parses_later_cells() -> Result<()> {
        let data = read_csv("id,price\n1,0.99\n2,3\nx,n/a\n".as_bytes(), b',')?;

        assert_eq!(data.rows[1], vec![Value::Integer(2), Value::Real(3.0)]);
        assert_eq!(data.rows[2], vec![Value::Text("x".into()), Value::Text("n/a".into())]);
        Ok(())
    }

    #[test]
    fn test_read_csv_custom_delimiter() -> Result<()> {
        let data = read_csv("a;b\n1;x\n".as_bytes(), b';')?;
        assert_eq!(data.columns.len(), 2);
        assert_eq!(data.rows[0][0], Value::Integer(1));
        Ok(())
    }

    #[test]
    fn test_header_only() -> Result<()> {
        let data = read_csv("a,b\n".as_bytes(), b',')?;
        assert!(data.rows.is_empty());
        assert!(data.columns.iter().all(|(_, ty)| *ty == ColumnType::Text));
        assert!(read_csv("".as_bytes(), b',').is_err());
        Ok(())
    }
}
