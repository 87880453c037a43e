//! Per-table CSV export

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::clause::quote_ident;
use crate::db::row::to_hex;
use crate::db::{Database, SelectQuery, Value};

/// Render a value as a CSV cell: NULL is empty, blobs are hex
pub fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format_real(*f),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => to_hex(b),
    }
}

/// Reals always keep a fractional part so they re-import as reals
pub fn format_real(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl Database {
    /// Export one table to `<dir>/<name>-<table>.csv`
    ///
    /// Returns `None` without writing anything when the table does not
    /// exist or holds no rows.
    pub fn export_table_to_csv(&self, table: &str, dir: &Path, delimiter: u8) -> Result<Option<PathBuf>> {
        if !self.table_exists(table)? {
            tracing::debug!(table, "skipping csv export of unknown table");
            return Ok(None);
        }

        let rows = self.select(&SelectQuery::from(quote_ident(table)))?;
        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let path = dir.join(format!("{}-{}.csv", self.name(), table));
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(&path)
            .with_context(|| format!("Failed to create csv file: {:?}", path))?;

        writer.write_record(first.columns())?;
        for row in &rows {
            writer.write_record(row.values().iter().map(csv_cell))?;
        }
        writer.flush().context("Failed to flush csv file")?;

        tracing::info!(table, rows = rows.len(), path = %path.display(), "exported table");
        Ok(Some(path))
    }

    /// Export every table to its own CSV file in `dir`
    pub fn export_to_csv(&self, dir: &Path, delimiter: u8) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {:?}", dir))?;

        let mut written = Vec::new();
        for table in self.table_names()? {
            if let Some(path) = self.export_table_to_csv(&table, dir, delimiter)? {
                written.push(path);
            }
        }
        Ok(written)
    }
}
