//! Create and fill tables from CSV or JSON files
//!
//! Column types are detected from the first record. Creating the table and
//! inserting every record happen in one transaction, so a failed import leaves
//! no table behind.

pub mod csv;
pub mod detect;
pub mod json;

use anyhow::{bail, Context, Result};
use rusqlite::params_from_iter;
use std::path::Path;

use crate::clause::quote_ident;
use crate::db::{Database, Value};
pub use detect::{
    csv_value, detect_csv_type, detect_json_type, extract_filename, json_value,
    table_name_from_path, ColumnType,
};

/// Table layout and rows read from a file, ready to load
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTable {
    pub columns: Vec<(String, ColumnType)>,
    pub rows: Vec<Vec<Value>>,
}

impl ImportedTable {
    fn create_sql(&self, table: &str) -> String {
        let columns = self
            .columns
            .iter()
            .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({});", quote_ident(table), columns)
    }

    fn insert_sql(&self, table: &str) -> String {
        let names = self
            .columns
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "INSERT INTO {} ({}) VALUES ({});",
            quote_ident(table),
            names,
            vec!["?"; self.columns.len()].join(",")
        )
    }
}

/// Resolve the target table name and refuse to overwrite an existing table
pub(crate) fn target_table(db: &Database, path: &Path, table: Option<&str>) -> Result<String> {
    let name = match table {
        Some(t) => t.to_string(),
        None => table_name_from_path(path)?,
    };
    if name.is_empty() {
        bail!("Cannot derive a table name from {:?}", path);
    }
    if db.table_exists(&name)? {
        bail!("Table {} already exists", name);
    }
    Ok(name)
}

/// Create `table` and insert every row in a single transaction
pub(crate) fn load(db: &Database, table: &str, data: &ImportedTable) -> Result<()> {
    if data.columns.is_empty() {
        bail!("Nothing to import into {}: no columns", table);
    }

    let create = data.create_sql(table);
    let insert = data.insert_sql(table);
    db.log_statement(&create);
    db.log_statement(&insert);

    let conn = db.connection();
    let tx = conn
        .unchecked_transaction()
        .context("Failed to begin import transaction")?;
    tx.execute(&create, [])
        .with_context(|| format!("Failed to execute: {}", create))?;
    {
        let mut stmt = tx
            .prepare(&insert)
            .with_context(|| format!("Failed to prepare: {}", insert))?;
        for row in &data.rows {
            stmt.execute(params_from_iter(row.iter()))
                .with_context(|| format!("Failed to import row into {}", table))?;
        }
    }
    tx.commit().context("Failed to commit import")?;

    db.invalidate_schema();
    tracing::info!(table, rows = data.rows.len(), "imported table");
    Ok(())
}
