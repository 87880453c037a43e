//! Table import command

use anyhow::{bail, Result};
use std::path::Path;

use crate::GlobalArgs;

/// Create a table from a `.csv` or `.json` file, chosen by extension
pub fn execute(db: &Path, file: &Path, table: Option<&str>, delimiter: char, global: &GlobalArgs) -> Result<()> {
    let db = super::open(db, global)?;

    let extension = file
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let name = match extension.as_str() {
        "csv" | "tsv" | "txt" => {
            db.create_table_from_csv(file, table, super::delimiter_byte(delimiter)?)?
        }
        "json" => db.create_table_from_json(file, table)?,
        other => bail!("Unsupported import format: {:?} (expected csv or json)", other),
    };

    println!("✓ Created table {} ({} rows)", name, db.count(&name, None)?);
    Ok(())
}
