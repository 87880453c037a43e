//! Schema listing commands

use anyhow::Result;
use std::path::Path;

use crate::GlobalArgs;

pub fn tables(db: &Path, global: &GlobalArgs) -> Result<()> {
    let db = super::open(db, global)?;
    for table in db.table_names()? {
        println!("{}", table);
    }
    Ok(())
}

pub fn columns(db: &Path, table: &str, global: &GlobalArgs) -> Result<()> {
    let db = super::open(db, global)?;
    let columns = db.column_names(table)?;
    if columns.is_empty() {
        anyhow::bail!("No table named {}", table);
    }
    for column in columns {
        println!("{}", column);
    }
    Ok(())
}
