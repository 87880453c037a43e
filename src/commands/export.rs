//! SQL dump and CSV export commands

use anyhow::Result;
use std::path::Path;

use crate::GlobalArgs;

pub fn dump(db: &Path, out: Option<&Path>, global: &GlobalArgs) -> Result<()> {
    let db = super::open(db, global)?;
    let path = db.dump(out)?;
    println!("✓ Dumped to {}", path.display());
    Ok(())
}

pub fn csv(db: &Path, table: Option<&str>, dir: &Path, delimiter: char, global: &GlobalArgs) -> Result<()> {
    let delimiter = super::delimiter_byte(delimiter)?;
    let db = super::open(db, global)?;

    let written = match table {
        Some(table) => {
            std::fs::create_dir_all(dir)?;
            db.export_table_to_csv(table, dir, delimiter)?
                .into_iter()
                .collect()
        }
        None => db.export_to_csv(dir, delimiter)?,
    };

    if written.is_empty() {
        println!("Nothing to export");
    }
    for path in written {
        println!("✓ {}", path.display());
    }
    Ok(())
}
