//! CLI command implementations
//!
//! Each command opens the database through [`open`], which layers the CLI
//! flags over the options file.

pub mod export;
pub mod import;
pub mod info;
pub mod rows;

use anyhow::{bail, Result};
use sqrl::{Database, Options, Row};
use std::path::{Path, PathBuf};

use crate::GlobalArgs;

/// Options file lookup: `--config`, then `./sqrl.toml`, then `<config dir>/sqrl/config.toml`
fn config_path(global: &GlobalArgs) -> Option<PathBuf> {
    if let Some(path) = &global.config {
        return Some(path.clone());
    }

    let local = PathBuf::from("sqrl.toml");
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("sqrl").join("config.toml"))
        .filter(|path| path.exists())
}

pub fn load_options(db: &Path, global: &GlobalArgs) -> Result<Options> {
    let mut options = match config_path(global) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading options");
            Options::load_from_file(path)?
        }
        None => Options::default(),
    };

    options.path = db.to_path_buf();
    options.debug |= global.debug;
    options.validate()?;
    Ok(options)
}

pub fn open(db: &Path, global: &GlobalArgs) -> Result<Database> {
    Database::open_with(&load_options(db, global)?)
}

/// Single-byte field delimiter from a CLI char
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got {:?}", delimiter);
    }
    Ok(delimiter as u8)
}

/// Print rows as tab-separated text with a header, or as a JSON array
pub fn print_rows(rows: &[Row], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    let Some(first) = rows.first() else {
        println!("(no rows)");
        return Ok(());
    };

    println!("{}", first.columns().join("\t"));
    for row in rows {
        let cells: Vec<String> = row.values().iter().map(sqrl::export::csv_cell).collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}
