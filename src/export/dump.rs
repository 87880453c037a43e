//! Full SQL text dump of a database
//!
//! Produces the same shape as SQLite's `.dump`: table DDL followed by one
//! `INSERT` per row, then indexes, triggers and views, all wrapped in a
//! single transaction so the output can be replayed with `execute_script`.
//!
//! Tables are emitted by name, so a child table may come before its parent.
//! The dump therefore starts with `PRAGMA foreign_keys=OFF;`, which leaves
//! foreign key enforcement off on the connection that replays it.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::clause::quote_ident;
use crate::db::{Database, Value};

/// Shadow tables vec0 creates next to a `<name>` virtual table
static VEC0_SHADOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(chunks|rowids|info|auxiliary|vector_chunks\d+|metadatachunks\d+|metadatatext\d+)$")
        .expect("valid shadow table pattern")
});

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Text(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Table kinds from `pragma_table_list`: table, view, shadow or virtual
fn table_kinds(db: &Database) -> Result<HashMap<String, String>> {
    let rows = db.fetch_all(
        "SELECT name, type FROM pragma_table_list WHERE schema = 'main';",
        &[],
    )?;
    Ok(rows
        .iter()
        .filter_map(|r| Some((text(r.get("name"))?, text(r.get("type"))?)))
        .collect())
}

/// Virtual tables and their shadow tables cannot be replayed as plain DDL
/// plus rows
fn is_virtual(kinds: &HashMap<String, String>, name: &str) -> bool {
    match kinds.get(name).map(String::as_str) {
        Some("virtual") | Some("shadow") => true,
        _ => kinds
            .iter()
            .filter(|(_, kind)| kind.as_str() == "virtual")
            .filter_map(|(table, _)| name.strip_prefix(table.as_str())?.strip_prefix('_'))
            .any(|suffix| VEC0_SHADOW.is_match(suffix)),
    }
}

/// One `INSERT INTO "t" VALUES(...)` per row, literals rendered by `quote()`
fn insert_statements(db: &Database, table: &str) -> Result<Vec<String>> {
    let columns = db.column_names(table)?;
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let ident = quote_ident(table);
    let values = columns
        .iter()
        .map(|c| format!("quote({})", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(" || ',' || ");
    let sql = format!(
        "SELECT {} || {} || ');' FROM {};",
        quote_literal(&format!("INSERT INTO {} VALUES(", ident)),
        values,
        ident
    );

    let rows = db.fetch_column(&sql, &[])?;
    Ok(rows.into_iter().filter_map(|v| text(Some(&v))).collect())
}

impl Database {
    /// Every statement of the SQL dump, in replay order
    pub fn dump_statements(&self) -> Result<Vec<String>> {
        let kinds = table_kinds(self)?;
        let mut lines = vec![
            "PRAGMA foreign_keys=OFF;".to_string(),
            "BEGIN TRANSACTION;".to_string(),
        ];
        let mut sequences = Vec::new();

        let tables = self.fetch_all(
            "SELECT name, sql FROM sqlite_master
             WHERE sql NOT NULL AND type == 'table' ORDER BY name;",
            &[],
        )?;

        for table in &tables {
            let (Some(name), Some(sql)) = (text(table.get("name")), text(table.get("sql"))) else {
                continue;
            };

            if is_virtual(&kinds, &name) {
                tracing::warn!(table = %name, "skipping virtual table in dump");
                continue;
            }

            if name == "sqlite_sequence" {
                sequences.push("DELETE FROM \"sqlite_sequence\";".to_string());
                sequences.extend(insert_statements(self, &name)?);
                continue;
            } else if name == "sqlite_stat1" {
                lines.push("ANALYZE \"sqlite_master\";".to_string());
            } else if name.starts_with("sqlite_") {
                continue;
            } else {
                lines.push(format!("{};", sql));
            }

            lines.extend(insert_statements(self, &name)?);
        }

        let others = self.fetch_column(
            "SELECT sql FROM sqlite_master
             WHERE sql NOT NULL AND type IN ('index', 'trigger', 'view') ORDER BY rowid;",
            &[],
        )?;
        lines.extend(others.iter().filter_map(|v| text(Some(v))).map(|s| format!("{};", s)));

        lines.extend(sequences);
        lines.push("COMMIT;".to_string());
        Ok(lines)
    }

    /// Write the SQL dump to `writer`, one statement per line
    pub fn dump_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let lines = self.dump_statements()?;
        writer
            .write_all(lines.join("\n").as_bytes())
            .context("Failed to write SQL dump")?;
        Ok(())
    }

    /// Dump the database to a `.sql` file (UTF-8)
    ///
    /// Defaults to `<name>.sql` in the working directory. Returns the path
    /// written.
    pub fn dump(&self, out: Option<&Path>) -> Result<PathBuf> {
        let path = out
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(format!("{}.sql", self.name())));

        let file = File::create(&path)
            .with_context(|| format!("Failed to create dump file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        self.dump_to_writer(&mut writer)?;
        writer.flush().context("Failed to flush SQL dump")?;

        tracing::info!(path = %path.display(), "dumped database");
        Ok(path)
    }
}
