//! SQLite connection wrapper
//!
//! Owns the `rusqlite::Connection`, applies the connection pragmas and runs
//! every statement the helpers build. Writes run inside a transaction and are
//! rolled back when they fail.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection, Statement};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::row::{Row, Value};
use crate::config::Options;

/// SQLite database with convenience helpers
///
/// `Send` but not `Sync`: a connection is used from one thread at a time.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
    debug: bool,
    pub(crate) schema: Mutex<BTreeMap<String, Vec<String>>>,
}

impl Database {
    /// Open or create a SQLite database file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(&Options::file(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open_with(&Options::default())
    }

    /// Open a database using explicit options
    pub fn open_with(options: &Options) -> Result<Self> {
        options.validate()?;

        #[cfg(feature = "vec")]
        if options.vector {
            super::vectors::register_extension();
        }

        let (conn, path) = if options.is_in_memory() {
            let conn =
                Connection::open_in_memory().context("Failed to create in-memory database")?;
            (conn, None)
        } else {
            let conn = Connection::open(&options.path).with_context(|| {
                format!("Failed to open SQLite database: {:?}", options.path)
            })?;
            (conn, Some(options.path.clone()))
        };

        let db = Self {
            conn,
            path,
            debug: options.debug,
            schema: Mutex::new(BTreeMap::new()),
        };
        db.configure(options)?;

        tracing::debug!(database = %db.name(), "opened database");
        Ok(db)
    }

    fn configure(&self, options: &Options) -> Result<()> {
        self.conn
            .set_prepared_statement_cache_capacity(options.statement_cache_capacity);

        if options.foreign_keys {
            self.conn
                .pragma_update(None, "foreign_keys", true)
                .context("Failed to enable foreign keys")?;
        }

        if options.optimize && self.path.is_some() {
            let mode: String = self
                .conn
                .pragma_query_value(None, "journal_mode", |row| row.get(0))
                .context("Failed to read journal mode")?;

            if !mode.eq_ignore_ascii_case("wal") {
                // Write to a sequential write-ahead log and sync later
                self.conn
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                        row.get::<_, String>(0)
                    })
                    .context("Failed to enable WAL journal mode")?;
                // 1 = NORMAL
                self.conn
                    .pragma_update(None, "synchronous", 1)
                    .context("Failed to set synchronous mode")?;
                self.conn
                    .pragma_update(None, "journal_size_limit", options.journal_size_limit)
                    .context("Failed to set journal size limit")?;
            }
        }

        Ok(())
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Name used for export files: the file stem, or `memory`
    pub fn name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "memory".to_string())
    }

    /// Whether statements are echoed at debug level
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Get reference to underlying connection (escape hatch)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get mutable reference to underlying connection (for manual transactions)
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub(crate) fn log_statement(&self, sql: &str) {
        if self.debug {
            tracing::debug!(sql, "executing");
        } else {
            tracing::trace!(sql, "executing");
        }
    }

    fn log_failure(&self, sql: &str, err: &rusqlite::Error) {
        if self.debug {
            tracing::warn!(sql, error = %err, "statement failed");
        }
    }

    /// Run one prepared statement inside a transaction
    ///
    /// Commits when `run` succeeds, rolls back otherwise.
    pub(crate) fn in_transaction<T>(
        &self,
        sql: &str,
        run: impl FnOnce(&mut Statement<'_>) -> rusqlite::Result<T>,
    ) -> Result<T> {
        self.log_statement(sql);

        let result: rusqlite::Result<T> = (|| {
            let tx = self.conn.unchecked_transaction()?;
            let out = {
                let mut stmt = tx.prepare_cached(sql)?;
                run(&mut *stmt)?
            };
            tx.commit()?;
            Ok(out)
        })();

        result.map_err(|e| {
            self.log_failure(sql, &e);
            anyhow::Error::new(e).context(format!("Failed to execute: {}", sql))
        })
    }

    /// Execute a single statement (INSERT, UPDATE, DELETE, DDL) as a transaction
    ///
    /// Returns the number of rows changed.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.in_transaction(sql, |stmt| stmt.execute(params_from_iter(params)))
    }

    /// Execute a statement with a `RETURNING` clause as a transaction
    pub fn execute_returning(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.in_transaction(sql, |stmt| collect_rows(stmt, params, None))
    }

    /// Execute the same statement once per parameter set, all or nothing
    ///
    /// Returns the total number of rows changed.
    pub fn execute_many<I, P>(&self, sql: &str, param_sets: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[Value]>,
    {
        self.in_transaction(sql, |stmt| {
            let mut changed = 0;
            for params in param_sets {
                changed += stmt.execute(params_from_iter(params.as_ref()))?;
            }
            Ok(changed)
        })
    }

    /// Execute a multi-statement script
    ///
    /// If the script fails while a transaction it opened is still active,
    /// that transaction is rolled back.
    pub fn execute_script(&self, sql: &str) -> Result<()> {
        self.log_statement(sql);
        self.schema.lock().clear();

        if let Err(e) = self.conn.execute_batch(sql) {
            self.log_failure(sql, &e);
            if !self.conn.is_autocommit() {
                self.conn
                    .execute_batch("ROLLBACK;")
                    .context("Failed to roll back script")?;
            }
            return Err(anyhow::Error::new(e).context("Failed to execute script"));
        }
        Ok(())
    }

    /// Rebuild the database file, reclaiming free pages
    pub fn vacuum(&self) -> Result<()> {
        self.log_statement("VACUUM;");
        self.conn
            .execute_batch("VACUUM;")
            .context("Failed to vacuum database")
    }

    fn query(&self, sql: &str, params: &[Value], limit: Option<usize>) -> Result<Vec<Row>> {
        self.log_statement(sql);

        let result = self
            .conn
            .prepare_cached(sql)
            .and_then(|mut stmt| collect_rows(&mut stmt, params, limit));

        result.map_err(|e| {
            self.log_failure(sql, &e);
            anyhow::Error::new(e).context(format!("Failed to query: {}", sql))
        })
    }

    /// Fetch every row
    pub fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.query(sql, params, None)
    }

    /// Fetch the first row, if any
    pub fn fetch_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params, Some(1))?.into_iter().next())
    }

    /// Fetch at most `n` rows
    pub fn fetch_many(&self, sql: &str, params: &[Value], n: usize) -> Result<Vec<Row>> {
        self.query(sql, params, Some(n))
    }

    /// Fetch the first column of every row
    pub fn fetch_column(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>> {
        let rows = self.query(sql, params, None)?;
        Ok(rows.into_iter().filter_map(first_value).collect())
    }

    /// Fetch the first column of the first row
    pub fn fetch_first_value(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        Ok(self.fetch_one(sql, params)?.and_then(first_value))
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

fn first_value(row: Row) -> Option<Value> {
    row.into_values().into_iter().next()
}

/// Step a prepared statement and collect up to `limit` rows
pub(crate) fn collect_rows(
    stmt: &mut Statement<'_>,
    params: &[Value],
    limit: Option<usize>,
) -> rusqlite::Result<Vec<Row>> {
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query(params_from_iter(params))?;
    let mut out = Vec::new();

    while limit.map_or(true, |n| out.len() < n) {
        let Some(row) = rows.next()? else {
            break;
        };
        let values = (0..width)
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.push(Row::new(Arc::clone(&columns), values));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> Result<Database> {
        let db = Database::open_in_memory()?;
        db.execute_script(
            "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL, pages INTEGER);
             INSERT INTO books (title, pages) VALUES ('Dune', 412), ('Emma', 320), ('Ulysses', 730);",
        )?;
        Ok(db)
    }

    #[test]
    fn test_in_memory_name() -> Result<()> {
        let db = Database::open_in_memory()?;
        assert_eq!(db.name(), "memory");
        assert!(db.path().is_none());
        Ok(())
    }

    #[test]
    fn test_foreign_keys_enabled_by_default() -> Result<()> {
        let db = Database::open_in_memory()?;
        let enabled = db.fetch_first_value("PRAGMA foreign_keys;", &[])?;
        assert_eq!(enabled, Some(Value::Integer(1)));
        Ok(())
    }

    #[test]
    fn test_fetch_shapes() -> Result<()> {
        let db = books()?;

        let all = db.fetch_all("SELECT title FROM books ORDER BY id", &[])?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].columns(), ["title"]);

        let two = db.fetch_many("SELECT title FROM books ORDER BY id", &[], 2)?;
        assert_eq!(two.len(), 2);

        let titles = db.fetch_column("SELECT title FROM books ORDER BY title", &[])?;
        assert_eq!(
            titles,
            vec![
                Value::Text("Dune".into()),
                Value::Text("Emma".into()),
                Value::Text("Ulysses".into()),
            ]
        );

        let first = db.fetch_first_value(
            "SELECT pages FROM books WHERE title = ?",
            &[Value::Text("Emma".into())],
        )?;
        assert_eq!(first, Some(Value::Integer(320)));
        Ok(())
    }

    #[test]
    fn test_fetch_one_without_rows_is_none() -> Result<()> {
        let db = books()?;
        let row = db.fetch_one("SELECT * FROM books WHERE id = ?", &[Value::Integer(99)])?;
        assert!(row.is_none());
        assert!(db.fetch_first_value("SELECT id FROM books WHERE 0", &[])?.is_none());
        assert!(db.fetch_many("SELECT id FROM books", &[], 0)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_query_error_carries_statement() -> Result<()> {
        let db = books()?;
        let err = db.fetch_all("SELECT * FROM nope", &[]).unwrap_err();
        assert!(err.to_string().contains("SELECT * FROM nope"));
        Ok(())
    }

    #[test]
    fn test_execute_many_is_atomic() -> Result<()> {
        let db = books()?;
        let sql = "INSERT INTO books (id, title) VALUES (?, ?)";

        let changed = db.execute_many(
            sql,
            vec![
                vec![Value::Integer(10), Value::Text("Ivanhoe".into())],
                vec![Value::Integer(11), Value::Text("Walden".into())],
            ],
        )?;
        assert_eq!(changed, 2);

        // second set violates NOT NULL, first must roll back with it
        let result = db.execute_many(
            sql,
            vec![
                vec![Value::Integer(12), Value::Text("Beloved".into())],
                vec![Value::Integer(13), Value::Null],
            ],
        );
        assert!(result.is_err());
        let count = db.fetch_first_value("SELECT COUNT(*) FROM books", &[])?;
        assert_eq!(count, Some(Value::Integer(5)));
        Ok(())
    }

    #[test]
    fn test_execute_returning() -> Result<()> {
        let db = books()?;
        let rows = db.execute_returning(
            "UPDATE books SET pages = pages + 1 WHERE title = ? RETURNING pages",
            &[Value::Text("Dune".into())],
        )?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("pages"), Some(&Value::Integer(413)));
        Ok(())
    }

    #[test]
    fn test_failed_script_rolls_back_open_transaction() -> Result<()> {
        let db = books()?;
        let result = db.execute_script(
            "BEGIN; DELETE FROM books; INSERT INTO missing VALUES (1); COMMIT;",
        );
        assert!(result.is_err());
        assert!(db.connection().is_autocommit());

        let count = db.fetch_first_value("SELECT COUNT(*) FROM books", &[])?;
        assert_eq!(count, Some(Value::Integer(3)));
        Ok(())
    }
}
