//! INSERT, UPDATE and DELETE helpers
//!
//! Every helper builds a parameterized statement and runs it as a
//! transaction. The `*_returning` variants append a `RETURNING` clause and
//! hand back the produced rows.

use anyhow::{bail, Result};

use super::row::{Filter, Row, Value, Values};
use super::sqlite::Database;

fn returning_clause(returning: Option<&str>) -> String {
    returning
        .map(|r| format!(" RETURNING {}", r))
        .unwrap_or_default()
}

pub(crate) fn insert_sql(
    table: &str,
    values: &Values,
    replace: bool,
    returning: Option<&str>,
) -> Result<String> {
    if values.is_empty() {
        bail!("Insert into {} needs at least one column", table);
    }

    let placeholders = vec!["?"; values.len()].join(",");
    Ok(format!(
        "{} {} ({}) VALUES ({}){};",
        if replace { "INSERT OR REPLACE INTO" } else { "INSERT INTO" },
        table,
        values.columns().join(","),
        placeholders,
        returning_clause(returning)
    ))
}

pub(crate) fn update_sql(
    table: &str,
    values: &Values,
    filter: &Filter,
    returning: Option<&str>,
) -> Result<String> {
    if values.is_empty() {
        bail!("Update of {} needs at least one column", table);
    }

    let assignments = values
        .columns()
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "UPDATE {} SET {} WHERE {}{};",
        table,
        assignments,
        filter.clause(),
        returning_clause(returning)
    ))
}

pub(crate) fn delete_sql(table: &str, filter: &Filter, returning: Option<&str>) -> String {
    format!(
        "DELETE FROM {} WHERE {}{};",
        table,
        filter.clause(),
        returning_clause(returning)
    )
}

/// SET values first, then the WHERE parameters
fn update_params(values: &Values, filter: &Filter) -> Vec<Value> {
    values
        .params()
        .iter()
        .chain(filter.params())
        .cloned()
        .collect()
}

impl Database {
    /// Insert a row, returning the number of rows changed
    ///
    /// ```
    /// use sqrl::{Database, Values};
    ///
    /// let db = Database::open_in_memory()?;
    /// db.execute("CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT)", &[])?;
    /// db.insert("books", &Values::new().set("title", "Dune".to_string()))?;
    /// assert_eq!(db.count("books", None)?, 1);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn insert(&self, table: &str, values: &Values) -> Result<usize> {
        let sql = insert_sql(table, values, false, None)?;
        self.execute(&sql, values.params())
    }

    /// `INSERT OR REPLACE` a row
    pub fn replace(&self, table: &str, values: &Values) -> Result<usize> {
        let sql = insert_sql(table, values, true, None)?;
        self.execute(&sql, values.params())
    }

    /// Insert a row and return the `RETURNING` rows
    pub fn insert_returning(&self, table: &str, values: &Values, returning: &str) -> Result<Vec<Row>> {
        let sql = insert_sql(table, values, false, Some(returning))?;
        self.execute_returning(&sql, values.params())
    }

    pub fn replace_returning(&self, table: &str, values: &Values, returning: &str) -> Result<Vec<Row>> {
        let sql = insert_sql(table, values, true, Some(returning))?;
        self.execute_returning(&sql, values.params())
    }

    /// Update the rows matched by `filter`; [`Filter::all`] updates every row
    pub fn update(&self, table: &str, values: &Values, filter: impl Into<Filter>) -> Result<usize> {
        let filter = filter.into();
        let sql = update_sql(table, values, &filter, None)?;
        self.execute(&sql, &update_params(values, &filter))
    }

    pub fn update_returning(
        &self,
        table: &str,
        values: &Values,
        filter: impl Into<Filter>,
        returning: &str,
    ) -> Result<Vec<Row>> {
        let filter = filter.into();
        let sql = update_sql(table, values, &filter, Some(returning))?;
        self.execute_returning(&sql, &update_params(values, &filter))
    }

    /// Delete the rows matched by `filter`
    pub fn delete(&self, table: &str, filter: impl Into<Filter>) -> Result<usize> {
        let filter = filter.into();
        self.execute(&delete_sql(table, &filter, None), filter.params())
    }

    pub fn delete_returning(
        &self,
        table: &str,
        filter: impl Into<Filter>,
        returning: &str,
    ) -> Result<Vec<Row>> {
        let filter = filter.into();
        self.execute_returning(&delete_sql(table, &filter, Some(returning)), filter.params())
    }

    /// Delete and then vacuum; the vacuum only runs when the delete succeeded
    pub fn delete_and_vacuum(&self, table: &str, filter: impl Into<Filter>) -> Result<usize> {
        let deleted = self.delete(table, filter)?;
        self.vacuum()?;
        Ok(deleted)
    }
}
