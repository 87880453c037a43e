//! Buildable SELECT statements
//!
//! ```
//! use sqrl::{Database, Order, SelectQuery};
//!
//! let db = Database::open_in_memory()?;
//! db.execute_script("CREATE TABLE t (n INTEGER); INSERT INTO t VALUES (1), (2), (3);")?;
//!
//! let query = SelectQuery::from("t").filter("n > 1").order_by("n", Order::Desc);
//! assert_eq!(query.to_sql(), "SELECT * FROM t WHERE n > 1 ORDER BY n DESC LIMIT -1 OFFSET 0;");
//! assert_eq!(db.select(&query)?.len(), 2);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;

use super::row::{Filter, Row, Value};
use super::sqlite::Database;

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    distinct: bool,
    filter: Option<Filter>,
    order_by: Option<(String, Order)>,
    group_by: Option<String>,
    having: Option<String>,
    limit: i64,
    offset: i64,
}

impl SelectQuery {
    /// Select every column of every row from `table`
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            distinct: false,
            filter: None,
            order_by: None,
            group_by: None,
            having: None,
            limit: -1,
            offset: 0,
        }
    }

    /// Columns (or expressions) to return; all when empty
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// WHERE clause, with any parameters bound through [`Filter::bind`]
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by = Some((column.into(), order));
        self
    }

    pub fn group_by(mut self, clause: impl Into<String>) -> Self {
        self.group_by = Some(clause.into());
        self
    }

    pub fn having(mut self, clause: impl Into<String>) -> Self {
        self.having = Some(clause.into());
        self
    }

    /// Maximum rows returned; negative means no limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Parameters bound to the WHERE clause placeholders
    pub fn params(&self) -> &[Value] {
        self.filter.as_ref().map(Filter::params).unwrap_or(&[])
    }

    pub fn to_sql(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };

        let mut sql = format!(
            "SELECT {}{} FROM {}",
            if self.distinct { "DISTINCT " } else { "" },
            columns,
            self.table
        );
        if let Some(filter) = &self.filter {
            sql.push_str(&format!(" WHERE {}", filter.clause()));
        }
        if let Some(group_by) = &self.group_by {
            sql.push_str(&format!(" GROUP BY {}", group_by));
        }
        if let Some(having) = &self.having {
            sql.push_str(&format!(" HAVING {}", having));
        }
        if let Some((column, order)) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {} {}", column, order.as_sql()));
        }
        sql.push_str(&format!(" LIMIT {} OFFSET {};", self.limit, self.offset));
        sql
    }
}

impl Database {
    /// Run a [`SelectQuery`] and return every matching row
    pub fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        self.fetch_all(&query.to_sql(), query.params())
    }

    /// Run a [`SelectQuery`] and return the first matching row
    pub fn select_one(&self, query: &SelectQuery) -> Result<Option<Row>> {
        self.fetch_one(&query.to_sql(), query.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_statement() {
        assert_eq!(
            SelectQuery::from("artists").to_sql(),
            "SELECT * FROM artists LIMIT -1 OFFSET 0;"
        );
    }

    #[test]
    fn test_full_statement_clause_order() {
        let sql = SelectQuery::from("tracks")
            .columns(["GenreId", "COUNT(*) AS n"])
            .distinct(true)
            .filter("Milliseconds > 1000")
            .group_by("GenreId")
            .having("n > 5")
            .order_by("n", Order::Desc)
            .limit(10)
            .offset(20)
            .to_sql();

        assert_eq!(
            sql,
            "SELECT DISTINCT GenreId,COUNT(*) AS n FROM tracks WHERE Milliseconds > 1000 \
             GROUP BY GenreId HAVING n > 5 ORDER BY n DESC LIMIT 10 OFFSET 20;"
        );
    }

    #[test]
    fn test_select_with_bound_filter() -> Result<()> {
        let db = Database::open_in_memory()?;
        db.execute_script(
            "CREATE TABLE artists (ArtistId INTEGER PRIMARY KEY, Name TEXT);
             INSERT INTO artists (Name) VALUES ('AC/DC'), ('Accept'), ('Aerosmith'), ('Black Sabbath');",
        )?;

        let query = SelectQuery::from("artists")
            .columns(["Name"])
            .filter(Filter::new("Name LIKE ?").bind("A%".to_string()))
            .order_by("Name", Order::Asc)
            .limit(2);
        let rows = db.select(&query)?;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some(&Value::Text("AC/DC".into())));
        assert_eq!(rows[1].get("Name"), Some(&Value::Text("Accept".into())));

        let first = db.select_one(&SelectQuery::from("artists").order_by("ArtistId", Order::Desc))?;
        assert_eq!(
            first.and_then(|r| r.get("Name").cloned()),
            Some(Value::Text("Black Sabbath".into()))
        );
        Ok(())
    }
}
