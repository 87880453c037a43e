//! Table and column introspection with a small lookup cache

use anyhow::Result;
use std::collections::BTreeMap;

use super::row::Value;
use super::sqlite::Database;

impl Database {
    /// Names of every table in the database, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let names = self.fetch_column(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;",
            &[],
        )?;
        Ok(names.into_iter().filter_map(into_text).collect())
    }

    /// Column names of a table in declaration order, empty for unknown tables
    pub fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let names = self.fetch_column(
            "SELECT name FROM pragma_table_info(?) ORDER BY cid;",
            &[Value::Text(table.to_string())],
        )?;
        Ok(names.into_iter().filter_map(into_text).collect())
    }

    /// Rebuild the table -> columns lookup cache
    pub fn build_schema(&self) -> Result<()> {
        let mut schema = BTreeMap::new();
        for table in self.table_names()? {
            let columns = self.column_names(&table)?;
            schema.insert(table, columns);
        }
        *self.schema.lock() = schema;
        Ok(())
    }

    /// Snapshot of the cached schema, building it first when empty
    pub fn schema(&self) -> Result<BTreeMap<String, Vec<String>>> {
        if self.schema.lock().is_empty() {
            self.build_schema()?;
        }
        Ok(self.schema.lock().clone())
    }

    /// Drop the cached schema so the next lookup re-reads it
    pub fn invalidate_schema(&self) {
        self.schema.lock().clear();
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.table_names()?.iter().any(|t| t == table))
    }

    /// Whether `column` exists in `table`, using the schema cache
    ///
    /// A table missing from the cache triggers one rebuild before answering.
    pub fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        let cached = self.schema.lock().get(table).cloned();
        let columns = match cached {
            Some(columns) => columns,
            None => {
                self.build_schema()?;
                match self.schema.lock().get(table) {
                    Some(columns) => columns.clone(),
                    None => return Ok(false),
                }
            }
        };
        Ok(columns.iter().any(|c| c == column))
    }
}

fn into_text(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn music() -> Result<Database> {
        let db = Database::open_in_memory()?;
        db.execute_script(
            "CREATE TABLE artists (ArtistId INTEGER PRIMARY KEY, Name TEXT);
             CREATE TABLE albums (AlbumId INTEGER PRIMARY KEY, Title TEXT, ArtistId INTEGER
                REFERENCES artists(ArtistId));",
        )?;
        Ok(db)
    }

    #[test]
    fn test_table_names_sorted() -> Result<()> {
        let db = music()?;
        assert_eq!(db.table_names()?, vec!["albums", "artists"]);
        assert!(db.table_exists("albums")?);
        assert!(!db.table_exists("unreal")?);
        Ok(())
    }

    #[test]
    fn test_column_names() -> Result<()> {
        let db = music()?;
        assert_eq!(db.column_names("albums")?, vec!["AlbumId", "Title", "ArtistId"]);
        assert!(db.column_names("unreal")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_column_exists_refreshes_for_new_tables() -> Result<()> {
        let db = music()?;
        assert!(db.column_exists("artists", "Name")?);
        assert!(!db.column_exists("artists", "Title")?);

        db.execute("CREATE TABLE genres (GenreId INTEGER, Name TEXT)", &[])?;
        assert!(db.column_exists("genres", "GenreId")?);
        assert!(!db.column_exists("unreal", "anything")?);
        Ok(())
    }

    #[test]
    fn test_schema_snapshot() -> Result<()> {
        let db = music()?;
        let schema = db.schema()?;
        assert_eq!(schema.len(), 2);
        assert_eq!(schema["artists"], vec!["ArtistId", "Name"]);
        Ok(())
    }
}
