//! Vector similarity search through the sqlite-vec extension
//!
//! Embeddings live in `vec0` virtual tables keyed by rowid, so they can be
//! joined back to ordinary tables:
//!
//! ```
//! use sqrl::{Database, Distance};
//!
//! let db = Database::open_in_memory()?;
//! db.create_vector_table("doc_vectors", 3, Distance::Cosine)?;
//! db.insert_embedding("doc_vectors", 1, &[1.0, 0.0, 0.0])?;
//! db.insert_embedding("doc_vectors", 2, &[0.0, 1.0, 0.0])?;
//!
//! let matches = db.search_embeddings("doc_vectors", &[0.9, 0.1, 0.0], 1)?;
//! assert_eq!(matches[0].rowid, 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{bail, Context, Result};
use rusqlite::ffi::sqlite3_auto_extension;
use sqlite_vec::sqlite3_vec_init;
use std::sync::Once;
use zerocopy::AsBytes;

use super::sqlite::Database;

static REGISTER: Once = Once::new();

/// Register sqlite-vec for every connection opened after this call
pub(crate) fn register_extension() {
    REGISTER.call_once(|| unsafe {
        sqlite3_auto_extension(Some(std::mem::transmute(sqlite3_vec_init as *const ())));
    });
}

/// Distance metric of a vector table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distance {
    #[default]
    L2,
    Cosine,
}

impl Distance {
    fn column_option(&self) -> &'static str {
        match self {
            Distance::L2 => "",
            Distance::Cosine => " distance_metric=cosine",
        }
    }
}

/// Result of a vector search
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub rowid: i64,
    pub distance: f32,
}

impl VectorMatch {
    pub fn new(rowid: i64, distance: f32) -> Self {
        Self { rowid, distance }
    }

    /// Cosine distance to similarity, only meaningful for [`Distance::Cosine`] tables
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

impl Database {
    /// Version string reported by the loaded sqlite-vec extension
    pub fn vec_version(&self) -> Result<String> {
        let row = self
            .fetch_one("SELECT vec_version() AS version", &[])?
            .context("vec_version() returned no rows")?;
        row.get_as("version")
            .context("sqlite-vec extension is not loaded")
    }

    /// Create a `vec0` table with an `embedding float[dimensions]` column
    pub fn create_vector_table(&self, table: &str, dimensions: usize, distance: Distance) -> Result<()> {
        if dimensions == 0 {
            bail!("Vector table {} needs at least one dimension", table);
        }

        let sql = format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING vec0(embedding float[{}]{});",
            table,
            dimensions,
            distance.column_option()
        );
        self.execute(&sql, &[])?;
        self.invalidate_schema();
        Ok(())
    }

    /// Store an embedding under `rowid`
    pub fn insert_embedding(&self, table: &str, rowid: i64, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            bail!("Cannot insert an empty vector into {}", table);
        }

        let sql = format!("INSERT INTO {} (rowid, embedding) VALUES (?, ?);", table);
        let bytes = vector.as_bytes();
        self.in_transaction(&sql, |stmt| stmt.execute(rusqlite::params![rowid, bytes]))?;
        Ok(())
    }

    /// The `k` nearest embeddings to `query`, nearest first
    pub fn search_embeddings(&self, table: &str, query: &[f32], k: usize) -> Result<Vec<VectorMatch>> {
        if query.is_empty() {
            bail!("Cannot search {} with an empty vector", table);
        }
        if k == 0 {
            bail!("Vector search on {} needs k >= 1", table);
        }

        let sql = format!(
            "SELECT rowid, distance FROM {}
             WHERE embedding MATCH ? AND k = ?
             ORDER BY distance",
            table
        );
        self.log_statement(&sql);

        let mut stmt = self
            .connection()
            .prepare_cached(&sql)
            .with_context(|| format!("Failed to prepare vector search on {}", table))?;

        let matches = stmt
            .query_map(rusqlite::params![query.as_bytes(), k as i64], |row| {
                let rowid: i64 = row.get(0)?;
                let distance: f64 = row.get(1)?;
                Ok(VectorMatch::new(rowid, distance as f32))
            })
            .with_context(|| format!("Failed to search {}", table))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect vector search results")?;

        Ok(matches)
    }

    /// Remove the embedding stored under `rowid`, returning whether one existed
    pub fn delete_embedding(&self, table: &str, rowid: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE rowid = ?;", table);
        let deleted = self.in_transaction(&sql, |stmt| stmt.execute([rowid]))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors() -> Result<Database> {
        let db = Database::open_in_memory()?;
        db.create_vector_table("item_vectors", 2, Distance::L2)?;
        db.insert_embedding("item_vectors", 1, &[0.0, 0.0])?;
        db.insert_embedding("item_vectors", 2, &[3.0, 4.0])?;
        db.insert_embedding("item_vectors", 3, &[1.0, 0.0])?;
        Ok(db)
    }

    #[test]
    fn test_extension_loaded() -> Result<()> {
        let db = Database::open_in_memory()?;
        assert!(db.vec_version()?.starts_with('v'));
        Ok(())
    }

    #[test]
    fn test_search_orders_by_distance() -> Result<()> {
        let db = vectors()?;
        let matches = db.search_embeddings("item_vectors", &[0.0, 0.0], 3)?;

        let ids: Vec<i64> = matches.iter().map(|m| m.rowid).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert!((matches[2].distance - 5.0).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_search_respects_k() -> Result<()> {
        let db = vectors()?;
        assert_eq!(db.search_embeddings("item_vectors", &[3.0, 4.0], 1)?[0].rowid, 2);
        assert!(db.search_embeddings("item_vectors", &[3.0, 4.0], 0).is_err());
        assert!(db.search_embeddings("item_vectors", &[], 1).is_err());
        Ok(())
    }

    #[test]
    fn test_delete_embedding() -> Result<()> {
        let db = vectors()?;
        assert!(db.delete_embedding("item_vectors", 2)?);
        assert!(!db.delete_embedding("item_vectors", 2)?);

        let matches = db.search_embeddings("item_vectors", &[3.0, 4.0], 5)?;
        assert_eq!(matches.len(), 2);
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch_is_engine_error() -> Result<()> {
        let db = vectors()?;
        assert!(db.insert_embedding("item_vectors", 9, &[1.0, 2.0, 3.0]).is_err());
        assert!(db.create_vector_table("bad", 0, Distance::L2).is_err());
        Ok(())
    }

    #[test]
    fn test_cosine_similarity() {
        let m = VectorMatch::new(1, 0.25);
        assert!((m.similarity() - 0.75).abs() < f32::EPSILON);
    }
}
