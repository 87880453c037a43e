//! Connection options
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! path = "chinook.db"
//! debug = true
//! journal_size_limit = 6144000
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Path that opens a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// How a [`Database`](crate::Database) is opened and configured
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Path to database file, or `:memory:`
    pub path: PathBuf,

    /// Log every built statement at debug level and failures at warn
    pub debug: bool,

    /// Enable foreign key enforcement
    pub foreign_keys: bool,

    /// Switch file databases to WAL with normal sync
    pub optimize: bool,

    /// `journal_size_limit` applied together with WAL, in bytes
    pub journal_size_limit: i64,

    /// Capacity of the prepared statement cache
    pub statement_cache_capacity: usize,

    /// Register the sqlite-vec extension before opening
    pub vector: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            path: PathBuf::from(IN_MEMORY),
            debug: false,
            foreign_keys: true,
            optimize: true,
            journal_size_limit: 6_144_000,
            statement_cache_capacity: 64,
            vector: cfg!(feature = "vec"),
        }
    }
}

impl Options {
    /// Options for a database file with every other setting at its default
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load options from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::load_from_str(&content)
    }

    /// Load options from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self> {
        let options: Self =
            toml::from_str(content).context("Failed to parse database configuration")?;

        options.validate()?;
        Ok(options)
    }

    /// Whether these options open an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            anyhow::bail!("Database path must not be empty");
        }
        if self.statement_cache_capacity == 0 {
            anyhow::bail!("statement_cache_capacity must be at least 1");
        }
        if self.journal_size_limit < -1 {
            anyhow::bail!(
                "journal_size_limit must be -1 (unlimited) or a byte count, got {}",
                self.journal_size_limit
            );
        }
        if self.vector && !cfg!(feature = "vec") {
            anyhow::bail!("vector = true requires sqrl built with the `vec` feature");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.is_in_memory());
        assert!(options.foreign_keys);
        assert!(options.optimize);
        assert!(!options.debug);
        assert_eq!(options.journal_size_limit, 6_144_000);
    }

    #[test]
    fn test_load_partial_toml() -> Result<()> {
        let options = Options::load_from_str(
            r#"
            path = "chinook.db"
            debug = true
            foreign_keys = false
            "#,
        )?;

        assert_eq!(options.path, PathBuf::from("chinook.db"));
        assert!(options.debug);
        assert!(!options.foreign_keys);
        assert!(options.optimize);
        assert!(!options.is_in_memory());
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Options::load_from_str(r#"path = """#).is_err());
        assert!(Options::load_from_str("statement_cache_capacity = 0").is_err());
        assert!(Options::load_from_str("journal_size_limit = -5").is_err());
        assert!(Options::load_from_str("unknown_key = 1").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Options::load_from_file("/nonexistent/sqrl.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
