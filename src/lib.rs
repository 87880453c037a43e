//! sqrl - a lightweight SQLite helper
//!
//! Builds and runs parameterized SQL for the everyday operations: selects,
//! inserts, updates, deletes, aggregates, SQL/CSV exports, CSV/JSON imports
//! and (with the `vec` feature) vector similarity search.
//!
//! ```
//! use sqrl::{Database, Filter, SelectQuery, Values};
//!
//! let db = Database::open_in_memory()?;
//! db.execute("CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT, pages INTEGER)", &[])?;
//! db.insert("books", &Values::new().set("title", "Dune".to_string()).set("pages", 412i64))?;
//! db.update("books", &Values::new().set("pages", 413i64), Filter::new("title = ?").bind("Dune".to_string()))?;
//!
//! let rows = db.select(&SelectQuery::from("books"))?;
//! assert_eq!(rows[0].get_as::<i64>("pages")?, 413);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod clause;
pub mod config;
pub mod db;
pub mod export;
pub mod import;

// Re-export commonly used types
pub use config::{Options, IN_MEMORY};
pub use db::{Aggregate, Database, Filter, Order, Row, SelectQuery, Value, Values};
#[cfg(feature = "vec")]
pub use db::{Distance, VectorMatch};
