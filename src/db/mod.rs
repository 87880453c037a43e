//! SQLite convenience layer
//!
//! [`Database`] wraps a single connection and builds the SQL for common
//! operations: selects, writes, aggregates, schema lookups and (with the
//! `vec` feature) vector similarity search.
//!
//! # Example
//! ```no_run
//! use sqrl::db::{Database, Filter, Values};
//!
//! let db = Database::open("chinook.db")?;
//! db.update(
//!     "artists",
//!     &Values::new().set("Name", "AC/DC".to_string()),
//!     Filter::new("ArtistId = ?").bind(1i64),
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod row;
pub mod schema;
pub mod select;
pub mod sqlite;
#[cfg(feature = "vec")]
pub mod vectors;
pub mod write;

pub use aggregate::Aggregate;
pub use row::{value_to_json, Filter, Row, Value, Values};
pub use select::{Order, SelectQuery};
pub use sqlite::Database;
#[cfg(feature = "vec")]
pub use vectors::{Distance, VectorMatch};
