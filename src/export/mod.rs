//! Database exports: a full SQL dump or one CSV file per table
//!
//! Both are methods on [`Database`](crate::Database):
//!
//! ```no_run
//! use sqrl::Database;
//! use std::path::Path;
//!
//! let db = Database::open("chinook.db")?;
//! db.dump(None)?; // chinook.sql
//! db.export_to_csv(Path::new("."), b',')?; // chinook-albums.csv, ...
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod csv;
pub mod dump;

pub use self::csv::{csv_cell, format_real};
