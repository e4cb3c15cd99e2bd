//! SQLite catalog store.
//!
//! One file holds one catalog. The layout version lives in
//! `PRAGMA user_version`, so a file written by a newer build is refused
//! instead of being read with the wrong columns.

mod catalog;
mod schema;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unsupported catalog schema version {found} (expected {expected})")]
    UnsupportedSchema { found: i32, expected: i32 },
}

pub type DbResult<T> = Result<T, DbError>;

/// Catalog store connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a catalog store, creating the file and schema if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::prepare(Connection::open(path)?)
    }

    /// Catalog store that lives only as long as the connection.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> DbResult<Self> {
        let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        match version {
            0 => {
                conn.execute_batch(SCHEMA)?;
                conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            }
            SCHEMA_VERSION => {}
            found => {
                return Err(DbError::UnsupportedSchema {
                    found,
                    expected: SCHEMA_VERSION,
                })
            }
        }
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
