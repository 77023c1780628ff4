//! Repository layer for SQLite persistence.
//!
//! Repositories open one connection per logical operation. Writes run
//! inside a transaction that commits on success and rolls back on drop.

mod entry;

pub use entry::EntryRepository;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use thiserror::Error;

use crate::models::Entry;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Persistent catalog of entries.
pub trait EntryStore: Send + Sync {
    /// Exact title match.
    fn find_by_title(&self, title: &str) -> Result<Option<Entry>>;
    fn find_by_id(&self, id: i64) -> Result<Option<Entry>>;
    /// Entries ordered by id, optionally skipping one and capped at `limit`.
    fn list_all(&self, exclude_id: Option<i64>, limit: Option<usize>) -> Result<Vec<Entry>>;
    /// Insert or wholesale replace the row with the entry's id.
    fn upsert(&self, entry: &Entry) -> Result<()>;
    /// Set only the cover of an existing entry. Statistics are untouched.
    fn set_cover(&self, id: i64, cover_image_url: &str) -> Result<()>;
}

/// Open a connection with the pragmas every repository relies on.
pub fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Map "no rows" to `None`.
pub fn to_option<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
