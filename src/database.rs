use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from the local SQLite layer
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to acquire database lock")]
    Lock,
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not resolve application data directory")]
    DataDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the local SQLite database.
///
/// Table creation is owned by the modules that use the tables
/// (see `docs::storage::create_docs_table`).
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database at the default per-user data location
    pub fn new() -> Result<Self, DbError> {
        let mut dir = dirs::data_dir().ok_or(DbError::DataDir)?;
        dir.push("draftdesk");
        std::fs::create_dir_all(&dir)?;
        dir.push("draftdesk.db");
        Self::open(&dir)
    }

    /// Open the database at an explicit path
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (used by tests)
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}
