//! SQLite storage gateway.
//!
//! [`MessageStore`] owns the database path, nothing else. Every operation
//! opens its own connection and drops it on return, so the daemon never
//! holds the file open between records and a crash can't leave a dangling
//! handle.

use std::fs;
use std::path::{Path, PathBuf};

use chatter_core::ProcessedMessage;
use rusqlite::Connection;

use crate::Result;

/// Schema for the messages table.
const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT,
    author TEXT,
    timestamp TEXT,
    category TEXT,
    sentiment REAL,
    sentiment_category TEXT,
    keyword_mentioned TEXT,
    message_length INTEGER
)";

/// Gateway to the local message store.
#[derive(Debug, Clone)]
pub struct MessageStore {
    db_path: PathBuf,
}

impl MessageStore {
    /// Create a gateway for the given database file.
    ///
    /// No file is touched until [`init`](Self::init) or
    /// [`insert`](Self::insert) runs.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// The database file path.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Delete a prior database file, if any.
    ///
    /// This is the daemon's fresh-start step: every run begins with an empty
    /// store. Succeeds when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) when an existing file cannot
    /// be removed.
    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.db_path) {
            Ok(()) => {
                tracing::info!(path = %self.db_path.display(), "deleted prior database file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the `messages` table if it does not exist.
    ///
    /// Safe to call repeatedly and on a fresh file. Parent directories are
    /// created as needed.
    pub fn init(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!(path = %self.db_path.display(), "database schema ready");
        Ok(())
    }

    /// Append one processed record. Returns the assigned row id.
    ///
    /// # Errors
    ///
    /// Fails when the database file cannot be opened or the schema has not
    /// been initialized.
    pub fn insert(&self, record: &ProcessedMessage) -> Result<i64> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO messages (
                message, author, timestamp, category,
                sentiment, sentiment_category, keyword_mentioned, message_length
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                record.message,
                record.author,
                record.timestamp,
                record.category,
                record.sentiment,
                record.sentiment_category.as_str(),
                record.keyword_mentioned,
                record.message_length,
            ],
        )?;
        let rowid = conn.last_insert_rowid();
        tracing::debug!(rowid, author = ?record.author, "inserted message");
        Ok(rowid)
    }
}
