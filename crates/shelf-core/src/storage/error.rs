//! Storage error handling
//!
//! Provides typed errors for store operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Target item does not exist
    #[error("Item not found: {id}")]
    NotFound { id: Uuid },

    /// Input rejected before any write
    #[error("Invalid input: {0}")]
    Validation(String),

    /// SQLite error (store unavailable, busy, constraint violation)
    ///
    /// Any such error aborts the surrounding transaction.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A persisted row could not be decoded
    #[error("Invalid data in store: {0}")]
    InvalidData(String),

    /// Failed to prepare the database location
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// True when the error means the target item is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// True when the operation was rejected before touching the store
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// True when the database was locked by another writer
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            StoreError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            _ if self.is_busy() => {
                Some("Another process is writing to the database. Try the command again.")
            }
            StoreError::InvalidData(_) => {
                Some("Run `shelf repair` to renumber positions, or inspect the database manually.")
            }
            StoreError::Io { .. } => {
                Some("Check that the data directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
