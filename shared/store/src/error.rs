//! Typed failures raised by the store.
//!
//! The store raises the most specific applicable kind immediately and
//! never retries; the surrounding transport layer owns the translation
//! into user-facing responses.

use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required input was missing or empty.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The requested write collides with existing state (duplicate
    /// username, duplicate friendship).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced user or conversation does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials did not match any record.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A backing file could not be read or written.
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),

    /// A backing file exists but does not hold valid serialized data.
    #[error("corrupt document file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}
