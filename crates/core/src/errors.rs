//! Core error types for the Apex vault.
//!
//! This module defines store-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type surfaced to callers of the engine.
///
/// Local cache failures never leave the cache and have no variant here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Repository operation failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Returns true when the underlying store reported a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Repository(RepositoryError::NotFound(_)))
    }
}

/// Failure of a single round trip against the authoritative asset store.
///
/// Every variant carries the stringified underlying cause so the type stays
/// independent of the transport or storage engine in use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The store could not be reached (connection, pool, channel).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store rejected the write (constraint, uniqueness).
    #[error("Store rejected the operation: {0}")]
    Rejected(String),

    /// A query or statement failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Internal/unexpected store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Validation errors raised before any mutation is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Field '{field}' must be greater than zero")]
    NonPositiveAmount { field: String },

    #[error("Embedded image is too large ({size} characters, limit {limit})")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("Asset {0} is not in the portfolio")]
    UnknownAsset(String),
}

/// Local cache I/O failure.
///
/// Only ever produced and consumed inside the cache module; callers of the
/// cache never observe it.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Cache backend failure: {0}")]
    Backend(String),
}
