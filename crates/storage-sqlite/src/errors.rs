//! Storage-specific error types for SQLite operations.
//!
//! Diesel, r2d2 and I/O failures are wrapped here and converted to the
//! store-agnostic `RepositoryError` of `apex_core` before reaching callers.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use apex_core::errors::{Error, RepositoryError};

/// Storage-specific errors that wrap Diesel and r2d2 types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Stored value could not be decoded: {0}")]
    SerializationError(String),

    /// A core error raised inside a writer job, passed through unchanged.
    #[error(transparent)]
    Core(#[from] Error),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let repository_error = match err {
            StorageError::ConnectionFailed(e) => RepositoryError::Unavailable(e.to_string()),
            StorageError::PoolError(e) => RepositoryError::Unavailable(e.to_string()),
            StorageError::Io(e) => RepositoryError::Unavailable(e.to_string()),
            StorageError::QueryFailed(DieselError::NotFound) => {
                RepositoryError::NotFound("Record not found".to_string())
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation,
                info,
            )) => RepositoryError::Rejected(info.message().to_string()),
            StorageError::QueryFailed(e) => RepositoryError::QueryFailed(e.to_string()),
            StorageError::MigrationFailed(e) => {
                RepositoryError::Internal(format!("Migration failed: {}", e))
            }
            StorageError::SerializationError(e) => RepositoryError::Internal(e),
            StorageError::Core(e) => return e,
        };
        Error::Repository(repository_error)
    }
}

/// Extension trait for converting Diesel and r2d2 results to core results.
///
/// Orphan rules forbid `From<DieselError> for apex_core::Error`, so the
/// conversion goes through `StorageError`.
pub trait IntoCore<T> {
    fn into_core(self) -> apex_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> apex_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> apex_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
