//! SQLite asset store for the Apex vault.
//!
//! This crate is the authoritative store behind the sync engine. It
//! implements the repository and change-notification traits defined in
//! `apex-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor
//! - The asset repository and its database model
//! - The change notifier announcing committed writes
//!
//! # Architecture
//!
//! ```text
//!      core (sync engine)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod notifications;
pub mod schema;

// Repository implementations
pub mod assets;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use assets::AssetRepository;
pub use notifications::ChangeNotifier;

// Re-export from apex-core for convenience
pub use apex_core::errors::{Error, RepositoryError, Result};
