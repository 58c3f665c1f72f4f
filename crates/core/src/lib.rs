//! Apex Core - asset synchronization and valuation engine.
//!
//! This crate owns the canonical asset list of a collectible portfolio and
//! the aggregates derived from it. It is store-agnostic and defines the
//! repository and change-notification traits implemented by the
//! `storage-sqlite` crate.

pub mod assets;
pub mod cache;
pub mod constants;
pub mod errors;
pub mod feed;
pub mod sync;
pub mod valuation;

// Re-export the types most consumers need
pub use assets::*;
pub use sync::{PortfolioState, SyncCoordinator, SyncStatus};
pub use valuation::{PortfolioBaseline, PortfolioValuation};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
