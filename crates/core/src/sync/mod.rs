//! Sync coordinator - canonical asset list, optimistic mutations and feed reconciliation.

mod sync_coordinator;
mod sync_model;

pub use sync_coordinator::SyncCoordinator;
pub use sync_model::*;
