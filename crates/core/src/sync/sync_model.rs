//! Canonical portfolio state published by the sync coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assets::Asset;

/// Status of the last load against the store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// No load in progress
    #[default]
    Idle,
    /// Initial load or explicit refresh in flight
    Loading,
    /// Last load failed
    Error(String),
}

/// User-initiated mutation kinds tracked by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationKind {
    Add,
    Update,
    MarkSold,
    UnmarkSold,
    Delete,
}

/// Outcome of one optimistic mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationStatus {
    /// Applied locally, store call still in flight
    OptimisticPending,
    /// Store accepted the change
    Confirmed,
    /// Store rejected the change; the local list was left as is
    Failed(String),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationStatus::OptimisticPending)
    }
}

/// Ledger entry of one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub id: u64,
    pub kind: MutationKind,
    pub asset_id: String,
    pub status: MutationStatus,
    pub started_at: DateTime<Utc>,
}

/// The single value owned by the coordinator.
///
/// Settled ledger entries (confirmed or failed) stay visible until the next
/// full snapshot from the store reconciles them away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioState {
    pub assets: Vec<Asset>,
    pub status: SyncStatus,
    pub mutations: Vec<MutationRecord>,
}

impl PortfolioState {
    pub fn is_syncing(&self) -> bool {
        self.status == SyncStatus::Loading || self.mutations.iter().any(|m| m.status.is_pending())
    }

    pub fn pending_mutations(&self) -> usize {
        self.mutations
            .iter()
            .filter(|m| m.status.is_pending())
            .count()
    }
}

/// Serializable summary of the sync state, without the asset list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub status: SyncStatus,
    pub is_syncing: bool,
    pub asset_count: usize,
    pub mutations: Vec<MutationRecord>,
}

impl From<&PortfolioState> for SyncSummary {
    fn from(state: &PortfolioState) -> Self {
        Self {
            status: state.status.clone(),
            is_syncing: state.is_syncing(),
            asset_count: state.assets.len(),
            mutations: state.mutations.clone(),
        }
    }
}
