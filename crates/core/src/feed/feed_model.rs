//! Change notification models.

use serde::{Deserialize, Serialize};

/// Row-level mutation kind reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single change notification for one row of one table.
///
/// The feed only uses it as a "something changed" signal; the row id is
/// carried for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableChange {
    pub table: String,
    pub kind: ChangeKind,
    pub row_id: String,
}

impl TableChange {
    pub fn new(table: impl Into<String>, kind: ChangeKind, row_id: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind,
            row_id: row_id.into(),
        }
    }
}

/// Opaque token identifying one feed subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub(crate) id: u64,
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}
