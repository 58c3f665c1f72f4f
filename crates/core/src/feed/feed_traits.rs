use tokio::sync::broadcast;

use super::feed_model::TableChange;
use crate::errors::Result;

/// Receiving end of one notification channel.
pub type ChangeChannel = broadcast::Receiver<TableChange>;

/// Change-notification contract of the authoritative store.
///
/// Notifications are filterable by table only, never by row.
pub trait ChangeSource: Send + Sync {
    /// Opens a fresh, independent channel of changes to `table`.
    fn open_channel(&self, table: &str) -> Result<ChangeChannel>;
}
