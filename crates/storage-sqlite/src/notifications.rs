//! Row-level change notifications of the SQLite store.

use apex_core::feed::{ChangeChannel, ChangeKind, ChangeSource, TableChange};
use apex_core::Result;
use log::debug;
use tokio::sync::broadcast;

/// Notifications buffered per channel before a slow listener starts lagging
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Publishes a notification after every committed write.
///
/// Each call to `open_channel` hands out an independent receiver. A listener
/// that falls more than the channel capacity behind sees a lag instead of
/// the dropped notifications.
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<TableChange>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, table: &str, kind: ChangeKind, row_id: &str) {
        match self.sender.send(TableChange::new(table, kind, row_id)) {
            Ok(listeners) => debug!(
                "Published {:?} on {}/{} to {} listener(s)",
                kind, table, row_id, listeners
            ),
            Err(_) => debug!("No listeners for {:?} on {}/{}", kind, table, row_id),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeSource for ChangeNotifier {
    fn open_channel(&self, table: &str) -> Result<ChangeChannel> {
        debug!("Opening change channel on {}", table);
        Ok(self.sender.subscribe())
    }
}
