//! Realtime change feed.
//!
//! Every subscription owns its own channel to the store. Any notification
//! for the asset table, whichever row it names, triggers a full
//! `list_all()` and hands the complete list to the subscriber. Partial diffs
//! are never merged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::feed_model::SubscriptionHandle;
use super::feed_traits::{ChangeChannel, ChangeSource};
use crate::assets::{Asset, AssetRepositoryTrait};
use crate::constants::ASSETS_TABLE;

type UpdateCallback = Arc<dyn Fn(Vec<Asset>) + Send + Sync>;

pub struct ChangeFeed {
    repository: Arc<dyn AssetRepositoryTrait>,
    source: Arc<dyn ChangeSource>,
    table: String,
    next_id: AtomicU64,
    subscriptions: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl ChangeFeed {
    /// Creates a feed over the asset table.
    pub fn new(repository: Arc<dyn AssetRepositoryTrait>, source: Arc<dyn ChangeSource>) -> Self {
        Self {
            repository,
            source,
            table: ASSETS_TABLE.to_string(),
            next_id: AtomicU64::new(1),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a subscription.
    ///
    /// The callback first receives one full snapshot, then a fresh full
    /// snapshot after every change notification. Must be called from within
    /// a Tokio runtime.
    pub fn subscribe<F>(&self, on_update: F) -> SubscriptionHandle
    where
        F: Fn(Vec<Asset>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        // The channel is opened before the initial fetch so that nothing
        // committed in between goes unnoticed.
        let channel = match self.source.open_channel(&self.table) {
            Ok(channel) => Some(channel),
            Err(e) => {
                error!(
                    "Subscription {} could not open a change channel on '{}': {}",
                    id, self.table, e
                );
                None
            }
        };

        let task = tokio::spawn(run_subscription(
            id,
            Arc::clone(&self.repository),
            channel,
            self.table.clone(),
            Arc::new(on_update),
        ));
        self.lock_subscriptions().insert(id, task);
        debug!("Change feed subscription {} opened", id);

        SubscriptionHandle { id }
    }

    /// Releases a subscription and its channel.
    ///
    /// Safe to call repeatedly, with `None`, or with a handle this feed never issued.
    pub fn unsubscribe(&self, handle: Option<&SubscriptionHandle>) {
        let Some(handle) = handle else {
            return;
        };
        match self.lock_subscriptions().remove(&handle.id) {
            Some(task) => {
                task.abort();
                debug!("Change feed subscription {} closed", handle.id);
            }
            None => debug!(
                "Ignoring unsubscribe for unknown or released subscription {}",
                handle.id
            ),
        }
    }

    /// Number of subscriptions not yet released.
    pub fn active_subscriptions(&self) -> usize {
        self.lock_subscriptions().len()
    }

    fn lock_subscriptions(&self) -> MutexGuard<'_, HashMap<u64, JoinHandle<()>>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        for (_, task) in self.lock_subscriptions().drain() {
            task.abort();
        }
    }
}

async fn run_subscription(
    id: u64,
    repository: Arc<dyn AssetRepositoryTrait>,
    channel: Option<ChangeChannel>,
    table: String,
    on_update: UpdateCallback,
) {
    deliver_snapshot(id, repository.as_ref(), &on_update).await;

    let Some(mut channel) = channel else {
        return;
    };

    loop {
        match channel.recv().await {
            Ok(change) => {
                if change.table != table {
                    continue;
                }
                debug!(
                    "Subscription {} saw {:?} on {}/{}, refetching",
                    id, change.kind, change.table, change.row_id
                );
                deliver_snapshot(id, repository.as_ref(), &on_update).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(
                    "Subscription {} lagged behind by {} notification(s), refetching",
                    id, skipped
                );
                deliver_snapshot(id, repository.as_ref(), &on_update).await;
            }
            Err(RecvError::Closed) => {
                info!("Change channel of subscription {} closed by the store", id);
                return;
            }
        }
    }
}

async fn deliver_snapshot(
    id: u64,
    repository: &dyn AssetRepositoryTrait,
    on_update: &UpdateCallback,
) {
    match repository.list_all().await {
        Ok(assets) => on_update(assets),
        Err(e) => error!("Subscription {} failed to refresh assets: {}", id, e),
    }
}
