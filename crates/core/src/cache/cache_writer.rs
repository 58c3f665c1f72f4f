//! Background persistence of cache snapshots.

use log::{debug, error, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;

use super::local_cache::LocalAssetCache;
use crate::assets::Asset;

#[derive(Debug, Clone, Default)]
struct Snapshot {
    version: u64,
    assets: Vec<Asset>,
}

/// Writes cache snapshots on the blocking pool, one at a time.
///
/// Versions are assigned while the pending slot is locked, so a snapshot
/// taken earlier never lands on disk after one taken later. Snapshots
/// superseded before the worker picks them up are skipped.
pub struct CacheWriter {
    pending: watch::Sender<Snapshot>,
    written: watch::Receiver<u64>,
    /// Set when no runtime was available at construction; writes then run inline.
    inline: Option<(LocalAssetCache, watch::Sender<u64>)>,
}

impl CacheWriter {
    pub fn new(cache: LocalAssetCache) -> Self {
        let (pending, pending_rx) = watch::channel(Snapshot::default());
        let (written_tx, written) = watch::channel(0);

        let inline = match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run_writer(cache, pending_rx, written_tx));
                None
            }
            Err(_) => {
                warn!("No async runtime available, cache snapshots will be written inline");
                Some((cache, written_tx))
            }
        };

        Self {
            pending,
            written,
            inline,
        }
    }

    /// Queues the snapshot produced by `take`. Returns without waiting for disk.
    pub fn submit<F>(&self, take: F)
    where
        F: FnOnce() -> Vec<Asset>,
    {
        self.pending.send_modify(|pending| {
            pending.version += 1;
            pending.assets = take();
            if let Some((cache, written)) = &self.inline {
                cache.write(&pending.assets);
                written.send_replace(pending.version);
            }
        });
    }

    /// Waits until every snapshot submitted so far has been written.
    pub async fn flush(&self) {
        let target = self.pending.borrow().version;
        let mut written = self.written.clone();
        if written.wait_for(|version| *version >= target).await.is_err() {
            warn!("Cache writer stopped before snapshot {} was written", target);
        }
    }
}

async fn run_writer(
    cache: LocalAssetCache,
    mut pending: watch::Receiver<Snapshot>,
    written: watch::Sender<u64>,
) {
    // Drains the last snapshot even after the sender is gone
    while pending.changed().await.is_ok() {
        let Snapshot { version, assets } = pending.borrow_and_update().clone();
        let target = cache.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || target.write(&assets)).await {
            error!("Cache write of snapshot {} did not complete: {}", version, e);
        }
        written.send_replace(version);
        debug!("Cache snapshot {} persisted", version);
    }
    debug!("Cache writer stopped");
}
