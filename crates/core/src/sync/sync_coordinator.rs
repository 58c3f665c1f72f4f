//! Synchronization coordinator.
//!
//! Owns the canonical asset list. Mutations are applied to the list first
//! and sent to the store second; a failed store call is reported to the
//! caller but never rolled back locally. The next full snapshot from the
//! change feed overwrites whatever the list holds at that point.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use tokio::sync::watch;
use uuid::Uuid;

use super::sync_model::{MutationKind, MutationRecord, MutationStatus, PortfolioState, SyncStatus};
use crate::assets::{Asset, AssetFilter, AssetRepositoryTrait, NewAsset};
use crate::cache::{CacheWriter, LocalAssetCache};
use crate::constants::PROVISIONAL_ID_PREFIX;
use crate::errors::{Error, Result, ValidationError};
use crate::feed::{ChangeFeed, ChangeSource, SubscriptionHandle};
use crate::valuation::{calculate_valuation, PortfolioBaseline, PortfolioValuation};

/// State shared with the feed subscription task.
struct Shared {
    state: watch::Sender<PortfolioState>,
    cache: LocalAssetCache,
    writer: CacheWriter,
    torn_down: AtomicBool,
}

impl Shared {
    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Queues the current list for the cache. Disk I/O happens off the runtime.
    fn persist(&self) {
        self.writer.submit(|| self.state.borrow().assets.clone());
    }

    /// Overwrites the canonical list with a full snapshot from the feed.
    fn apply_snapshot(&self, assets: Vec<Asset>) {
        if self.is_torn_down() {
            debug!(
                "Discarding feed delivery of {} asset(s) after teardown",
                assets.len()
            );
            return;
        }

        let mut list_changed = false;
        self.state.send_if_modified(|state| {
            let settled_before = state.mutations.len();
            state.mutations.retain(|m| m.status.is_pending());
            let ledger_changed = settled_before != state.mutations.len();

            if state.assets != assets {
                state.assets = assets;
                list_changed = true;
            }
            list_changed || ledger_changed
        });

        if list_changed {
            self.persist();
        }
    }

    fn apply_load(&self, result: Result<Vec<Asset>>) -> Result<()> {
        if self.is_torn_down() {
            debug!("Discarding load result that arrived after teardown");
            return result.map(|_| ());
        }

        match result {
            Ok(assets) => {
                let count = assets.len();
                self.state.send_modify(|state| {
                    state.mutations.retain(|m| m.status.is_pending());
                    state.assets = assets;
                    state.status = SyncStatus::Idle;
                });
                self.persist();
                info!("Loaded {} asset(s) from the store", count);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load assets from the store: {}", e);
                let message = e.to_string();
                self.state
                    .send_modify(|state| state.status = SyncStatus::Error(message));
                Err(e)
            }
        }
    }
}

pub struct SyncCoordinator {
    shared: Arc<Shared>,
    repository: Arc<dyn AssetRepositoryTrait>,
    feed: ChangeFeed,
    subscription: Mutex<Option<SubscriptionHandle>>,
    baseline: RwLock<PortfolioBaseline>,
    next_mutation_id: AtomicU64,
}

impl SyncCoordinator {
    pub fn new(
        repository: Arc<dyn AssetRepositoryTrait>,
        source: Arc<dyn ChangeSource>,
        cache: LocalAssetCache,
        baseline: PortfolioBaseline,
    ) -> Self {
        let (state, _) = watch::channel(PortfolioState::default());
        Self {
            shared: Arc::new(Shared {
                state,
                writer: CacheWriter::new(cache.clone()),
                cache,
                torn_down: AtomicBool::new(false),
            }),
            feed: ChangeFeed::new(Arc::clone(&repository), source),
            repository,
            subscription: Mutex::new(None),
            baseline: RwLock::new(baseline),
            next_mutation_id: AtomicU64::new(1),
        }
    }

    /// Seeds the list from the local cache, loads it from the store and
    /// subscribes to the change feed.
    ///
    /// The feed subscription is opened even when the load fails. The load
    /// error is returned after the status has moved to `Error`.
    pub async fn start(&self) -> Result<()> {
        if self.shared.is_torn_down() {
            warn!("Ignoring start of a torn down sync coordinator");
            return Ok(());
        }

        let cache = self.shared.cache.clone();
        let cached = match tokio::task::spawn_blocking(move || cache.read()).await {
            Ok(assets) => assets,
            Err(e) => {
                warn!("Cache read did not complete: {}", e);
                Vec::new()
            }
        };
        self.shared.state.send_modify(|state| {
            if state.assets.is_empty() && !cached.is_empty() {
                debug!("Bootstrapping with {} cached asset(s)", cached.len());
                state.assets = cached;
            }
            state.status = SyncStatus::Loading;
        });

        let result = self.repository.list_all().await;
        let outcome = self.shared.apply_load(result);
        self.subscribe_feed();
        outcome
    }

    /// Reloads the full list from the store.
    pub async fn refresh(&self) -> Result<()> {
        if self.shared.is_torn_down() {
            warn!("Ignoring refresh of a torn down sync coordinator");
            return Ok(());
        }

        self.shared
            .state
            .send_modify(|state| state.status = SyncStatus::Loading);
        let result = self.repository.list_all().await;
        self.shared.apply_load(result)
    }

    /// Releases the feed subscription. Results that arrive later are dropped.
    pub fn teardown(&self) {
        let first = !self.shared.torn_down.swap(true, Ordering::SeqCst);
        let handle = lock(&self.subscription).take();
        self.feed.unsubscribe(handle.as_ref());
        if first {
            info!("Sync coordinator torn down");
        }
    }

    /// Waits until the latest canonical list has reached the local cache.
    pub async fn flush_cache(&self) {
        self.shared.writer.flush().await;
    }

    pub fn is_subscribed(&self) -> bool {
        lock(&self.subscription).is_some()
    }

    /// Observer of every published state.
    pub fn subscribe(&self) -> watch::Receiver<PortfolioState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> PortfolioState {
        self.shared.state.borrow().clone()
    }

    pub fn assets(&self, filter: AssetFilter) -> Vec<Asset> {
        self.shared
            .state
            .borrow()
            .assets
            .iter()
            .filter(|asset| filter.matches(asset))
            .cloned()
            .collect()
    }

    pub fn valuation(&self, now: DateTime<Utc>) -> PortfolioValuation {
        let baseline = self.baseline();
        let state = self.shared.state.borrow();
        calculate_valuation(&state.assets, &baseline, now)
    }

    pub fn baseline(&self) -> PortfolioBaseline {
        *self
            .baseline
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Changes the cash amount used by the monthly performance window.
    pub fn set_cash_parameter(&self, amount: Decimal) -> Result<PortfolioBaseline> {
        let mut baseline = self
            .baseline
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let updated = baseline.with_cash_parameter(amount)?;
        *baseline = updated;
        info!("Cash parameter set to {}", amount);
        Ok(updated)
    }

    /// Adds an asset optimistically under a provisional id, then creates it
    /// in the store. On success the provisional entry is swapped for the
    /// stored asset.
    pub async fn add_asset(&self, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;

        let provisional_id = format!("{}{}", PROVISIONAL_ID_PREFIX, Uuid::new_v4());
        let provisional = new_asset
            .clone()
            .into_asset(provisional_id.clone(), Utc::now());
        let mutation_id = self.begin_mutation(MutationKind::Add, &provisional_id, |assets| {
            assets.insert(0, provisional)
        });

        match self.repository.create(new_asset).await {
            Ok(stored) if self.shared.is_torn_down() => {
                debug!("Asset {} created after teardown, state left untouched", stored.id);
                Ok(stored)
            }
            Ok(stored) => {
                let replacement = stored.clone();
                self.shared.state.send_modify(|state| {
                    let stored_id = replacement.id.clone();
                    swap_provisional(&mut state.assets, &provisional_id, replacement);
                    if let Some(record) = find_record(&mut state.mutations, mutation_id) {
                        record.asset_id = stored_id;
                        record.status = MutationStatus::Confirmed;
                    }
                });
                self.shared.persist();
                info!("Asset {} created", stored.id);
                Ok(stored)
            }
            Err(e) => Err(self.fail_mutation(mutation_id, e)),
        }
    }

    /// Replaces an asset. The caller gets the stored version back; the list
    /// keeps the optimistic copy until the feed delivers.
    pub async fn update_asset(&self, asset: Asset) -> Result<Asset> {
        self.replace_asset(MutationKind::Update, asset).await
    }

    /// Flags an asset as sold. The sale date defaults to now.
    pub async fn mark_sold(
        &self,
        asset_id: &str,
        sold_price: Decimal,
        sold_date: Option<DateTime<Utc>>,
    ) -> Result<Asset> {
        let current = self.find_asset(asset_id)?;
        let sold = current.with_sale(sold_price, sold_date.unwrap_or_else(Utc::now));
        self.replace_asset(MutationKind::MarkSold, sold).await
    }

    pub async fn unmark_sold(&self, asset_id: &str) -> Result<Asset> {
        let current = self.find_asset(asset_id)?;
        self.replace_asset(MutationKind::UnmarkSold, current.without_sale())
            .await
    }

    pub async fn delete_asset(&self, asset_id: &str) -> Result<()> {
        self.find_asset(asset_id)?;

        let mutation_id = self.begin_mutation(MutationKind::Delete, asset_id, |assets| {
            assets.retain(|a| a.id != asset_id)
        });

        match self.repository.delete(asset_id).await {
            Ok(()) => {
                self.confirm_mutation(mutation_id);
                info!("Asset {} deleted", asset_id);
                Ok(())
            }
            Err(e) => Err(self.fail_mutation(mutation_id, e)),
        }
    }

    /// Applies a full snapshot as if delivered by the change feed.
    pub(crate) fn apply_feed_snapshot(&self, assets: Vec<Asset>) {
        self.shared.apply_snapshot(assets);
    }

    async fn replace_asset(&self, kind: MutationKind, asset: Asset) -> Result<Asset> {
        asset.validate()?;
        let current = self.find_asset(&asset.id)?;

        // created_at never changes and updated_at never moves backwards
        let asset = Asset {
            created_at: current.created_at,
            updated_at: Utc::now().max(current.updated_at),
            ..asset
        };
        let replacement = asset.clone();
        let mutation_id = self.begin_mutation(kind, &asset.id, |assets| {
            if let Some(slot) = assets.iter_mut().find(|a| a.id == replacement.id) {
                *slot = replacement;
            }
        });

        match self.repository.update(asset).await {
            Ok(stored) => {
                self.confirm_mutation(mutation_id);
                debug!("{:?} of asset {} confirmed", kind, stored.id);
                Ok(stored)
            }
            Err(e) => Err(self.fail_mutation(mutation_id, e)),
        }
    }

    /// Looks an asset up in the canonical list.
    fn find_asset(&self, asset_id: &str) -> Result<Asset> {
        if asset_id.starts_with(PROVISIONAL_ID_PREFIX) {
            return Err(ValidationError::InvalidInput(format!(
                "Asset {} has not been stored yet",
                asset_id
            ))
            .into());
        }
        self.shared
            .state
            .borrow()
            .assets
            .iter()
            .find(|a| a.id == asset_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownAsset(asset_id.to_string()).into())
    }

    fn begin_mutation<F>(&self, kind: MutationKind, asset_id: &str, apply: F) -> u64
    where
        F: FnOnce(&mut Vec<Asset>),
    {
        let id = self.next_mutation_id.fetch_add(1, Ordering::SeqCst);
        let record = MutationRecord {
            id,
            kind,
            asset_id: asset_id.to_string(),
            status: MutationStatus::OptimisticPending,
            started_at: Utc::now(),
        };
        if self.shared.is_torn_down() {
            debug!(
                "Mutation {} ({:?} {}) started after teardown, state left untouched",
                id, kind, asset_id
            );
            return id;
        }
        self.shared.state.send_modify(|state| {
            apply(&mut state.assets);
            state.mutations.push(record);
        });
        self.shared.persist();
        debug!("Mutation {} ({:?} {}) applied optimistically", id, kind, asset_id);
        id
    }

    fn confirm_mutation(&self, mutation_id: u64) {
        self.settle_mutation(mutation_id, MutationStatus::Confirmed);
    }

    fn fail_mutation(&self, mutation_id: u64, err: Error) -> Error {
        warn!(
            "Mutation {} failed, keeping the optimistic list until the next snapshot: {}",
            mutation_id, err
        );
        self.settle_mutation(mutation_id, MutationStatus::Failed(err.to_string()));
        err
    }

    fn settle_mutation(&self, mutation_id: u64, status: MutationStatus) {
        if self.shared.is_torn_down() {
            debug!("Dropping settlement of mutation {} after teardown", mutation_id);
            return;
        }
        self.shared
            .state
            .send_if_modified(|state| match find_record(&mut state.mutations, mutation_id) {
                Some(record) => {
                    record.status = status;
                    true
                }
                None => false,
            });
    }

    fn subscribe_feed(&self) {
        let mut subscription = lock(&self.subscription);
        if subscription.is_some() || self.shared.is_torn_down() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        *subscription = Some(
            self.feed
                .subscribe(move |assets| shared.apply_snapshot(assets)),
        );
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn find_record(records: &mut [MutationRecord], id: u64) -> Option<&mut MutationRecord> {
    records.iter_mut().find(|m| m.id == id)
}

/// Puts the stored asset where its provisional entry was.
///
/// A snapshot may already have delivered the stored asset, in which case the
/// provisional entry is just dropped.
fn swap_provisional(assets: &mut Vec<Asset>, provisional_id: &str, stored: Asset) {
    let already_listed = assets.iter().any(|a| a.id == stored.id);
    match assets.iter().position(|a| a.id == provisional_id) {
        Some(index) if already_listed => {
            assets.remove(index);
        }
        Some(index) => assets[index] = stored,
        None if !already_listed => assets.insert(0, stored),
        None => {}
    }
}
