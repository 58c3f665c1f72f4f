//! End-to-end tests of the sync coordinator over an in-memory store with a
//! live change feed.

mod common;

use std::sync::Arc;
use std::time::Duration;

use apex_core::cache::{FileCacheStore, LocalAssetCache, MemoryCacheStore};
use apex_core::constants::PLACEHOLDER_IMAGE_BASE_URL;
use apex_core::sync::{MutationStatus, PortfolioState, SyncCoordinator, SyncStatus};
use apex_core::{AssetFilter, AssetRepositoryTrait, PortfolioBaseline};
use chrono::Utc;
use common::{draft, morgan_dollar, InMemoryStore};
use rust_decimal_macros::dec;
use tokio::sync::watch;

fn coordinator_over(store: &Arc<InMemoryStore>, cache: LocalAssetCache) -> Arc<SyncCoordinator> {
    Arc::new(SyncCoordinator::new(
        store.clone(),
        store.clone(),
        cache,
        PortfolioBaseline::default(),
    ))
}

fn memory_cache() -> LocalAssetCache {
    LocalAssetCache::new(Arc::new(MemoryCacheStore::new()))
}

async fn eventually<F>(rx: &mut watch::Receiver<PortfolioState>, predicate: F)
where
    F: FnMut(&PortfolioState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("state never converged")
        .expect("coordinator dropped");
}

#[tokio::test]
async fn test_observers_converge_through_the_feed() {
    let store = Arc::new(InMemoryStore::new());
    store.create(draft("Buffalo Nickel", dec!(40), dec!(55))).await.unwrap();

    let alice = coordinator_over(&store, memory_cache());
    let bob = coordinator_over(&store, memory_cache());
    alice.start().await.unwrap();
    bob.start().await.unwrap();
    assert_eq!(bob.state().assets.len(), 1);

    let stored = alice.add_asset(morgan_dollar()).await.unwrap();

    let mut bob_rx = bob.subscribe();
    eventually(&mut bob_rx, |s| s.assets.len() == 2).await;
    assert_eq!(bob.state().assets[0].id, stored.id);

    let alice_state = alice.state();
    assert_eq!(alice_state.assets.len(), 2);
    assert!(!alice_state.assets.iter().any(|a| a.is_provisional()));

    alice.teardown();
    bob.teardown();
}

#[tokio::test]
async fn test_writes_from_other_clients_overwrite_local_state() {
    let store = Arc::new(InMemoryStore::new());
    let coin = store.create(morgan_dollar()).await.unwrap();

    let coordinator = coordinator_over(&store, memory_cache());
    coordinator.start().await.unwrap();
    let mut rx = coordinator.subscribe();

    let mut repriced = coin.clone();
    repriced.current_value = dec!(2400);
    store.update(repriced).await.unwrap();
    eventually(&mut rx, |s| {
        s.assets
            .first()
            .is_some_and(|a| a.current_value == dec!(2400))
    })
    .await;

    store.delete(&coin.id).await.unwrap();
    eventually(&mut rx, |s| s.assets.is_empty()).await;

    coordinator.teardown();
}

#[tokio::test]
async fn test_failed_mutation_is_reconciled_by_next_delivery() {
    let store = Arc::new(InMemoryStore::new());
    let coin = store.create(morgan_dollar()).await.unwrap();

    let coordinator = coordinator_over(&store, memory_cache());
    coordinator.start().await.unwrap();
    let mut rx = coordinator.subscribe();

    store.set_offline(true);
    assert!(coordinator
        .mark_sold(&coin.id, dec!(1500), None)
        .await
        .is_err());

    let state = coordinator.state();
    assert!(state.assets[0].is_sold, "optimistic sale is kept");
    assert!(matches!(state.mutations[0].status, MutationStatus::Failed(_)));

    // Any later change on the table brings the authoritative rows back
    store.set_offline(false);
    store.create(draft("Indian Head Cent", dec!(20), dec!(25))).await.unwrap();
    eventually(&mut rx, |s| s.assets.len() == 2 && s.mutations.is_empty()).await;

    let original = coordinator
        .state()
        .assets
        .into_iter()
        .find(|a| a.id == coin.id)
        .unwrap();
    assert!(!original.is_sold);

    coordinator.teardown();
}

#[tokio::test]
async fn test_cached_snapshot_survives_restart_while_offline() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryStore::new());

    let first = coordinator_over(
        &store,
        LocalAssetCache::new(Arc::new(FileCacheStore::new(dir.path()))),
    );
    first.start().await.unwrap();
    let mut big_image = morgan_dollar();
    big_image.image_url = format!("data:image/png;base64,{}", "A".repeat(600_000));
    let stored = first.add_asset(big_image).await.unwrap();
    first.flush_cache().await;
    first.teardown();

    store.set_offline(true);
    let second = coordinator_over(
        &store,
        LocalAssetCache::new(Arc::new(FileCacheStore::new(dir.path()))),
    );
    assert!(second.start().await.is_err());

    let state = second.state();
    assert!(matches!(state.status, SyncStatus::Error(_)));
    assert_eq!(state.assets.len(), 1);
    assert_eq!(state.assets[0].id, stored.id);
    assert!(state.assets[0].image_url.starts_with(PLACEHOLDER_IMAGE_BASE_URL));

    second.teardown();
}

#[tokio::test]
async fn test_reference_portfolio_valuation() {
    let store = Arc::new(InMemoryStore::new());
    let coordinator = coordinator_over(&store, memory_cache());
    coordinator.start().await.unwrap();

    coordinator.add_asset(morgan_dollar()).await.unwrap();
    let flip = coordinator
        .add_asset(draft("Saint-Gaudens Eagle", dec!(500), dec!(500)))
        .await
        .unwrap();
    coordinator
        .mark_sold(&flip.id, dec!(700), None)
        .await
        .unwrap();

    let mut rx = coordinator.subscribe();
    eventually(&mut rx, |s| {
        s.assets.iter().filter(|a| a.is_sold).count() == 1 && !s.is_syncing()
    })
    .await;

    let valuation = coordinator.valuation(Utc::now());
    assert_eq!(valuation.active_purchase_sum, dec!(1000));
    assert_eq!(valuation.sold_profit_sum, dec!(200));
    assert_eq!(valuation.cash_reserves, dec!(23200));
    assert_eq!(valuation.active_market_sum, dec!(1200));
    assert_eq!(valuation.total_portfolio_value, dec!(23600));
    assert_eq!(valuation.realized_roi, dec!(40));
    assert_eq!(coordinator.assets(AssetFilter::Sold).len(), 1);

    coordinator.teardown();
}
