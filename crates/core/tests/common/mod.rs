//! In-memory asset store shared by the integration tests.
//!
//! Behaves like the remote table: assigns ids and timestamps, orders rows
//! newest first and publishes a row-level notification after each write.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use apex_core::errors::{RepositoryError, Result};
use apex_core::feed::{ChangeChannel, ChangeKind, ChangeSource, TableChange};
use apex_core::{Asset, AssetRepositoryTrait, NewAsset};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::broadcast;

pub const TABLE: &str = "assets";

pub struct InMemoryStore {
    rows: RwLock<Vec<Asset>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    changes: broadcast::Sender<TableChange>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
            changes,
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Asset> {
        self.rows.read().unwrap().clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("connection refused".to_string()).into());
        }
        Ok(())
    }

    fn publish(&self, kind: ChangeKind, row_id: &str) {
        // No open channel is fine
        let _ = self.changes.send(TableChange::new(TABLE, kind, row_id));
    }
}

#[async_trait]
impl AssetRepositoryTrait for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Asset>> {
        self.check_online()?;
        Ok(self.rows())
    }

    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        self.check_online()?;
        let id = format!("coin-{:04}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let asset = new_asset.into_asset(id, Utc::now());
        self.rows.write().unwrap().insert(0, asset.clone());
        self.publish(ChangeKind::Insert, &asset.id);
        Ok(asset)
    }

    async fn update(&self, asset: Asset) -> Result<Asset> {
        self.check_online()?;
        let stored = {
            let mut rows = self.rows.write().unwrap();
            let slot = rows
                .iter_mut()
                .find(|row| row.id == asset.id)
                .ok_or_else(|| RepositoryError::NotFound(asset.id.clone()))?;
            *slot = Asset {
                created_at: slot.created_at,
                updated_at: Utc::now().max(slot.updated_at),
                ..asset
            };
            slot.clone()
        };
        self.publish(ChangeKind::Update, &stored.id);
        Ok(stored)
    }

    async fn delete(&self, asset_id: &str) -> Result<()> {
        self.check_online()?;
        {
            let mut rows = self.rows.write().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != asset_id);
            if rows.len() == before {
                return Err(RepositoryError::NotFound(asset_id.to_string()).into());
            }
        }
        self.publish(ChangeKind::Delete, asset_id);
        Ok(())
    }
}

impl ChangeSource for InMemoryStore {
    fn open_channel(&self, _table: &str) -> Result<ChangeChannel> {
        Ok(self.changes.subscribe())
    }
}

pub fn draft(name: &str, purchase: Decimal, current: Decimal) -> NewAsset {
    NewAsset {
        name: name.to_string(),
        image_url: "https://img.example/coin.png".to_string(),
        acquisition_date: Utc::now() - Duration::days(60),
        purchase_price: purchase,
        current_value: current,
        roi: Decimal::ZERO,
        description: None,
        grade: Some("AU-58".to_string()),
        mint: None,
        year: Some(1909),
        is_sold: false,
        sold_price: None,
        sold_date: None,
    }
}

pub fn morgan_dollar() -> NewAsset {
    draft("Morgan Dollar 1881-S", dec!(1000), dec!(1200))
}
