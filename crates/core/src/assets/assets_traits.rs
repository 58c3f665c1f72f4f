use super::assets_model::{Asset, NewAsset};
use crate::errors::Result;

/// Trait defining the contract against the authoritative asset store.
///
/// Each call is exactly one round trip. Implementations never retry; the
/// caller owns any retry or backoff policy.
#[async_trait::async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    /// All assets, newest creation first.
    async fn list_all(&self) -> Result<Vec<Asset>>;
    /// Inserts the draft; the store assigns id and timestamps.
    async fn create(&self, new_asset: NewAsset) -> Result<Asset>;
    /// Full replace by id. `created_at` is kept from the stored row.
    async fn update(&self, asset: Asset) -> Result<Asset>;
    /// Hard delete. Ids are never reused.
    async fn delete(&self, asset_id: &str) -> Result<()>;
}
