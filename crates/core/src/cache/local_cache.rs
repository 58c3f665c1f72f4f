//! Local fallback snapshot of the asset list.
//!
//! The snapshot bootstraps the UI before the store answers and covers
//! offline starts. It is never authoritative once the store is reachable.

use std::sync::Arc;

use log::{debug, error, warn};

use super::cache_traits::CacheStore;
use crate::assets::{exceeds_cache_limit, placeholder_image_url, Asset};
use crate::constants::CACHE_NAMESPACE;
use crate::errors::CacheError;

#[derive(Clone)]
pub struct LocalAssetCache {
    store: Arc<dyn CacheStore>,
    namespace: String,
}

impl LocalAssetCache {
    /// Cache under the default namespace key.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_namespace(store, CACHE_NAMESPACE)
    }

    pub fn with_namespace(store: Arc<dyn CacheStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the cached snapshot, or an empty list when it is missing or unreadable.
    pub fn read(&self) -> Vec<Asset> {
        match self.try_read() {
            Ok(assets) => assets,
            Err(e) => {
                warn!(
                    "Ignoring unreadable cache entry '{}': {}",
                    self.namespace, e
                );
                Vec::new()
            }
        }
    }

    /// Persists the snapshot. Failures are logged and otherwise ignored.
    pub fn write(&self, assets: &[Asset]) {
        if let Err(e) = self.try_write(assets) {
            error!(
                "Failed to persist {} asset(s) to cache entry '{}': {}",
                assets.len(),
                self.namespace,
                e
            );
        }
    }

    /// Drops the snapshot. Failures are logged and otherwise ignored.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.namespace) {
            error!("Failed to clear cache entry '{}': {}", self.namespace, e);
        }
    }

    fn try_read(&self) -> Result<Vec<Asset>, CacheError> {
        match self.store.get(&self.namespace)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => {
                debug!("No cache entry '{}' yet", self.namespace);
                Ok(Vec::new())
            }
        }
    }

    fn try_write(&self, assets: &[Asset]) -> Result<(), CacheError> {
        let prepared = prepare_for_cache(assets);
        let serialized = serde_json::to_string(&prepared)?;
        self.store.set(&self.namespace, &serialized)
    }
}

/// Replaces oversized inline images with placeholder references.
pub fn prepare_for_cache(assets: &[Asset]) -> Vec<Asset> {
    assets
        .iter()
        .map(|asset| {
            if exceeds_cache_limit(&asset.image_url) {
                debug!(
                    "Replacing {}-character inline image of asset {} before caching",
                    asset.image_url.len(),
                    asset.id
                );
                Asset {
                    image_url: placeholder_image_url(&asset.id, &asset.name),
                    ..asset.clone()
                }
            } else {
                asset.clone()
            }
        })
        .collect()
}
