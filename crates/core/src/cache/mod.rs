//! Local cache module - fallback asset snapshot, its storage backends and
//! the background writer that keeps disk I/O off the async runtime.

mod cache_traits;
mod cache_writer;
mod local_cache;
mod stores;

pub use cache_traits::CacheStore;
pub use cache_writer::CacheWriter;
pub use local_cache::{prepare_for_cache, LocalAssetCache};
pub use stores::{FileCacheStore, MemoryCacheStore};
