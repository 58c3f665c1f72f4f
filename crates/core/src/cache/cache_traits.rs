use crate::errors::CacheError;

/// Key/value backend holding serialized cache entries.
///
/// Backends report failures honestly; swallowing them is the job of the
/// cache layered on top.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}
