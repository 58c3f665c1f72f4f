//! Assets module - domain models, validation, and the repository contract.

mod assets_model;
mod assets_traits;
mod image;

#[cfg(test)]
mod assets_model_tests;

// Re-export the public interface
pub use assets_model::{Asset, AssetFilter, NewAsset};
pub use assets_traits::AssetRepositoryTrait;
pub use image::{check_image_payload, exceeds_cache_limit, is_embedded_image, placeholder_image_url};
