//! Image reference inspection.
//!
//! Images reach the engine either as a URL or as an inline `data:image/...`
//! payload produced by the capture collaborator. Only the payload length is
//! ever inspected; image content is never decoded here.

use crate::constants::{
    CACHE_EMBEDDED_IMAGE_LIMIT, EMBEDDED_IMAGE_PREFIX, MAX_EMBEDDED_IMAGE_CHARS,
    PLACEHOLDER_IMAGE_BASE_URL,
};
use crate::errors::ValidationError;

pub fn is_embedded_image(image_url: &str) -> bool {
    image_url.starts_with(EMBEDDED_IMAGE_PREFIX)
}

/// True when the reference is an inline payload too large for the local cache.
pub fn exceeds_cache_limit(image_url: &str) -> bool {
    is_embedded_image(image_url) && image_url.len() > CACHE_EMBEDDED_IMAGE_LIMIT
}

/// Deterministic placeholder artwork for an asset, seeded by id (or name when id is empty).
pub fn placeholder_image_url(id: &str, name: &str) -> String {
    let seed = if id.is_empty() { name } else { id };
    format!(
        "{}{}",
        PLACEHOLDER_IMAGE_BASE_URL,
        urlencoding::encode(seed)
    )
}

/// Rejects inline payloads larger than a mutation may carry.
pub fn check_image_payload(image_url: &str) -> Result<(), ValidationError> {
    if is_embedded_image(image_url) && image_url.len() > MAX_EMBEDDED_IMAGE_CHARS {
        return Err(ValidationError::ImageTooLarge {
            size: image_url.len(),
            limit: MAX_EMBEDDED_IMAGE_CHARS,
        });
    }
    Ok(())
}
