//! Shared key generation for object store backends.
//!
//! Key format: `features/{uuid}.{ext}`, or `features/{uuid}` when the declared
//! name has no usable extension.

use storefront_core::CandidateFile;
use uuid::Uuid;

/// Generate a fresh object key for a candidate file.
pub fn generate_object_key(file: &CandidateFile) -> String {
    let id = Uuid::new_v4();
    match file.extension() {
        Some(ext) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!("features/{}.{}", id, ext)
        }
        _ => format!("features/{}", id),
    }
}

/// Reject keys that could escape the storage root.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/')
}
