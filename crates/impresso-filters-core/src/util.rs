use crate::model::Filter;
use blake3::Hasher;

pub fn blake3_hex(data: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(data);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}

/// Stable key for caching compiled output of `filters`, derived from their
/// canonical JSON form. Order matters, as it does for the compiled output.
pub fn filters_cache_key(filters: &[Filter]) -> String {
    let canonical = serde_json::to_vec(filters).unwrap_or_default();
    blake3_hex(&canonical)
}
