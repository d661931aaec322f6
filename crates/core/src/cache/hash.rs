//! Cache key generation from request identity.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request identity.
///
/// The method is expected upper-cased and the URL canonical; both are the
/// caller's responsibility (see [`super::RequestIdentity`]).
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", "https://app.test/index.html");
        let hash2 = compute_cache_key("GET", "https://app.test/index.html");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_cache_key("GET", "https://app.test/");
        let head = compute_cache_key("HEAD", "https://app.test/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_hash_separator_prevents_collisions() {
        assert_ne!(compute_cache_key("GE", "Thttps://a"), compute_cache_key("GET", "https://a"));
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("GET", "https://app.test/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
