//! Request identity and cache version naming.

use serde::{Deserialize, Serialize};
use url::Url;

use super::hash::compute_cache_key;

/// Normalized key of a cache entry: upper-cased method plus canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RequestIdentity {
    pub method: String,
    pub url: String,
}

impl RequestIdentity {
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url: url.to_string() }
    }

    /// Content-addressed key used by the storage backends.
    pub fn key(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }

    /// Only GET responses may be stored or replayed.
    pub fn is_cacheable(&self) -> bool {
        self.method == "GET"
    }
}

impl std::fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Identifier of one cache generation.
///
/// Each deployment ships a new version; the namespace name embeds it and is
/// the only invalidation mechanism across deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheVersion {
    prefix: String,
    version: String,
}

impl CacheVersion {
    pub fn new(prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), version: version.into() }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Namespace name for this generation, `<prefix>-<version>`.
    pub fn namespace(&self) -> String {
        format!("{}-{}", self.prefix, self.version)
    }
}

impl std::fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.version)
    }
}
