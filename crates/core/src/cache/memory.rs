//! In-memory storage backend.
//!
//! Uses a BTreeMap behind a tokio RwLock; every operation takes the lock
//! once, which makes single-key writes and batches atomic.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::entries::CacheEntry;
use super::identity::RequestIdentity;
use super::namespaces::NamespaceInfo;
use super::storage::CacheStorage;
use crate::Error;

#[derive(Debug)]
struct Namespace {
    created_at: String,
    entries: BTreeMap<String, CacheEntry>,
}

impl Namespace {
    fn new() -> Self {
        Self { created_at: chrono::Utc::now().to_rfc3339(), entries: BTreeMap::new() }
    }
}

/// Volatile [`CacheStorage`] for tests and ephemeral hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    namespaces: Arc<RwLock<BTreeMap<String, Namespace>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total number of entries across all namespaces.
    ///
    /// Writes that would exceed the limit fail with [`Error::QuotaExceeded`].
    pub fn with_quota(max_entries: usize) -> Self {
        Self { quota: Some(max_entries), ..Self::default() }
    }

    fn check_quota(
        &self,
        all: &BTreeMap<String, Namespace>,
        namespace: &str,
        new: &[&CacheEntry],
    ) -> Result<(), Error> {
        let Some(max) = self.quota else {
            return Ok(());
        };
        let current: usize = all.values().map(|ns| ns.entries.len()).sum();
        let existing = all.get(namespace);
        let mut added = 0;
        let mut seen: Vec<String> = Vec::new();
        for entry in new {
            let key = entry.identity.key();
            let replaces = existing.is_some_and(|ns| ns.entries.contains_key(&key));
            if !replaces && !seen.contains(&key) {
                added += 1;
            }
            seen.push(key);
        }
        if current + added > max {
            return Err(Error::QuotaExceeded(max));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let mut all = self.namespaces.write().await;
        all.entry(namespace.to_string()).or_insert_with(Namespace::new);
        Ok(())
    }

    async fn namespaces(&self) -> Result<Vec<NamespaceInfo>, Error> {
        let all = self.namespaces.read().await;
        Ok(all
            .iter()
            .map(|(name, ns)| NamespaceInfo {
                name: name.clone(),
                created_at: ns.created_at.clone(),
                entries: ns.entries.len() as u64,
            })
            .collect())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error> {
        let mut all = self.namespaces.write().await;
        Ok(all.remove(namespace).is_some())
    }

    async fn get(&self, namespace: &str, identity: &RequestIdentity) -> Result<Option<CacheEntry>, Error> {
        let all = self.namespaces.read().await;
        Ok(all
            .get(namespace)
            .and_then(|ns| ns.entries.get(&identity.key()))
            .cloned())
    }

    async fn put(&self, namespace: &str, entry: CacheEntry) -> Result<(), Error> {
        let mut all = self.namespaces.write().await;
        self.check_quota(&all, namespace, &[&entry])?;
        let ns = all.entry(namespace.to_string()).or_insert_with(Namespace::new);
        ns.entries.insert(entry.identity.key(), entry);
        Ok(())
    }

    async fn put_all(&self, namespace: &str, entries: Vec<CacheEntry>) -> Result<(), Error> {
        let mut all = self.namespaces.write().await;
        let refs: Vec<&CacheEntry> = entries.iter().collect();
        self.check_quota(&all, namespace, &refs)?;
        let ns = all.entry(namespace.to_string()).or_insert_with(Namespace::new);
        for entry in entries {
            ns.entries.insert(entry.identity.key(), entry);
        }
        Ok(())
    }

    async fn identities(&self, namespace: &str) -> Result<Vec<RequestIdentity>, Error> {
        let all = self.namespaces.read().await;
        let mut out: Vec<RequestIdentity> = all
            .get(namespace)
            .map(|ns| ns.entries.values().map(|e| e.identity.clone()).collect())
            .unwrap_or_default();
        out.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(out)
    }
}
