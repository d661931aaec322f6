//! Storage backend abstraction.
//!
//! The worker never talks to a global cache registry; it receives an
//! `Arc<dyn CacheStorage>` so tests can substitute [`super::MemoryStorage`]
//! for the SQLite-backed [`CacheDb`].

use async_trait::async_trait;

use super::connection::CacheDb;
use super::entries::CacheEntry;
use super::identity::RequestIdentity;
use super::namespaces::NamespaceInfo;
use crate::Error;

/// A registry of named namespaces, each mapping identities to entries.
///
/// Single-key operations must be atomic; `put_all` must be all-or-nothing.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the namespace if it doesn't exist.
    async fn open(&self, namespace: &str) -> Result<(), Error>;

    /// All namespaces, ordered by name.
    async fn namespaces(&self) -> Result<Vec<NamespaceInfo>, Error>;

    /// Delete a namespace and every entry in it.
    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error>;

    async fn get(&self, namespace: &str, identity: &RequestIdentity) -> Result<Option<CacheEntry>, Error>;

    /// Insert or overwrite one entry.
    async fn put(&self, namespace: &str, entry: CacheEntry) -> Result<(), Error>;

    /// Insert or overwrite a batch atomically.
    async fn put_all(&self, namespace: &str, entries: Vec<CacheEntry>) -> Result<(), Error>;

    async fn identities(&self, namespace: &str) -> Result<Vec<RequestIdentity>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        self.create_namespace(namespace).await
    }

    async fn namespaces(&self) -> Result<Vec<NamespaceInfo>, Error> {
        self.list_namespaces().await
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error> {
        self.drop_namespace(namespace).await
    }

    async fn get(&self, namespace: &str, identity: &RequestIdentity) -> Result<Option<CacheEntry>, Error> {
        self.get_entry(namespace, identity).await
    }

    async fn put(&self, namespace: &str, entry: CacheEntry) -> Result<(), Error> {
        self.upsert_entry(namespace, &entry).await
    }

    async fn put_all(&self, namespace: &str, entries: Vec<CacheEntry>) -> Result<(), Error> {
        self.upsert_entries(namespace, &entries).await
    }

    async fn identities(&self, namespace: &str) -> Result<Vec<RequestIdentity>, Error> {
        self.list_identities(namespace).await
    }
}
