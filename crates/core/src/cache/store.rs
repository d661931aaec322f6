//! A cache handle bound to one version's namespace.

use std::sync::Arc;

use super::entries::CacheEntry;
use super::identity::{CacheVersion, RequestIdentity};
use super::storage::CacheStorage;
use crate::Error;
use crate::http::{Request, Response};

/// Get/put access to exactly one namespace.
///
/// There is no way to reach another namespace through a `CacheStore`, and no
/// way to delete: tearing a namespace down belongs to the lifecycle manager,
/// which talks to [`CacheStorage`] directly.
#[derive(Clone)]
pub struct CacheStore {
    storage: Arc<dyn CacheStorage>,
    namespace: String,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").field("namespace", &self.namespace).finish()
    }
}

impl CacheStore {
    /// Bind to the namespace of `version` without creating it.
    pub fn bind(storage: Arc<dyn CacheStorage>, version: &CacheVersion) -> Self {
        Self { storage, namespace: version.namespace() }
    }

    /// Bind to the namespace of `version`, creating it if needed.
    pub async fn open(storage: Arc<dyn CacheStorage>, version: &CacheVersion) -> Result<Self, Error> {
        let store = Self::bind(storage, version);
        store.storage.open(&store.namespace).await?;
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up an entry. Identities that are never stored always miss.
    pub async fn get(&self, identity: &RequestIdentity) -> Result<Option<CacheEntry>, Error> {
        if !identity.is_cacheable() {
            return Ok(None);
        }
        self.storage.get(&self.namespace, identity).await
    }

    /// Look up the response stored for a request.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        Ok(self.get(&request.identity()).await?.map(CacheEntry::into_response))
    }

    /// Store a response, overwriting any prior entry for the identity.
    ///
    /// Takes the response by value: callers that also return it must pass a
    /// [`Response::duplicate`].
    pub async fn put(&self, identity: RequestIdentity, response: Response) -> Result<(), Error> {
        check_cacheable(&identity, &response)?;
        self.storage
            .put(&self.namespace, CacheEntry::from_response(identity, &response))
            .await
    }

    /// Store a batch atomically; nothing is written if any pair is rejected.
    pub async fn put_all(&self, pairs: Vec<(RequestIdentity, Response)>) -> Result<(), Error> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (identity, response) in pairs {
            check_cacheable(&identity, &response)?;
            entries.push(CacheEntry::from_response(identity, &response));
        }
        self.storage.put_all(&self.namespace, entries).await
    }

    pub async fn identities(&self) -> Result<Vec<RequestIdentity>, Error> {
        self.storage.identities(&self.namespace).await
    }
}

fn check_cacheable(identity: &RequestIdentity, response: &Response) -> Result<(), Error> {
    if !identity.is_cacheable() {
        return Err(Error::NotCacheable(format!("{identity}: only GET requests are cached")));
    }
    if !response.is_ok() {
        return Err(Error::NotCacheable(format!("{identity}: status {}", response.status)));
    }
    Ok(())
}
