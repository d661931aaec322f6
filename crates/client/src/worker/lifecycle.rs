//! Install/activate lifecycle and cache version management.
//!
//! ### Install
//! - Open the namespace for the current version
//! - Fetch every shell path, then write all of them in one atomic batch
//! - Any failed fetch or non-2xx status fails the whole install
//!
//! ### Activate
//! - Requires a completed install
//! - Delete every namespace other than the current one
//! - Claim clients: from here on requests are routed
//!
//! This manager is the only component that deletes namespaces.

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use transit_core::cache::NamespaceInfo;
use transit_core::{CacheStorage, CacheStore, CacheVersion, Error, Request, ShellManifest};

use crate::fetch::{Network, canonicalize};

/// Where the worker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Not installed yet, or the last install failed.
    Pending,
    /// Shell precached; waiting to activate.
    Installed,
    /// Old versions removed and clients claimed; requests are routed.
    Active,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Installed => "installed",
            LifecycleState::Active => "active",
        }
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub version: String,
    pub namespace: String,
    /// Canonical URLs written to the cache, in manifest order.
    pub precached: Vec<String>,
    /// False when an existing complete shell cache was adopted instead.
    pub fetched: bool,
    /// Eligible to activate immediately, without waiting for old clients.
    pub skip_waiting: bool,
}

/// Outcome of a successful activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub namespace: String,
    /// Stale namespaces removed, ordered by name.
    pub deleted: Vec<String>,
    pub clients_claimed: bool,
}

/// Owns cache version transitions.
pub struct CacheLifecycleManager {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    version: CacheVersion,
    origin: Url,
    shell: ShellManifest,
    state: RwLock<LifecycleState>,
}

impl CacheLifecycleManager {
    pub fn new(
        storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, version: CacheVersion, origin: Url,
        shell: ShellManifest,
    ) -> Self {
        Self { storage, network, version, origin, shell, state: RwLock::new(LifecycleState::Pending) }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    /// Handle on the current namespace.
    pub fn store(&self) -> CacheStore {
        CacheStore::bind(self.storage.clone(), &self.version)
    }

    /// All namespaces currently in storage.
    pub async fn namespaces(&self) -> Result<Vec<NamespaceInfo>, Error> {
        self.storage.namespaces().await
    }

    fn shell_requests(&self) -> Result<Vec<(String, Request)>, Error> {
        self.shell
            .iter()
            .map(|path| {
                let url = canonicalize(path, &self.origin)
                    .map_err(|e| Error::InstallFailed { path: path.to_string(), reason: e.to_string() })?;
                Ok((path.to_string(), Request::get(url)))
            })
            .collect()
    }

    /// Precache the shell into the current namespace.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` naming the first path that could not be
    /// fetched, or the storage error if the batch write failed. In both cases
    /// nothing was written and the state is unchanged.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let namespace = self.version.namespace();
        tracing::info!(version = %self.version, namespace = %namespace, "installing shell");

        let store = CacheStore::open(self.storage.clone(), &self.version).await?;
        let requests = self.shell_requests()?;

        let fetches = requests.iter().map(|(path, request)| async move {
            let response = self
                .network
                .fetch(request)
                .await
                .map_err(|e| Error::InstallFailed { path: path.clone(), reason: e.to_string() })?;
            if !response.is_ok() {
                return Err(Error::InstallFailed { path: path.clone(), reason: format!("status {}", response.status) });
            }
            Ok((request.identity(), response))
        });

        let pairs = match try_join_all(fetches).await {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::warn!(version = %self.version, error = %e, "install failed");
                return Err(e);
            }
        };

        let precached: Vec<String> = pairs.iter().map(|(identity, _)| identity.url.clone()).collect();
        if let Err(e) = store.put_all(pairs).await {
            tracing::warn!(version = %self.version, error = %e, "install failed writing shell");
            return Err(e);
        }

        let mut state = self.state.write().await;
        if *state == LifecycleState::Pending {
            *state = LifecycleState::Installed;
        }
        tracing::info!(version = %self.version, entries = precached.len(), "shell installed");

        Ok(InstallReport {
            version: self.version.version().to_string(),
            namespace,
            precached,
            fetched: true,
            skip_waiting: true,
        })
    }

    /// Adopt a complete shell cache left by an earlier run of this version.
    ///
    /// Returns None, without touching the network, if any shell entry is
    /// missing from the current namespace.
    pub async fn resume(&self) -> Result<Option<InstallReport>, Error> {
        let store = self.store();
        let mut precached = Vec::with_capacity(self.shell.len());
        for (_, request) in self.shell_requests()? {
            if store.get(&request.identity()).await?.is_none() {
                return Ok(None);
            }
            precached.push(request.url.to_string());
        }

        let mut state = self.state.write().await;
        if *state == LifecycleState::Pending {
            *state = LifecycleState::Installed;
        }
        tracing::info!(version = %self.version, entries = precached.len(), "adopted cached shell");

        Ok(Some(InstallReport {
            version: self.version.version().to_string(),
            namespace: self.version.namespace(),
            precached,
            fetched: false,
            skip_waiting: true,
        }))
    }

    /// Remove every other version's namespace and start serving.
    ///
    /// # Errors
    ///
    /// Returns `Error::Lifecycle` if no install has completed.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let mut state = self.state.write().await;
        if *state == LifecycleState::Pending {
            return Err(Error::Lifecycle(format!("cannot activate {}: install has not completed", self.version)));
        }

        let current = self.version.namespace();
        let mut deleted = Vec::new();
        for namespace in self.storage.namespaces().await? {
            if namespace.name != current && self.storage.delete_namespace(&namespace.name).await? {
                tracing::info!(namespace = %namespace.name, entries = namespace.entries, "deleted stale cache");
                deleted.push(namespace.name);
            }
        }

        *state = LifecycleState::Active;
        tracing::info!(version = %self.version, deleted = deleted.len(), "activated; clients claimed");

        Ok(ActivateReport { namespace: current, deleted, clients_claimed: true })
    }
}
