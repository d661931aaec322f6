//! The offline-resilience worker.
//!
//! A [`Worker`] owns the lifecycle manager, the request router and the
//! network, and exposes the three event entry points hosts drive:
//! [`Worker::on_install`], [`Worker::on_activate`] and [`Worker::on_request`].

pub mod lifecycle;
pub mod router;
mod strategy;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

use transit_core::cache::NamespaceInfo;
use transit_core::{AppConfig, CacheStorage, CacheStore, CacheVersion, Error, Request, Response, ShellManifest};

use crate::fetch::{Network, canonicalize};

pub use lifecycle::{ActivateReport, CacheLifecycleManager, InstallReport, LifecycleState};
pub use router::{RequestRouter, RouteClass};

/// Worker settings, usually derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub origin: Url,
    pub version: CacheVersion,
    pub shell: ShellManifest,
    pub network_only_routes: Vec<String>,
    pub refresh_shell_in_background: bool,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin =
            Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("origin {}: {e}", config.origin)))?;
        Ok(Self {
            origin,
            version: config.cache_version(),
            shell: config.shell_manifest.clone(),
            network_only_routes: config.network_only_routes.clone(),
            refresh_shell_in_background: config.refresh_shell_in_background,
        })
    }
}

/// Result of [`Worker::boot`].
#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    pub install: InstallReport,
    pub activate: ActivateReport,
}

/// Fire-and-forget tasks that can still be awaited before shutdown.
#[derive(Default)]
struct Background {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Background {
    async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    async fn flush(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "background task failed");
            }
        }
    }
}

pub struct Worker {
    lifecycle: CacheLifecycleManager,
    router: RequestRouter,
    network: Arc<dyn Network>,
    origin: Url,
    refresh_shell_in_background: bool,
    background: Background,
}

impl Worker {
    /// Build a worker over injected storage and network.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoute` if a network-only pattern does not compile.
    pub fn new(config: WorkerConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Result<Self, Error> {
        let router = RequestRouter::new(&config.origin, &config.network_only_routes)?;
        let lifecycle =
            CacheLifecycleManager::new(storage, network.clone(), config.version, config.origin.clone(), config.shell);
        Ok(Self {
            lifecycle,
            router,
            network,
            origin: config.origin,
            refresh_shell_in_background: config.refresh_shell_in_background,
            background: Background::default(),
        })
    }

    pub async fn on_install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.install().await
    }

    pub async fn on_activate(&self) -> Result<ActivateReport, Error> {
        self.lifecycle.activate().await
    }

    /// Adopt a complete cached shell for this version without the network.
    pub async fn resume(&self) -> Result<Option<InstallReport>, Error> {
        self.lifecycle.resume().await
    }

    /// Bring the worker to `active`: adopt a complete cached shell for this
    /// version if one exists, otherwise install, then activate.
    pub async fn boot(&self) -> Result<BootReport, Error> {
        let install = match self.lifecycle.resume().await? {
            Some(report) => report,
            None => self.lifecycle.install().await?,
        };
        let activate = self.lifecycle.activate().await?;
        Ok(BootReport { install, activate })
    }

    /// Produce exactly one response or one failure for an intercepted request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Lifecycle` before activation; otherwise whatever the
    /// selected strategy could not recover from.
    pub async fn on_request(&self, request: Request) -> Result<Response, Error> {
        let state = self.lifecycle.state().await;
        if state != LifecycleState::Active {
            return Err(Error::Lifecycle(format!(
                "cannot route {} {}: worker is {}",
                request.method,
                request.url,
                state.as_str()
            )));
        }

        let route = self.router.classify(&request);
        tracing::debug!(method = %request.method, url = %request.url, route = %route, "routing request");

        match route {
            RouteClass::NetworkOnly => self.network_only(&request).await,
            RouteClass::CrossOriginFallback => self.cross_origin_fallback(&request).await,
            RouteClass::ShellFirst => self.shell_first(&request).await,
        }
    }

    /// Canonicalize `url` against the app origin and route it.
    pub async fn request(&self, method: &str, url: &str) -> Result<Response, Error> {
        let request = Request::new(method, self.resolve(url)?);
        self.on_request(request).await
    }

    /// Canonical absolute URL for a path or URL, relative to the app origin.
    pub fn resolve(&self, url: &str) -> Result<Url, Error> {
        canonicalize(url, &self.origin).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))
    }

    pub fn classify(&self, request: &Request) -> RouteClass {
        self.router.classify(request)
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn version(&self) -> &CacheVersion {
        self.lifecycle.version()
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    /// Handle on the current version's namespace.
    pub fn store(&self) -> CacheStore {
        self.lifecycle.store()
    }

    pub async fn namespaces(&self) -> Result<Vec<NamespaceInfo>, Error> {
        self.lifecycle.namespaces().await
    }

    /// Wait for every background cache write started so far.
    pub async fn flush(&self) {
        self.background.flush().await;
    }
}
