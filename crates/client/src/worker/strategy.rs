//! Per-class fetch strategies.
//!
//! - network-only: forward, never touch the cache
//! - cross-origin-fallback: network first, background write, cache on failure
//! - shell-first: cache first, network on miss with an awaited write
//!
//! Cache write failures never fail a request; they are logged at warn.

use transit_core::{CacheStore, Error, Request, Response};

use super::Worker;

impl Worker {
    pub(super) async fn network_only(&self, request: &Request) -> Result<Response, Error> {
        self.network.fetch(request).await
    }

    pub(super) async fn cross_origin_fallback(&self, request: &Request) -> Result<Response, Error> {
        let store = self.store();

        let err = match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() && request.identity().is_cacheable() {
                    let identity = request.identity();
                    let copy = response.duplicate();
                    self.background
                        .spawn(async move {
                            if let Err(e) = store.put(identity.clone(), copy).await {
                                tracing::warn!(identity = %identity, error = %e, "cache write failed");
                            }
                        })
                        .await;
                }
                return Ok(response);
            }
            Err(e) if e.is_network_failure() => e,
            Err(e) => return Err(e),
        };

        match store.match_request(request).await {
            Ok(Some(cached)) => {
                tracing::debug!(url = %request.url, error = %err, "network failed; served from cache");
                Ok(cached)
            }
            Ok(None) => Err(err),
            Err(read) => {
                tracing::warn!(url = %request.url, error = %read, "cache read failed");
                Err(err)
            }
        }
    }

    pub(super) async fn shell_first(&self, request: &Request) -> Result<Response, Error> {
        let store = self.store();

        match store.match_request(request).await {
            Ok(Some(cached)) => {
                tracing::debug!(url = %request.url, "served from cache");
                if self.refresh_shell_in_background {
                    self.refresh(store, request.clone()).await;
                }
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(url = %request.url, error = %e, "cache read failed; trying network"),
        }

        let response = self.network.fetch(request).await?;
        if response.is_ok() && request.identity().is_cacheable() {
            let identity = request.identity();
            if let Err(e) = store.put(identity.clone(), response.duplicate()).await {
                tracing::warn!(identity = %identity, error = %e, "cache write failed");
            }
        }
        Ok(response)
    }

    /// Re-fetch a shell entry after serving it, overwriting it on a 2xx.
    async fn refresh(&self, store: CacheStore, request: Request) {
        let network = self.network.clone();
        self.background
            .spawn(async move {
                let identity = request.identity();
                match network.fetch(&request).await {
                    Ok(response) if response.is_ok() => {
                        if let Err(e) = store.put(identity.clone(), response).await {
                            tracing::warn!(identity = %identity, error = %e, "cache refresh write failed");
                        }
                    }
                    Ok(response) => {
                        tracing::debug!(identity = %identity, status = response.status, "cache refresh skipped")
                    }
                    Err(e) => tracing::debug!(identity = %identity, error = %e, "cache refresh failed"),
                }
            })
            .await;
    }
}
