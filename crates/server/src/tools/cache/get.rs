//! cache_get tool implementation.
//!
//! Looks up the entry stored for `GET <url>` in the current namespace.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use transit_client::Worker;
use transit_core::{Error, Request, RequestIdentity};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the app origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub namespace: String,
    pub identity: RequestIdentity,
    pub status: u16,
    pub final_url: String,
    pub stored_at: String,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &Worker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let identity = Request::get(worker.resolve(&params.url)?).identity();
    let store = worker.store();
    let entry = store
        .get(&identity)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{identity} in {}", store.namespace())))?;

    let output = CacheGetOutput {
        namespace: store.namespace().to_string(),
        identity: entry.identity,
        status: entry.status,
        final_url: entry.final_url,
        stored_at: entry.stored_at,
        headers: entry.headers,
        body: String::from_utf8_lossy(&entry.body).into_owned(),
        body_bytes: entry.body.len(),
    };

    json_result(&output)
}
