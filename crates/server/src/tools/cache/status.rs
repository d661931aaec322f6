//! cache_status tool implementation.
//!
//! Reports the worker state and every namespace in storage.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use transit_client::Worker;

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NamespaceStatus {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
    /// Belongs to the configured cache version.
    pub current: bool,
}

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusOutput {
    pub version: String,
    pub namespace: String,
    /// One of pending, installed, active.
    pub state: String,
    pub namespaces: Vec<NamespaceStatus>,
}

/// Implementation of the cache_status tool.
pub async fn status_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let current = worker.version().namespace();
    let namespaces = worker
        .namespaces()
        .await?
        .into_iter()
        .map(|ns| NamespaceStatus {
            current: ns.name == current,
            name: ns.name,
            created_at: ns.created_at,
            entries: ns.entries,
        })
        .collect();

    let output = CacheStatusOutput {
        version: worker.version().version().to_string(),
        namespace: current,
        state: worker.state().await.as_str().to_string(),
        namespaces,
    };

    json_result(&output)
}
