//! worker_activate tool implementation.
//!
//! Deletes every stale namespace and starts routing requests.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use transit_client::Worker;

use super::json_result;

/// Implementation of the worker_activate tool.
pub async fn activate_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let report = worker.on_activate().await?;
    json_result(&report)
}
