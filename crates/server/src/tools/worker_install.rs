//! worker_install tool implementation.
//!
//! Precaches the shell into the current version's namespace.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use transit_client::{ActivateReport, InstallReport, Worker};

use super::json_result;

/// Parameters for the worker_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerInstallParams {
    /// Activate right after a successful install.
    #[serde(default)]
    pub activate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerInstallOutput {
    pub install: InstallReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activate: Option<ActivateReport>,
}

/// Implementation of the worker_install tool.
pub async fn install_impl(worker: &Worker, params: WorkerInstallParams) -> Result<CallToolResult, McpError> {
    let install = worker.on_install().await?;
    let activate = if params.activate { Some(worker.on_activate().await?) } else { None };

    json_result(&WorkerInstallOutput { install, activate })
}
