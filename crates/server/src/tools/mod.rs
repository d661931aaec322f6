//! MCP tool implementations.
//!
//! This module contains all tools exposed by the transit-mcp server.

pub mod cache;
pub mod worker_activate;
pub mod worker_fetch;
pub mod worker_install;

pub use worker_fetch::WorkerFetchParams;
pub use worker_install::WorkerInstallParams;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use transit_core::Error;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use transit_client::{Network, Worker, WorkerConfig};
    use transit_core::{AppConfig, Error, MemoryStorage, Request, Response};

    pub(crate) const ORIGIN: &str = "http://app.test";

    /// Fixed responses by URL; everything else is 404.
    pub(crate) struct StaticNetwork(pub HashMap<String, (u16, &'static str)>);

    #[async_trait]
    impl Network for StaticNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            let (status, body) = self.0.get(request.url.as_str()).copied().unwrap_or((404, "not found"));
            Ok(Response::new(request.url.as_str(), status, body))
        }
    }

    pub(crate) fn shell_network() -> StaticNetwork {
        StaticNetwork(HashMap::from([
            (format!("{ORIGIN}/"), (200, "<html>root</html>")),
            (format!("{ORIGIN}/index.html"), (200, "<html>index</html>")),
            (format!("{ORIGIN}/manifest.json"), (200, "{}")),
            (format!("{ORIGIN}/health"), (200, "ok")),
        ]))
    }

    /// A worker over memory storage that has not been installed yet.
    pub(crate) fn pending_worker() -> Worker {
        let app = AppConfig { origin: ORIGIN.into(), ..Default::default() };
        let config = WorkerConfig::from_app_config(&app).unwrap();
        Worker::new(config, Arc::new(MemoryStorage::new()), Arc::new(shell_network())).unwrap()
    }

    pub(crate) async fn active_worker() -> Worker {
        let worker = pending_worker();
        worker.boot().await.unwrap();
        worker
    }

    /// Text of the first content block.
    pub(crate) fn text_of(result: &rmcp::model::CallToolResult) -> String {
        result.content[0].as_text().map(|t| t.text.clone()).unwrap_or_default()
    }
}
