//! worker_fetch tool implementation.
//!
//! Routes one request through the active worker, exactly as an intercepted
//! page request would be.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use transit_client::Worker;
use transit_core::{Error, Request, ResponseSource};

use super::json_result;

/// Input parameters for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL, or a path resolved against the app origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers, forwarded unmodified.
    #[serde(default)]
    pub headers: Vec<HeaderParam>,

    /// Request body, forwarded unmodified.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderParam {
    pub name: String,
    pub value: String,
}

/// Output structure for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// Canonical request URL.
    pub url: String,
    /// The final URL after redirects.
    pub final_url: String,
    pub method: String,
    /// Strategy class the request was routed with.
    pub route: String,
    pub status: u16,
    /// Whether the response came from the network or the cache.
    pub source: ResponseSource,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(worker: &Worker, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()).into());
    }

    let url = worker.resolve(&params.url)?;
    let mut request = Request::new(&params.method, url);
    for header in params.headers {
        request = request.with_header(header.name, header.value);
    }
    if let Some(body) = params.body {
        request = request.with_body(body);
    }

    let route = worker.classify(&request);
    let url = request.url.to_string();
    let method = request.method.clone();
    let response = worker.on_request(request).await?;

    let output = WorkerFetchOutput {
        url,
        final_url: response.url.clone(),
        method,
        route: route.to_string(),
        status: response.status,
        source: response.source,
        content_type: response.header("content-type").map(str::to_string),
        body: response.text(),
        body_bytes: response.body.len(),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{active_worker, pending_worker, text_of};

    fn params(url: &str) -> WorkerFetchParams {
        WorkerFetchParams { url: url.into(), method: default_method(), headers: Vec::new(), body: None }
    }

    async fn fetch(worker: &Worker, params: WorkerFetchParams) -> WorkerFetchOutput {
        let result = fetch_impl(worker, params).await.unwrap();
        serde_json::from_str(&text_of(&result)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_shell_from_cache() {
        let worker = active_worker().await;

        let output = fetch(&worker, params("/index.html")).await;

        assert_eq!(output.url, "http://app.test/index.html");
        assert_eq!(output.route, "shell-first");
        assert_eq!(output.source, ResponseSource::Cache);
        assert_eq!(output.body, "<html>index</html>");
    }

    #[tokio::test]
    async fn test_fetch_health_is_network_only() {
        let worker = active_worker().await;

        let output = fetch(&worker, params("/health")).await;

        assert_eq!(output.route, "network-only");
        assert_eq!(output.source, ResponseSource::Network);
        assert_eq!(output.status, 200);
    }

    #[tokio::test]
    async fn test_fetch_post_with_body() {
        let worker = active_worker().await;
        let params = WorkerFetchParams {
            url: "/api/convert".into(),
            method: "post".into(),
            headers: vec![HeaderParam { name: "content-type".into(), value: "application/json".into() }],
            body: Some(r#"{"url":"https://chat.example/share/1"}"#.into()),
        };

        let output = fetch(&worker, params).await;

        assert_eq!(output.method, "POST");
        assert_eq!(output.route, "network-only");
        assert_eq!(output.status, 404);
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let worker = active_worker().await;
        let err = fetch_impl(&worker, params("  ")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_fetch_before_activation() {
        let worker = pending_worker();
        let err = fetch_impl(&worker, params("/")).await.unwrap_err();
        assert_eq!(err.code.0, -32021);
    }
}
