//! Raw MCP HTTP client implementation.

use crate::error::ClientError;
use probe_protocol::{
    methods, CallToolParams, InitializeParams, JsonRpcRequest, RpcError,
};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the MCP endpoint when the configuration names none
pub const DEFAULT_MCP_PATH: &str = "/mcp";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timeout for the reachability probe
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Everything the server sent back, unjudged
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Id of the request this answers
    pub request_id: u64,
    /// HTTP status
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as text
    pub body: String,
    /// Body parsed as JSON, when it is JSON
    pub json: Option<Value>,
}

impl RawResponse {
    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `WWW-Authenticate` header value
    pub fn www_authenticate(&self) -> Option<&str> {
        self.headers
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
    }

    /// JSON-RPC `error` member
    pub fn rpc_error(&self) -> Option<RpcError> {
        let error = self.json.as_ref()?.get("error")?;
        match serde_json::from_value(error.clone()) {
            Ok(err) => Some(err),
            // Non-standard error shapes still count as errors
            Err(_) => Some(RpcError::new(RpcError::INTERNAL_ERROR, error.to_string())),
        }
    }

    /// JSON-RPC `result` member
    pub fn result(&self) -> Option<&Value> {
        self.json.as_ref()?.get("result")
    }

    /// First `limit` characters of the body
    pub fn body_preview(&self, limit: usize) -> String {
        self.body.chars().take(limit).collect()
    }
}

/// JSON-RPC over HTTP client for one MCP endpoint
pub struct McpHttpClient {
    mcp_url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl McpHttpClient {
    /// Create a client for `endpoint` + `mcp_path`
    pub fn new(endpoint: &str, mcp_path: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "endpoint must be an http(s) URL: '{}'",
                endpoint
            )));
        }

        let path = if mcp_path.is_empty() {
            DEFAULT_MCP_PATH.to_string()
        } else if mcp_path.starts_with('/') {
            mcp_path.to_string()
        } else {
            format!("/{}", mcp_path)
        };

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            mcp_url: format!("{}{}", endpoint, path),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// Full MCP URL
    pub fn mcp_url(&self) -> &str {
        &self.mcp_url
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send one JSON-RPC call. HTTP error statuses are returned, not raised.
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        auth_header: Option<&str>,
    ) -> Result<RawResponse, ClientError> {
        let id = self.next_id();
        let request = JsonRpcRequest::new(id, method, params);
        debug!(method, id, url = %self.mcp_url, "POST JSON-RPC");

        let mut builder = self
            .http
            .post(&self.mcp_url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request);
        if let Some(auth) = auth_header {
            builder = builder.header(AUTHORIZATION, auth);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let json = serde_json::from_str(&body).ok();

        debug!(method, id, status, "JSON-RPC response");
        if status >= 500 {
            warn!(method, status, "MCP server error");
        }

        Ok(RawResponse {
            request_id: id,
            status,
            headers,
            body,
            json,
        })
    }

    /// Whether the endpoint answers HTTP at all.
    ///
    /// Any of 200, 401 or 403 counts: the server is up and speaking HTTP even
    /// when it insists on credentials.
    pub async fn health_check(&self) -> bool {
        let request = JsonRpcRequest::new(1, methods::TOOLS_LIST, None);
        let result = self
            .http
            .post(&self.mcp_url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await;

        match result {
            Ok(response) => matches!(response.status().as_u16(), 200 | 401 | 403),
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    /// `initialize` handshake
    pub async fn initialize(
        &self,
        client_name: &str,
        auth_header: Option<&str>,
    ) -> Result<RawResponse, ClientError> {
        let params = InitializeParams::for_client(client_name, "1.0.0");
        self.call(methods::INITIALIZE, Some(serde_json::to_value(params)?), auth_header)
            .await
    }

    /// `tools/list`
    pub async fn list_tools(&self, auth_header: Option<&str>) -> Result<RawResponse, ClientError> {
        self.call(methods::TOOLS_LIST, None, auth_header).await
    }

    /// `tools/call`
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
        auth_header: Option<&str>,
    ) -> Result<RawResponse, ClientError> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        self.call(methods::TOOLS_CALL, Some(serde_json::to_value(params)?), auth_header)
            .await
    }
}
