//! Authenticated MCP session with typed results.

use crate::client::{McpHttpClient, RawResponse};
use crate::error::ClientError;
use probe_auth::Credentials;
use probe_protocol::{
    tools, CallToolResult, InitializeResult, JsonRpcResponse, Tool, ToolsListResult,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

/// Characters of an error body kept in [`ClientError::Http`]
const ERROR_BODY_LIMIT: usize = 300;

/// MCP client bound to one set of credentials
pub struct McpSession {
    client: McpHttpClient,
    credentials: Credentials,
    auth_header: String,
}

impl McpSession {
    /// Bind `credentials` to `client`
    pub fn new(client: McpHttpClient, credentials: Credentials) -> Self {
        let auth_header = credentials.authorization_header();
        Self {
            client,
            credentials,
            auth_header,
        }
    }

    /// Underlying raw client
    pub fn client(&self) -> &McpHttpClient {
        &self.client
    }

    /// Credentials in use
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Call `method` and return its `result` member
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, ClientError> {
        let raw = self
            .client
            .call(method, params, Some(&self.auth_header))
            .await?;
        Self::into_result(raw)
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, ClientError> {
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(ClientError::from)
    }

    fn into_result(raw: RawResponse) -> Result<Value, ClientError> {
        match raw.status {
            401 => return Err(ClientError::Unauthorized),
            403 => return Err(ClientError::Forbidden),
            s if !(200..300).contains(&s) => {
                return Err(ClientError::Http {
                    status: s,
                    body: raw.body_preview(ERROR_BODY_LIMIT),
                })
            }
            _ => {}
        }

        let json = raw.json.ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "body is not JSON: {}",
                raw.body.chars().take(ERROR_BODY_LIMIT).collect::<String>()
            ))
        })?;
        let response: JsonRpcResponse = serde_json::from_value(json)?;

        if !response.matches_id(raw.request_id) {
            return Err(ClientError::IdMismatch {
                sent: raw.request_id,
                received: response
                    .id
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_else(|| "none".to_string()),
            });
        }

        Ok(response.into_result()?)
    }

    /// `initialize` handshake announcing `client_name`
    pub async fn initialize(&self, client_name: &str) -> Result<InitializeResult, ClientError> {
        let raw = self
            .client
            .initialize(client_name, Some(&self.auth_header))
            .await?;
        let result = Self::into_result(raw)?;
        let init: InitializeResult = serde_json::from_value(result)?;
        debug!(
            protocol = %init.protocol_version,
            server = %init.server_info.name,
            "Initialized MCP session"
        );
        Ok(init)
    }

    /// Advertised tools
    pub async fn list_tools(&self) -> Result<Vec<Tool>, ClientError> {
        let result: ToolsListResult = self.call_typed(probe_protocol::methods::TOOLS_LIST, None).await?;
        Ok(result.tools)
    }

    /// Invoke a tool
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ClientError> {
        let raw = self
            .client
            .call_tool(name, arguments, Some(&self.auth_header))
            .await?;
        let result = Self::into_result(raw)?;
        Ok(serde_json::from_value(result)?)
    }

    /// `get-schema`
    pub async fn get_schema(&self) -> Result<CallToolResult, ClientError> {
        self.call_tool(tools::GET_SCHEMA, json!({})).await
    }

    /// `read-cypher` with the given query
    pub async fn read_cypher(&self, query: &str) -> Result<CallToolResult, ClientError> {
        self.call_tool(tools::READ_CYPHER, json!({ "query": query })).await
    }

    /// `write-cypher` with the given query
    pub async fn write_cypher(&self, query: &str) -> Result<CallToolResult, ClientError> {
        self.call_tool(tools::WRITE_CYPHER, json!({ "query": query })).await
    }
}
