//! JSON-RPC 2.0 envelopes

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version carried in every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Method name
    pub method: String,
    /// Request ID
    pub id: u64,
    /// Method parameters, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new request.
    ///
    /// `params` equal to `null` or `{}` are dropped so the body matches what
    /// the server expects for parameterless methods.
    pub fn new(id: u64, method: &str, params: Option<Value>) -> Self {
        let params = params.filter(|p| match p {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        });

        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            id,
            params,
        }
    }
}

/// JSON-RPC response (success or error)
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    #[serde(default)]
    pub jsonrpc: String,
    /// Echoed request ID
    #[serde(default)]
    pub id: Option<Value>,
    /// Result data
    #[serde(default)]
    pub result: Option<Value>,
    /// Error details
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// Whether the response echoes the given request id
    pub fn matches_id(&self, id: u64) -> bool {
        self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }

    /// Split into the result or the error member
    pub fn into_result(self) -> Result<Value, RpcError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(error),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(RpcError::new(
                RpcError::INTERNAL_ERROR,
                "empty response: neither result nor error present",
            )),
        }
    }
}
