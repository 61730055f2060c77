//! JSON-RPC error object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error member of a JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct RpcError {
    /// Error code
    pub code: i64,
    /// Error message
    #[serde(default)]
    pub message: String,
    /// Optional server-supplied detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i64 = -32700;
    /// Method does not exist
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameters
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Create an error without detail
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}
