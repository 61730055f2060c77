//! Error types for the MCP client.

use thiserror::Error;

/// Client operation errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP 401 from the MCP server
    #[error("Authentication failed: Invalid or expired token")]
    Unauthorized,

    /// HTTP 403 from the MCP server
    #[error("Authorization failed: Insufficient permissions")]
    Forbidden,

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Start of the response body
        body: String,
    },

    /// JSON-RPC error member in the response
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// The response id differs from the request id
    #[error("Response id mismatch: sent {sent}, received {received}")]
    IdMismatch {
        /// Id of the request
        sent: u64,
        /// Id echoed by the server
        received: String,
    },

    /// Connection error (network, DNS, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// The response body is not the expected JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Bad endpoint or client construction failure
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the server rejected the credentials
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::Forbidden)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Connection(e.to_string())
        } else if e.is_builder() {
            ClientError::Config(e.to_string())
        } else if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else {
            ClientError::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::InvalidResponse(format!("JSON parsing error: {}", e))
    }
}

impl From<probe_protocol::RpcError> for ClientError {
    fn from(e: probe_protocol::RpcError) -> Self {
        ClientError::Rpc {
            code: e.code,
            message: e.message,
        }
    }
}
