//! MCP wire types for the probe tooling.
//!
//! The Neo4j MCP server speaks plain JSON-RPC 2.0 over HTTP POST. This crate
//! holds the envelope types and the handful of MCP payloads the probes send
//! and inspect:
//! - `initialize`
//! - `tools/list`
//! - `tools/call` (`get-schema`, `read-cypher`, `write-cypher`)
//!
//! # Example
//!
//! ```
//! use probe_protocol::{JsonRpcRequest, methods};
//!
//! let request = JsonRpcRequest::new(1, methods::TOOLS_LIST, None);
//! let body = serde_json::to_string(&request).unwrap();
//! assert_eq!(body, r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#);
//! ```

#![warn(missing_docs)]

mod error;
mod jsonrpc;
mod mcp;

pub use error::RpcError;
pub use jsonrpc::{JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
pub use mcp::{
    CallToolParams, CallToolResult, ClientInfo, Content, InitializeParams, InitializeResult,
    ServerInfo, Tool, ToolsListResult, PROTOCOL_VERSION,
};

/// JSON-RPC method names used against the MCP endpoint
pub mod methods {
    /// Protocol handshake
    pub const INITIALIZE: &str = "initialize";
    /// Tool discovery
    pub const TOOLS_LIST: &str = "tools/list";
    /// Tool invocation
    pub const TOOLS_CALL: &str = "tools/call";
}

/// Tool names exposed by the Neo4j MCP server
pub mod tools {
    /// Returns the database schema
    pub const GET_SCHEMA: &str = "get-schema";
    /// Runs a read-only Cypher statement
    pub const READ_CYPHER: &str = "read-cypher";
    /// Runs a write Cypher statement (absent in read-only deployments)
    pub const WRITE_CYPHER: &str = "write-cypher";
}
