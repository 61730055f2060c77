//! MCP HTTP client
//!
//! Client library for calling a Neo4j MCP server over JSON-RPC/HTTP.
//!
//! Two layers:
//! - [`McpHttpClient`] sends a request and hands back whatever came back
//!   (status, headers, body). The validation suites use it to look at 401s
//!   and `WWW-Authenticate` headers.
//! - [`McpSession`] attaches fixed credentials and turns responses into
//!   typed results or [`ClientError`]s.
//!
//! # Example
//!
//! ```no_run
//! use probe_auth::Credentials;
//! use probe_client::{McpHttpClient, McpSession};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), probe_client::ClientError> {
//! let client = McpHttpClient::new("http://localhost:8080", "/mcp", Duration::from_secs(30))?;
//! let session = McpSession::new(client, Credentials::bearer("eyJ..."));
//!
//! let tools = session.list_tools().await?;
//! let rows = session.read_cypher("RETURN 1 AS value").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod session;

pub use client::{McpHttpClient, RawResponse, DEFAULT_MCP_PATH, DEFAULT_TIMEOUT_SECS};
pub use error::ClientError;
pub use session::McpSession;
