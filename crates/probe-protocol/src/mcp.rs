//! MCP payload types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// MCP protocol revision announced during `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Client identity sent during `initialize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name
    pub name: String,
    /// Client version
    pub version: String,
}

/// `initialize` parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Requested protocol version
    pub protocol_version: String,
    /// Client capabilities (always empty for the probes)
    pub capabilities: Map<String, Value>,
    /// Client identity
    pub client_info: ClientInfo,
}

impl InitializeParams {
    /// Parameters announcing the given client
    pub fn for_client(name: &str, version: &str) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: Map::new(),
            client_info: ClientInfo {
                name: name.to_string(),
                version: version.to_string(),
            },
        }
    }
}

/// MCP server info
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    #[serde(default)]
    pub name: String,
    /// Server version
    #[serde(default)]
    pub version: String,
}

/// `initialize` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Negotiated protocol version
    #[serde(default)]
    pub protocol_version: String,
    /// Server identity
    #[serde(default)]
    pub server_info: ServerInfo,
    /// Server capabilities, kept opaque
    #[serde(default)]
    pub capabilities: Value,
}

/// Tool definition from `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Tool name
    pub name: String,
    /// Tool description, empty when absent or null
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Input schema (JSON Schema)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `tools/list` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsListResult {
    /// Available tools
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl ToolsListResult {
    /// Names of the advertised tools
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// Whether a tool with this name is advertised
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }
}

/// `tools/call` parameters
#[derive(Debug, Clone, Serialize)]
pub struct CallToolParams {
    /// Tool name
    pub name: String,
    /// Tool arguments
    pub arguments: Value,
}

/// Content item of a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Content type, "text" for everything the Neo4j server returns
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Text payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `tools/call` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Returned content
    #[serde(default)]
    pub content: Vec<Content>,
    /// Tool-level failure flag
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Text of the first text item, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.kind == "text")
            .and_then(|c| c.text.as_deref())
    }

    /// Total characters across all text items
    pub fn text_len(&self) -> usize {
        self.content
            .iter()
            .filter_map(|c| c.text.as_deref())
            .map(|t| t.chars().count())
            .sum()
    }
}
