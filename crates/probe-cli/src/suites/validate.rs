//! Deployment validation from `MCP_ACCESS.json`.
//!
//! Checks that the deployed server rejects missing and wrong API keys, then
//! that the real key reaches the tools. Tool failures other than 401 are
//! only warnings: they usually mean Neo4j itself is not configured yet.

use crate::cli::ValidateArgs;
use crate::config::{AccessConfig, ACCESS_FILE};
use crate::error::{CliError, Result};
use crate::output::truncate;
use crate::results::{Recorder, TestResults};
use crate::suites::SuiteContext;
use probe_auth::{mask_identifier, Credentials};
use probe_client::{ClientError, McpHttpClient, RawResponse};
use probe_protocol::{tools, ToolsListResult};
use serde_json::{json, Value};
use tracing::debug;

/// Key the server must reject
pub const INVALID_API_KEY: &str = "invalid-api-key-12345";

/// Query any Neo4j database can answer
pub const SMOKE_QUERY: &str = "RETURN 1 as value";

const NO_KEY: &str = "Auth rejection (no key)";
const BAD_KEY: &str = "Auth rejection (invalid key)";
const TOOLS_LIST: &str = "Tools list";
const GET_SCHEMA: &str = "Get schema";
const READ_CYPHER: &str = "Read cypher";

/// Run the suite.
pub async fn run(args: &ValidateArgs, ctx: &SuiteContext) -> Result<TestResults> {
    let access = match &args.access_file {
        Some(path) => AccessConfig::load(path)?,
        None => ctx.access_config()?.ok_or_else(|| {
            CliError::Config(format!(
                "Configuration file not found: {}. Deploy first to generate it.",
                ACCESS_FILE
            ))
        })?,
    }
    .with_api_key(args.api_key.clone());

    let (endpoint, source) = deployment_endpoint(&access, ctx.endpoint.as_deref())
        .ok_or_else(|| CliError::Config("No endpoint found in configuration".to_string()))?;
    let api_key = access
        .api_key()
        .ok_or_else(|| CliError::Config("No valid API key found. Check .env file.".to_string()))?
        .to_string();

    let client = ctx.client(&endpoint, Some(&access.mcp_path))?;
    let auth = Credentials::bearer(api_key.as_str()).authorization_header();

    let mut rec = Recorder::new("validate", &ctx.formatter);
    rec.header("Neo4j MCP Server - Deployment Validation");
    rec.info(format!("Endpoint: {} (from {})", client.mcp_url(), source.label()));
    rec.info(format!("API Key: {}", mask_identifier(&api_key)));

    expect_rejection(&mut rec, NO_KEY, &client, None).await;
    let bad = Credentials::bearer(INVALID_API_KEY).authorization_header();
    expect_rejection(&mut rec, BAD_KEY, &client, Some(&bad)).await;

    match client.list_tools(Some(&auth)).await {
        Ok(raw) => judge_tools_list(&mut rec, &raw),
        Err(e) => rec.fail(TOOLS_LIST, format!("tools/list failed: {}", e)),
    }

    let response = client.call_tool(tools::GET_SCHEMA, json!({}), Some(&auth)).await;
    judge_tool_call(&mut rec, GET_SCHEMA, response, 200);

    let response = client
        .call_tool(tools::READ_CYPHER, json!({ "query": SMOKE_QUERY }), Some(&auth))
        .await;
    judge_tool_call(&mut rec, READ_CYPHER, response, 100);

    Ok(rec.finish())
}

/// Where the deployment endpoint came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
    /// `endpoint` in the access file
    AccessFile,
    /// `--endpoint` or `MCP_ENDPOINT`
    Global,
}

impl EndpointSource {
    /// Human-readable origin
    pub fn label(self) -> &'static str {
        match self {
            EndpointSource::AccessFile => ACCESS_FILE,
            EndpointSource::Global => "--endpoint/MCP_ENDPOINT",
        }
    }
}

/// Endpoint of the deployment under test.
///
/// The access file describes the deployment, so its endpoint wins; the
/// global endpoint is only used when the file has none.
pub fn deployment_endpoint(
    access: &AccessConfig,
    global: Option<&str>,
) -> Option<(String, EndpointSource)> {
    let global = global.map(str::trim).filter(|e| !e.is_empty());
    match (access.endpoint(), global) {
        (Some(file), global) => {
            if let Some(ignored) = global.filter(|g| *g != file) {
                debug!(endpoint = %ignored, "Ignoring global endpoint for deployment validation");
            }
            Some((file.to_string(), EndpointSource::AccessFile))
        }
        (None, Some(global)) => Some((global.to_string(), EndpointSource::Global)),
        (None, None) => None,
    }
}

async fn expect_rejection(
    rec: &mut Recorder<'_>,
    name: &str,
    client: &McpHttpClient,
    auth: Option<&str>,
) {
    match client.list_tools(auth).await {
        Ok(raw) if raw.status == 401 => rec.pass(name, "Rejected (401)"),
        Ok(raw) if raw.is_success() => rec.fail(name, "Request was accepted (expected 401)"),
        Ok(raw) => rec.fail(name, format!("Unexpected error code: {} (expected 401)", raw.status)),
        Err(e) => rec.fail(name, format!("Connection error: {}", e)),
    }
}

fn judge_tools_list(rec: &mut Recorder, raw: &RawResponse) {
    if !raw.is_success() {
        rec.fail(TOOLS_LIST, format!("tools/list failed: HTTP {}", raw.status));
        return;
    }
    if let Some(err) = raw.rpc_error() {
        rec.fail(TOOLS_LIST, format!("tools/list failed: {}", err));
        return;
    }
    let Some(result) = raw.result() else {
        rec.fail(TOOLS_LIST, "No result in response");
        return;
    };
    let tools: ToolsListResult = serde_json::from_value(result.clone()).unwrap_or_default();
    if tools.tools.is_empty() {
        rec.warn(TOOLS_LIST, "No tools returned (may indicate connection issues)");
        return;
    }
    rec.pass(TOOLS_LIST, format!("tools/list returned {} tools", tools.tools.len()));
    for tool in &tools.tools {
        rec.detail(format!("- {}: {}", tool.name, truncate(&tool.description, 50)));
    }
}

/// 401 fails; any other error is a warning; content passes.
fn judge_tool_call(
    rec: &mut Recorder,
    name: &str,
    response: std::result::Result<RawResponse, ClientError>,
    preview: usize,
) {
    let raw = match response {
        Ok(raw) => raw,
        Err(e) => {
            rec.warn(name, format!("Returned error: {}", e));
            return;
        }
    };
    if raw.status == 401 {
        rec.fail(name, "Authentication failed");
        return;
    }
    if !raw.is_success() {
        rec.warn(name, format!("Returned error: HTTP {}", raw.status));
        return;
    }
    if let Some(err) = raw.rpc_error() {
        rec.warn(name, format!("Returned error: {}", err));
        return;
    }

    let content = raw
        .result()
        .and_then(|r| r.get("content"))
        .and_then(Value::as_array);
    match content {
        Some(items) if !items.is_empty() => {
            rec.pass(name, "Executed successfully");
            let text = items
                .iter()
                .find(|i| i["type"] == "text")
                .and_then(|i| i["text"].as_str());
            if let Some(text) = text {
                rec.detail(format!("Preview: {}", truncate(text, preview)));
            }
        }
        Some(_) => rec.warn(name, "Returned empty content"),
        None => rec.warn(name, "Unexpected response format"),
    }
}
